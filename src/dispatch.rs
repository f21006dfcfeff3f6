//! Outbound write policy.
//!
//! Immediate mode writes straight through and fails fast when the
//! session is down. Auto-managed mode funnels frames through a worker
//! task that connects lazily, paces writes, replays the queue across
//! reconnects, and closes the connection once it has been idle for the
//! configured window.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use futures::channel::mpsc;
use log::debug;

use crate::errors::Error;
use crate::frame::Frame;
use crate::runtime::{self, JoinHandle};
use crate::session::{ConnectionState, TransportSession};

/// The gateway mishandles back-to-back writes; queued frames are spaced
/// out by this much.
const WRITE_SPACING: Duration = Duration::from_millis(1000);

/// How enqueued frames reach the socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchMode {
    /// Write straight through; fail with `NotConnected` when the caller
    /// has not connected first.
    Immediate,
    /// Queue frames, connect lazily with backoff, pace writes, and close
    /// the connection after an idle window.
    AutoClose {
        /// How long the outbound queue must stay empty before the
        /// connection is closed.
        idle_window: Duration,
    },
}

pub(crate) enum DispatchQueue {
    Immediate {
        session: Arc<TransportSession>,
    },
    Auto {
        queue: mpsc::UnboundedSender<Frame>,
        // Held so the worker is torn down with the client on runtimes
        // that cancel tasks on handle drop.
        _worker: JoinHandle<()>,
    },
}

impl DispatchQueue {
    pub fn new(mode: DispatchMode, session: Arc<TransportSession>, reconnect_attempts: u32) -> Self {
        match mode {
            DispatchMode::Immediate => DispatchQueue::Immediate { session },
            DispatchMode::AutoClose { idle_window } => {
                let (queue, inbox) = mpsc::unbounded();
                let worker =
                    runtime::spawn(run_dispatch(session, inbox, idle_window, reconnect_attempts));
                DispatchQueue::Auto {
                    queue,
                    _worker: worker,
                }
            }
        }
    }

    pub async fn enqueue(&self, frame: Frame) -> Result<(), Error> {
        match self {
            DispatchQueue::Immediate { session } => session.write(&frame).await,
            DispatchQueue::Auto { queue, .. } => {
                queue.unbounded_send(frame).map_err(|_| Error::Disposed)
            }
        }
    }
}

/// Worker loop for auto-managed mode.
///
/// Frames drain from the inbox into a local FIFO and are written in
/// order. The idle countdown only runs while the FIFO is empty, and any
/// new frame re-arms it.
async fn run_dispatch(
    session: Arc<TransportSession>,
    mut inbox: mpsc::UnboundedReceiver<Frame>,
    idle_window: Duration,
    reconnect_attempts: u32,
) {
    let mut queue: VecDeque<Frame> = VecDeque::new();
    loop {
        if queue.is_empty() {
            match runtime::timeout(idle_window, inbox.next()).await {
                Ok(Some(frame)) => {
                    queue.push_back(frame);
                    // Pull whatever else is already waiting.
                    while let Ok(Some(frame)) = inbox.try_next() {
                        queue.push_back(frame);
                    }
                }
                Ok(None) => break,
                Err(_) => {
                    if session.state().await == ConnectionState::Connected {
                        debug!("closing connection after {idle_window:?} idle");
                        session.dispose().await;
                    }
                    continue;
                }
            }
        }
        match session.state().await {
            ConnectionState::Connected => {
                if let Some(frame) = queue.pop_front() {
                    match session.write(&frame).await {
                        Ok(()) => {
                            if !queue.is_empty() {
                                runtime::sleep(WRITE_SPACING).await;
                            }
                        }
                        Err(err) => {
                            // The write tore the session down and failed
                            // the commands these frames belong to.
                            debug!("dropping {} queued frame(s): {err}", queue.len() + 1);
                            queue.clear();
                        }
                    }
                }
            }
            ConnectionState::Disconnected => {
                if let Err(err) = session.reconnect_with_backoff(reconnect_attempts).await {
                    debug!("dropping {} queued frame(s): {err}", queue.len());
                    queue.clear();
                }
            }
            ConnectionState::Connecting => {
                // An explicit connect is in flight elsewhere.
                runtime::sleep(Duration::from_millis(50)).await;
            }
        }
    }
    // Client dropped its sender; shut the session down behind it.
    session.dispose().await;
}
