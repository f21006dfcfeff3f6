//! Connection lifecycle for the gateway TCP session.
//!
//! One session owns at most one socket at a time. A background reader
//! task reassembles inbound frames and hands them to the pending table;
//! writers go through [`TransportSession::write`], which serializes them
//! behind the core lock. Every established connection gets an epoch
//! number so that a reader or dial left over from an earlier connection
//! cannot touch the state of a newer one.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};

use crate::errors::Error;
use crate::frame::{Frame, FrameAssembler, hex_encode};
use crate::history::{MessageHistory, MessageType};
use crate::pending::PendingTable;
use crate::runtime::{
    self, AsyncReadHalf, AsyncTcpStream, AsyncWriteHalf, JoinHandle, Mutex, TcpReadHalf, TcpStream,
    TcpWriteHalf,
};

type Result<T> = std::result::Result<T, Error>;

/// Connection lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

struct SessionCore {
    state: ConnectionState,
    writer: Option<TcpWriteHalf>,
    reader: Option<JoinHandle<()>>,
    epoch: u64,
}

/// The single TCP session to a gateway.
pub(crate) struct TransportSession {
    addr: SocketAddr,
    connect_timeout: Duration,
    core: Mutex<SessionCore>,
    // Serializes dial attempts without blocking state reads.
    connect_lock: Mutex<()>,
    pending: PendingTable,
    history: Arc<Mutex<MessageHistory>>,
}

impl TransportSession {
    pub fn new(
        addr: SocketAddr,
        connect_timeout: Duration,
        pending: PendingTable,
        history: Arc<Mutex<MessageHistory>>,
    ) -> Self {
        TransportSession {
            addr,
            connect_timeout,
            core: Mutex::new(SessionCore {
                state: ConnectionState::Disconnected,
                writer: None,
                reader: None,
                epoch: 0,
            }),
            connect_lock: Mutex::new(()),
            pending,
            history,
        }
    }

    pub async fn state(&self) -> ConnectionState {
        self.core.lock().await.state
    }

    /// Establishes the connection unless one is already up.
    ///
    /// A single dial attempt; callers wanting retries wrap this in
    /// [`reconnect_with_backoff`](Self::reconnect_with_backoff).
    pub async fn connect(self: &Arc<Self>) -> Result<()> {
        let _guard = self.connect_lock.lock().await;
        let epoch = {
            let mut core = self.core.lock().await;
            if core.state == ConnectionState::Connected {
                return Ok(());
            }
            core.state = ConnectionState::Connecting;
            core.epoch += 1;
            core.epoch
        };

        debug!("connecting to gateway {}", self.addr);
        let stream = match runtime::timeout(self.connect_timeout, TcpStream::connect(self.addr))
            .await
        {
            Ok(Ok(stream)) => stream,
            Ok(Err(err)) => {
                self.mark_disconnected(epoch).await;
                debug!("connect to {} failed: {err:?}", self.addr);
                return Err(Error::socket("connect", err));
            }
            Err(_) => {
                self.mark_disconnected(epoch).await;
                debug!("connect to {} timed out", self.addr);
                return Err(Error::ConnectTimeout { addr: self.addr });
            }
        };

        let (read_half, write_half) = stream.into_split();
        {
            let mut core = self.core.lock().await;
            if core.epoch != epoch {
                // Disposed while the dial was in flight; the fresh socket
                // is dropped on the way out.
                return Err(Error::Disposed);
            }
            core.writer = Some(write_half);
            core.state = ConnectionState::Connected;
            let session = Arc::clone(self);
            if let Some(old) = core.reader.replace(runtime::spawn(
                session.read_loop(read_half, epoch),
            )) {
                old.abort();
            }
        }
        debug!("connected to gateway {}", self.addr);
        Ok(())
    }

    /// Repeated dials with a growing delay before each attempt.
    ///
    /// Attempt `k` waits `k` seconds first. When every attempt fails,
    /// outstanding commands are failed with the same unreachable error
    /// the caller gets.
    pub async fn reconnect_with_backoff(self: &Arc<Self>, attempts: u32) -> Result<()> {
        for attempt in 1..=attempts {
            runtime::sleep(Duration::from_millis(1000 * u64::from(attempt))).await;
            match self.connect().await {
                Ok(()) => return Ok(()),
                Err(err) => debug!("connect attempt {attempt}/{attempts} failed: {err}"),
            }
        }
        let err = Error::GatewayUnreachable {
            addr: self.addr,
            attempts,
        };
        warn!("{err}");
        self.history.lock().await.record_error(&err.to_string());
        self.pending
            .drain(|| Error::GatewayUnreachable {
                addr: self.addr,
                attempts,
            })
            .await;
        Err(err)
    }

    /// Writes one frame, tearing the session down on failure.
    pub async fn write(&self, frame: &Frame) -> Result<()> {
        let mut core = self.core.lock().await;
        if core.state != ConnectionState::Connected {
            return Err(Error::NotConnected);
        }
        let Some(writer) = core.writer.as_mut() else {
            return Err(Error::NotConnected);
        };
        if let Err(err) = writer.write_all(frame.as_bytes()).await {
            core.state = ConnectionState::Disconnected;
            core.writer = None;
            drop(core);
            debug!("socket write error: {err:?}");
            self.history.lock().await.record_error(&err.to_string());
            self.pending.drain(|| Error::ConnectionLost).await;
            return Err(Error::socket("write", err));
        }
        debug!("sent data [{}]", frame.to_hex());
        Ok(())
    }

    /// Closes the connection and fails everything still in flight.
    ///
    /// Idempotent, and not terminal: a later connect starts over on a
    /// fresh socket.
    pub async fn dispose(&self) {
        {
            let mut core = self.core.lock().await;
            core.epoch += 1;
            core.state = ConnectionState::Disconnected;
            if let Some(mut writer) = core.writer.take() {
                let _ = writer.shutdown().await;
            }
            if let Some(reader) = core.reader.take() {
                reader.abort();
            }
        }
        self.pending.drain(|| Error::Disposed).await;
        debug!("session to {} disposed", self.addr);
    }

    async fn mark_disconnected(&self, epoch: u64) {
        let mut core = self.core.lock().await;
        if core.epoch == epoch {
            core.state = ConnectionState::Disconnected;
            core.writer = None;
        }
    }

    async fn read_loop(self: Arc<Self>, mut read_half: TcpReadHalf, epoch: u64) {
        let mut assembler = FrameAssembler::new();
        let mut buffer = [0u8; 4096];
        let failure = loop {
            match read_half.read(&mut buffer).await {
                Ok(0) => {
                    debug!("gateway {} closed the connection", self.addr);
                    break None;
                }
                Ok(n) => {
                    debug!("socket data [{}]", hex_encode(&buffer[..n]));
                    match assembler.feed(&buffer[..n]) {
                        Ok(frames) => {
                            for frame in frames {
                                self.dispatch_frame(frame).await;
                            }
                        }
                        Err(err) => {
                            warn!("unrecoverable framing error from {}: {err}", self.addr);
                            break Some(err);
                        }
                    }
                }
                Err(err) => {
                    debug!("socket read error: {err:?}");
                    break Some(Error::socket("read", err));
                }
            }
        };

        if let Some(err) = &failure {
            self.history.lock().await.record_error(&err.to_string());
        }
        {
            let mut core = self.core.lock().await;
            // A reader outlived by a newer connection must not touch it.
            if core.epoch != epoch {
                return;
            }
            core.state = ConnectionState::Disconnected;
            core.writer = None;
        }
        self.pending.drain(|| Error::ConnectionLost).await;
    }

    async fn dispatch_frame(&self, frame: Frame) {
        debug!(
            "got response for seq [{}][{}]",
            frame.sequence(),
            frame.to_hex()
        );
        self.history.lock().await.record(MessageType::Receive, &frame);
        if !self.pending.resolve(&frame).await {
            debug!("unsolicited frame for seq [{}] discarded", frame.sequence());
        }
    }
}
