//! In-flight command tracking.
//!
//! Every sent command registers here under its sequence number together
//! with a completion slot and a timer task. Whichever of the response,
//! the timer, or a connection-level failure removes the entry first gets
//! to complete it; the entry is gone by then, so the losers find nothing
//! and do nothing.

use std::sync::Arc;
use std::time::Duration;

use futures::channel::oneshot;
use log::debug;

use crate::commands::CommandId;
use crate::errors::Error;
use crate::frame::Frame;
use crate::response;
use crate::runtime::{self, Instant, JoinHandle, Mutex};

type Result<T> = std::result::Result<T, Error>;

/// Receiving side of one command's completion slot.
pub(crate) type CommandReceiver = oneshot::Receiver<Result<Frame>>;

/// One in-flight request awaiting its response frame.
struct PendingCommand {
    sequence: u32,
    command: CommandId,
    sent_at: Instant,
    request_hex: String,
    completion: oneshot::Sender<Result<Frame>>,
    timer: Option<JoinHandle<()>>,
}

/// Table of in-flight requests keyed by sequence number.
///
/// Entries are kept in insertion order and looked up by linear scan,
/// which is plenty for the handful of commands a gateway keeps open.
#[derive(Clone)]
pub(crate) struct PendingTable {
    inner: Arc<Mutex<Vec<PendingCommand>>>,
    timeout: Duration,
}

impl PendingTable {
    pub fn new(timeout: Duration) -> Self {
        PendingTable {
            inner: Arc::new(Mutex::new(Vec::new())),
            timeout,
        }
    }

    /// Registers a request and arms its timeout timer.
    pub async fn register(
        &self,
        sequence: u32,
        command: CommandId,
        request_hex: String,
    ) -> Result<CommandReceiver> {
        let (tx, rx) = oneshot::channel();
        let mut table = self.inner.lock().await;
        if table.iter().any(|entry| entry.sequence == sequence) {
            return Err(Error::DuplicateSequence(sequence));
        }
        let timer = {
            let this = self.clone();
            runtime::spawn(async move {
                runtime::sleep(this.timeout).await;
                this.expire(sequence).await;
            })
        };
        table.push(PendingCommand {
            sequence,
            command,
            sent_at: Instant::now(),
            request_hex,
            completion: tx,
            timer: Some(timer),
        });
        Ok(rx)
    }

    fn take(table: &mut Vec<PendingCommand>, sequence: u32) -> Option<PendingCommand> {
        table
            .iter()
            .position(|entry| entry.sequence == sequence)
            .map(|index| table.remove(index))
    }

    /// Delivers a response frame to its waiting command.
    ///
    /// Returns false when no command with that sequence is in flight,
    /// which covers both unsolicited frames and responses that lost the
    /// race against their timer.
    pub async fn resolve(&self, frame: &Frame) -> bool {
        let sequence = frame.sequence();
        let entry = {
            let mut table = self.inner.lock().await;
            Self::take(&mut table, sequence)
        };
        let Some(entry) = entry else {
            return false;
        };
        if let Some(timer) = &entry.timer {
            timer.abort();
        }
        let outcome = match response::failure_code(frame, entry.command) {
            Ok(0) => Ok(frame.clone()),
            Ok(code) => Err(Error::protocol_failure(entry.command, code, frame.to_hex())),
            Err(err) => Err(err),
        };
        debug!(
            "resolved seq [{}] after {:?}",
            sequence,
            entry.sent_at.elapsed()
        );
        let _ = entry.completion.send(outcome);
        true
    }

    /// Timer path: fails the entry unless the response already won.
    pub async fn expire(&self, sequence: u32) -> bool {
        let entry = {
            let mut table = self.inner.lock().await;
            Self::take(&mut table, sequence)
        };
        let Some(entry) = entry else {
            return false;
        };
        debug!("send command timeout [{}][{}]", sequence, entry.request_hex);
        let _ = entry.completion.send(Err(Error::CommandTimeout {
            command: entry.command,
            sequence,
        }));
        true
    }

    /// Removes an entry without completing it; the caller keeps whatever
    /// error made the send fall through.
    pub async fn discard(&self, sequence: u32) {
        let entry = {
            let mut table = self.inner.lock().await;
            Self::take(&mut table, sequence)
        };
        if let Some(entry) = entry {
            if let Some(timer) = &entry.timer {
                timer.abort();
            }
        }
    }

    /// Fails every outstanding command, in insertion order.
    pub async fn drain(&self, mut reason: impl FnMut() -> Error) {
        let drained = {
            let mut table = self.inner.lock().await;
            std::mem::take(&mut *table)
        };
        if drained.is_empty() {
            return;
        }
        debug!("failing {} outstanding command(s)", drained.len());
        for entry in drained {
            if let Some(timer) = &entry.timer {
                timer.abort();
            }
            let _ = entry.completion.send(Err(reason()));
        }
    }

    pub async fn outstanding(&self) -> usize {
        self.inner.lock().await.len()
    }
}

#[cfg(all(test, feature = "runtime-tokio"))]
mod tests {
    use super::*;
    use crate::frame::FLAG_NODE;

    fn response_frame(sequence: u32, failure: u8) -> Frame {
        Frame::new(FLAG_NODE, CommandId::GetStatus.value(), sequence, &[
            failure, 0, 0,
        ])
    }

    #[tokio::test]
    async fn test_register_and_resolve() {
        let table = PendingTable::new(Duration::from_secs(5));
        let rx = table
            .register(1, CommandId::GetStatus, String::new())
            .await
            .unwrap();

        let frame = response_frame(1, 0);
        assert!(table.resolve(&frame).await);
        assert_eq!(rx.await.unwrap().unwrap(), frame);
        assert_eq!(table.outstanding().await, 0);
    }

    #[tokio::test]
    async fn test_unknown_sequence_is_ignored() {
        let table = PendingTable::new(Duration::from_secs(5));
        assert!(!table.resolve(&response_frame(42, 0)).await);
    }

    #[tokio::test]
    async fn test_failure_byte_becomes_an_error() {
        let table = PendingTable::new(Duration::from_secs(5));
        let rx = table
            .register(7, CommandId::SetOnOff, String::new())
            .await
            .unwrap();

        table.resolve(&response_frame(7, 0x15)).await;
        match rx.await.unwrap() {
            Err(Error::ProtocolFailure { code, .. }) => assert_eq!(code, 0x15),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_duplicate_sequence_is_rejected() {
        let table = PendingTable::new(Duration::from_secs(5));
        let _rx = table
            .register(3, CommandId::GetStatus, String::new())
            .await
            .unwrap();

        let duplicate = table.register(3, CommandId::GetStatus, String::new()).await;
        assert!(matches!(duplicate, Err(Error::DuplicateSequence(3))));
        assert_eq!(table.outstanding().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_expires_the_entry() {
        let table = PendingTable::new(Duration::from_millis(1000));
        let started = tokio::time::Instant::now();
        let rx = table
            .register(9, CommandId::GetStatus, "0b00006809000000000000".into())
            .await
            .unwrap();

        let outcome = rx.await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(1000));
        assert!(matches!(
            outcome,
            Err(Error::CommandTimeout {
                command: CommandId::GetStatus,
                sequence: 9,
            })
        ));
        assert_eq!(table.outstanding().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_response_after_timeout_finds_nothing() {
        let table = PendingTable::new(Duration::from_millis(1000));
        let rx = table
            .register(5, CommandId::GetStatus, String::new())
            .await
            .unwrap();

        assert!(matches!(
            rx.await.unwrap(),
            Err(Error::CommandTimeout { .. })
        ));
        assert!(!table.resolve(&response_frame(5, 0)).await);
    }

    #[tokio::test]
    async fn test_drain_fails_every_outstanding_command() {
        let table = PendingTable::new(Duration::from_secs(5));
        let mut receivers = Vec::new();
        for sequence in 1..=3 {
            receivers.push(
                table
                    .register(sequence, CommandId::SetOnOff, String::new())
                    .await
                    .unwrap(),
            );
        }

        table.drain(|| Error::ConnectionLost).await;
        for rx in receivers {
            assert!(matches!(rx.await.unwrap(), Err(Error::ConnectionLost)));
        }
        assert_eq!(table.outstanding().await, 0);
    }

    #[tokio::test]
    async fn test_discard_drops_the_entry_without_a_verdict() {
        let table = PendingTable::new(Duration::from_secs(5));
        let rx = table
            .register(2, CommandId::GetStatus, String::new())
            .await
            .unwrap();

        table.discard(2).await;
        assert_eq!(table.outstanding().await, 0);
        assert!(rx.await.is_err());
    }
}
