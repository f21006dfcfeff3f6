//! Message history tracking for debugging and diagnostics.

use std::collections::HashMap;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::frame::Frame;

/// Direction of a recorded frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageType {
    Send,
    Receive,
}

/// A recorded frame in the history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub msg_type: MessageType,
    /// Command byte of the frame.
    pub command: u8,
    pub sequence: u32,
    /// Hex rendering of the whole frame.
    pub hex: String,
    /// Seconds since history creation
    pub timestamp: f64,
}

/// Tracks frame history for debugging.
#[derive(Debug, Clone)]
pub struct MessageHistory {
    history: HashMap<MessageType, HashMap<u8, String>>,
    last_error: Option<String>,
    start_time: Instant,
    entries: Vec<HistoryEntry>,
    max_entries: usize,
}

impl Default for MessageHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageHistory {
    pub const DEFAULT_MAX_ENTRIES: usize = 100;

    pub fn new() -> Self {
        Self {
            history: HashMap::from([
                (MessageType::Send, HashMap::new()),
                (MessageType::Receive, HashMap::new()),
            ]),
            last_error: None,
            start_time: Instant::now(),
            entries: Vec::new(),
            max_entries: Self::DEFAULT_MAX_ENTRIES,
        }
    }

    pub fn with_max_entries(max_entries: usize) -> Self {
        Self {
            max_entries,
            ..Self::new()
        }
    }

    pub fn record(&mut self, msg_type: MessageType, frame: &Frame) {
        let hex = frame.to_hex();

        if let Some(type_map) = self.history.get_mut(&msg_type) {
            type_map.insert(frame.command(), hex.clone());
        }

        self.entries.push(HistoryEntry {
            msg_type,
            command: frame.command(),
            sequence: frame.sequence(),
            hex,
            timestamp: self.start_time.elapsed().as_secs_f64(),
        });

        if self.entries.len() > self.max_entries {
            self.entries.remove(0);
        }
    }

    pub fn record_error(&mut self, error: &str) {
        self.last_error = Some(error.to_string());
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// The most recent frame seen for a command in the given direction.
    pub fn last_frame(&self, msg_type: MessageType, command: u8) -> Option<&str> {
        self.history
            .get(&msg_type)
            .and_then(|type_map| type_map.get(&command))
            .map(String::as_str)
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.history.values_mut().for_each(|m| m.clear());
        self.entries.clear();
        self.last_error = None;
    }

    pub fn summary(&self) -> HistorySummary {
        let count = |t: MessageType| self.history.get(&t).map_or(0, |m| m.len());
        HistorySummary {
            send_count: count(MessageType::Send),
            receive_count: count(MessageType::Receive),
            total_entries: self.entries.len(),
            last_error: self.last_error.clone(),
        }
    }
}

/// Summary of frame history for diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistorySummary {
    /// Distinct commands recorded in the send direction.
    pub send_count: usize,
    /// Distinct commands recorded in the receive direction.
    pub receive_count: usize,
    pub total_entries: usize,
    pub last_error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::FLAG_NODE;

    fn frame(command: u8, sequence: u32) -> Frame {
        Frame::new(FLAG_NODE, command, sequence, &[0x01])
    }

    #[test]
    fn test_record_frame() {
        let mut history = MessageHistory::new();
        history.record(MessageType::Send, &frame(0x13, 1));

        assert_eq!(history.len(), 1);
        assert_eq!(history.entries()[0].command, 0x13);
        assert_eq!(history.entries()[0].sequence, 1);
    }

    #[test]
    fn test_last_frame_keeps_the_newest_per_command() {
        let mut history = MessageHistory::new();
        history.record(MessageType::Send, &frame(0x32, 1));
        history.record(MessageType::Send, &frame(0x32, 2));

        let hex = history.last_frame(MessageType::Send, 0x32).unwrap();
        assert_eq!(hex, frame(0x32, 2).to_hex());
        assert_eq!(history.last_frame(MessageType::Receive, 0x32), None);
        assert_eq!(history.summary().send_count, 1);
        assert_eq!(history.summary().total_entries, 2);
    }

    #[test]
    fn test_record_error() {
        let mut history = MessageHistory::new();
        history.record_error("Connection timeout");
        assert_eq!(history.last_error(), Some("Connection timeout"));
    }

    #[test]
    fn test_max_entries() {
        let mut history = MessageHistory::with_max_entries(2);
        for sequence in 0..5 {
            history.record(MessageType::Send, &frame(0x13, sequence));
        }
        assert_eq!(history.len(), 2);
        assert_eq!(history.entries()[0].sequence, 3);
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut history = MessageHistory::new();
        history.record(MessageType::Send, &frame(0x13, 1));
        history.record_error("boom");
        history.clear();

        assert!(history.is_empty());
        assert_eq!(history.last_error(), None);
        assert_eq!(history.summary().send_count, 0);
    }
}
