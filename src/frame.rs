//! Binary framing for the gateway's TCP protocol.
//!
//! Every message, request or response, is one length-delimited frame:
//!
//! | offset | size | field |
//! |--------|------|-------|
//! | 0      | 2    | length = total frame bytes - 2 (LE) |
//! | 2      | 1    | flag (0 = single node, 2 = zone) |
//! | 3      | 1    | command id |
//! | 4      | 4    | sequence number (LE) |
//! | 8      | ..   | command-specific body |
//!
//! [`Frame`] keeps the raw bytes of one whole frame, length prefix included,
//! because response field offsets are specified relative to the frame start.
//! [`FrameAssembler`] turns the arbitrary chunking of a TCP stream back into
//! whole frames.

use bytes::{Bytes, BytesMut};

use crate::errors::Error;

/// Frame flag for a request addressed to a single node.
pub const FLAG_NODE: u8 = 0x00;
/// Frame flag for a request addressed to a zone (group).
pub const FLAG_ZONE: u8 = 0x02;

/// Size of the length prefix that the `length` field does not count.
const LENGTH_PREFIX_LEN: usize = 2;

/// One complete protocol frame, length prefix included.
///
/// # Example
///
/// ```
/// use lightify_rs::{Frame, FLAG_NODE};
///
/// let frame = Frame::new(FLAG_NODE, 0x32, 7, &[0xAA; 9]);
/// assert_eq!(frame.flag(), FLAG_NODE);
/// assert_eq!(frame.command(), 0x32);
/// assert_eq!(frame.sequence(), 7);
/// assert_eq!(frame.body(), &[0xAA; 9]);
/// assert_eq!(frame.as_bytes().len(), 17);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame(Bytes);

impl Frame {
    /// Bytes of the fixed header: length prefix, flag, command, sequence.
    pub const HEADER_LEN: usize = 8;

    /// Build an outbound frame from its parts.
    pub fn new(flag: u8, command: u8, sequence: u32, body: &[u8]) -> Self {
        let total = Self::HEADER_LEN + body.len();
        let mut buffer = BytesMut::with_capacity(total);
        buffer.extend_from_slice(&((total - LENGTH_PREFIX_LEN) as u16).to_le_bytes());
        buffer.extend_from_slice(&[flag, command]);
        buffer.extend_from_slice(&sequence.to_le_bytes());
        buffer.extend_from_slice(body);
        Frame(buffer.freeze())
    }

    /// Wrap raw bytes as a frame, checking the length field against the
    /// buffer.
    pub fn from_bytes(bytes: Bytes) -> Result<Self, Error> {
        if bytes.len() < Self::HEADER_LEN {
            // Report the real length field when the buffer holds one;
            // zero otherwise, which no valid frame can carry.
            let length = match bytes.get(..2) {
                Some(prefix) => u16::from_le_bytes([prefix[0], prefix[1]]),
                None => 0,
            };
            return Err(Error::Framing { length });
        }
        let length = u16::from_le_bytes([bytes[0], bytes[1]]);
        if length as usize + LENGTH_PREFIX_LEN != bytes.len() {
            return Err(Error::Framing { length });
        }
        Ok(Frame(bytes))
    }

    pub fn flag(&self) -> u8 {
        self.0[2]
    }

    pub fn command(&self) -> u8 {
        self.0[3]
    }

    pub fn sequence(&self) -> u32 {
        u32::from_le_bytes([self.0[4], self.0[5], self.0[6], self.0[7]])
    }

    /// Command-specific body, header excluded.
    pub fn body(&self) -> &[u8] {
        &self.0[Self::HEADER_LEN..]
    }

    /// The whole frame, length prefix included.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Hex rendering of the whole frame, used in logs and history.
    pub fn to_hex(&self) -> String {
        hex_encode(&self.0)
    }
}

/// Lowercase hex rendering of a byte slice.
pub(crate) fn hex_encode(bytes: &[u8]) -> String {
    use std::fmt::Write;

    bytes
        .iter()
        .fold(String::with_capacity(bytes.len() * 2), |mut out, byte| {
            let _ = write!(out, "{byte:02x}");
            out
        })
}

/// Reassembles whole frames out of an arbitrarily chunked byte stream.
///
/// Incomplete trailing bytes are retained between [`feed`](Self::feed)
/// calls; a chunk holding several concatenated frames yields all of them in
/// order. A buffered prefix whose length field cannot describe a real frame
/// (shorter than the 8-byte header) clears the buffer and reports a framing
/// error, leaving the fatality decision to the connection owner.
#[derive(Debug, Default)]
pub struct FrameAssembler {
    buffer: BytesMut,
}

impl FrameAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume one chunk from the transport and return every frame it
    /// completes, possibly none.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<Vec<Frame>, Error> {
        self.buffer.extend_from_slice(chunk);
        let mut frames = Vec::new();
        while let Some(frame) = self.take_frame()? {
            frames.push(frame);
        }
        Ok(frames)
    }

    fn take_frame(&mut self) -> Result<Option<Frame>, Error> {
        if self.buffer.len() < LENGTH_PREFIX_LEN {
            return Ok(None);
        }
        let length = u16::from_le_bytes([self.buffer[0], self.buffer[1]]);
        let expected = length as usize + LENGTH_PREFIX_LEN;
        if expected < Frame::HEADER_LEN {
            self.buffer.clear();
            return Err(Error::Framing { length });
        }
        if self.buffer.len() < expected {
            return Ok(None);
        }
        let bytes = self.buffer.split_to(expected).freeze();
        Ok(Some(Frame(bytes)))
    }

    /// Bytes buffered while waiting for the rest of a frame.
    pub fn pending_bytes(&self) -> usize {
        self.buffer.len()
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}
