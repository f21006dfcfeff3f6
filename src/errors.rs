use std::net::SocketAddr;

use crate::commands::CommandId;

/// All error types that can occur when talking to a Lightify gateway.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The TCP handshake with the gateway did not complete within the
    /// connect window.
    #[error("timed out connecting to gateway {addr}")]
    ConnectTimeout { addr: SocketAddr },

    /// A network socket operation failed while communicating with the gateway.
    #[error("socket {action} error: {err:?}")]
    Socket { action: String, err: std::io::Error },

    /// Every connect attempt of a backoff chain failed.
    #[error("gateway {addr} unreachable after {attempts} connect attempts")]
    GatewayUnreachable { addr: SocketAddr, attempts: u32 },

    /// No response frame with the request's sequence number arrived in time.
    #[error("command {command:?} (seq {sequence}) timed out")]
    CommandTimeout { command: CommandId, sequence: u32 },

    /// The gateway answered with a non-zero failure code.
    #[error("gateway rejected {command:?} with failure code {code:#04x}")]
    ProtocolFailure {
        command: CommandId,
        code: u8,
        /// Raw response frame, hex-encoded, for diagnostics.
        response: String,
    },

    /// The first two bytes of buffered input cannot be a frame length.
    #[error("unparseable frame length header {length:#06x}")]
    Framing { length: u16 },

    /// A response frame ended before the field being decoded.
    #[error("response for {command:?} truncated at {len} bytes")]
    TruncatedResponse { command: CommandId, len: usize },

    /// An operation was issued while the session had no live connection.
    #[error("not connected to gateway")]
    NotConnected,

    /// The session was torn down while the command was outstanding.
    #[error("session disposed")]
    Disposed,

    /// The connection dropped while the command was outstanding.
    #[error("connection to gateway lost")]
    ConnectionLost,

    /// A request was registered under a sequence number already in flight.
    #[error("sequence {0} already has a command in flight")]
    DuplicateSequence(u32),
}

impl Error {
    /// Create a new socket error
    pub fn socket(action: &str, err: std::io::Error) -> Self {
        Error::Socket {
            action: action.to_string(),
            err,
        }
    }

    /// Create a new protocol failure error
    pub(crate) fn protocol_failure(command: CommandId, code: u8, response: String) -> Self {
        Error::ProtocolFailure {
            command,
            code,
            response,
        }
    }

    /// Create a new truncated response error
    pub(crate) fn truncated(command: CommandId, len: usize) -> Self {
        Error::TruncatedResponse { command, len }
    }
}

/// Hacky implementation of PartialEq for testing
#[cfg(test)]
impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.to_string() == other.to_string()
    }
}
