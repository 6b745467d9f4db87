//! Unified error handling for the bot engine.
//!
//! Everything the engine itself can fail with funnels into [`Error`]. Handler
//! bodies use `anyhow` and never produce an [`Error`] directly; their failures
//! are logged by the dispatch loop instead.

use nettirely_proto::{HandshakeError, ProtocolError};
use thiserror::Error;

/// Engine errors.
#[derive(Debug, Error)]
pub enum Error {
    /// The peer closed the socket (a read returned zero bytes).
    #[error("connection closed by peer")]
    ConnectionClosed,

    #[error("SASL authentication rejected: {0}")]
    AuthenticationRejected(String),

    #[error("nickname {nick:?} unavailable: {reason}")]
    NicknameUnavailable { nick: String, reason: String },

    #[error("SASL mechanism {0:?} is not supported")]
    UnsupportedMechanism(String),

    /// A registration could never be honoured (bad command word, bad pattern).
    #[error("handler contract violation: {0}")]
    HandlerContractViolation(String),

    #[error("server error: {0}")]
    ServerError(String),

    #[error("tls error: {0}")]
    Tls(#[from] tokio_rustls::rustls::Error),

    #[error("invalid server name: {0}")]
    InvalidServerName(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("protocol error: {0}")]
    Protocol(ProtocolError),

    #[error("state document error: {0}")]
    State(#[from] serde_json::Error),

    /// A send primitive was used before `connect` or after teardown.
    #[error("not connected")]
    NotConnected,
}

impl Error {
    /// Get a static error code string for structured logs.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ConnectionClosed => "connection_closed",
            Self::AuthenticationRejected(_) => "authentication_rejected",
            Self::NicknameUnavailable { .. } => "nickname_unavailable",
            Self::UnsupportedMechanism(_) => "unsupported_mechanism",
            Self::HandlerContractViolation(_) => "handler_contract_violation",
            Self::ServerError(_) => "server_error",
            Self::Tls(_) => "tls_error",
            Self::InvalidServerName(_) => "invalid_server_name",
            Self::Io(_) => "io_error",
            Self::Protocol(_) => "protocol_error",
            Self::State(_) => "state_error",
            Self::NotConnected => "not_connected",
        }
    }

    /// Returns true if the error means the connection is gone.
    pub fn is_disconnect(&self) -> bool {
        matches!(self, Self::ConnectionClosed | Self::Io(_) | Self::NotConnected)
    }
}

impl From<HandshakeError> for Error {
    fn from(err: HandshakeError) -> Self {
        match err {
            HandshakeError::AuthenticationRejected(reason) => Self::AuthenticationRejected(reason),
            HandshakeError::NicknameUnavailable { nick, reason } => {
                Self::NicknameUnavailable { nick, reason }
            }
            HandshakeError::UnsupportedMechanism(name) => Self::UnsupportedMechanism(name),
            HandshakeError::ServerError(reason) => Self::ServerError(reason),
        }
    }
}

impl From<ProtocolError> for Error {
    fn from(err: ProtocolError) -> Self {
        match err {
            ProtocolError::Io(io) => Self::Io(io),
            other => Self::Protocol(other),
        }
    }
}

/// Result type for engine operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Result type for handler bodies.
pub type HandlerResult = anyhow::Result<()>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handshake_errors_map_one_to_one() {
        let err: Error = HandshakeError::NicknameUnavailable {
            nick: "bot".to_owned(),
            reason: "Nickname is already in use".to_owned(),
        }
        .into();
        assert_eq!(err.error_code(), "nickname_unavailable");

        let err: Error = HandshakeError::UnsupportedMechanism("EXTERNAL".to_owned()).into();
        assert!(matches!(err, Error::UnsupportedMechanism(ref m) if m == "EXTERNAL"));
    }

    #[test]
    fn test_protocol_io_is_unwrapped() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "gone");
        let err: Error = ProtocolError::Io(io).into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.is_disconnect());

        let err: Error = ProtocolError::LineTooLong {
            actual: 9000,
            limit: 8191,
        }
        .into();
        assert_eq!(err.error_code(), "protocol_error");
        assert!(!err.is_disconnect());
    }
}
