//! Error types for the protocol library.
//!
//! [`ProtocolError`] covers framing and I/O failures surfaced by the line
//! codec; [`MessageParseError`] describes why a single line could not be
//! turned into a [`Message`](crate::Message).

use thiserror::Error;

/// Convenience type alias for Results using [`ProtocolError`].
pub type Result<T, E = ProtocolError> = std::result::Result<T, E>;

/// Top-level protocol errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProtocolError {
    /// I/O error during reading or writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A line exceeded the configured maximum before a terminator arrived.
    #[error("line too long: {actual} bytes (limit: {limit})")]
    LineTooLong {
        /// Bytes buffered so far.
        actual: usize,
        /// Maximum allowed length.
        limit: usize,
    },

    /// An outgoing line contained a CR or LF, which would smuggle a second
    /// protocol line onto the wire.
    #[error("outgoing line contains a line break: {0:?}")]
    EmbeddedLineBreak(String),

    /// Failed to parse an IRC message.
    #[error("invalid message: {string}")]
    InvalidMessage {
        /// The invalid message string.
        string: String,
        /// The underlying parse error.
        #[source]
        cause: MessageParseError,
    },
}

/// Errors encountered when parsing IRC messages.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum MessageParseError {
    /// Message was empty.
    #[error("empty message")]
    EmptyMessage,

    /// A prefix was present but no command followed it.
    #[error("missing command")]
    MissingCommand,
}
