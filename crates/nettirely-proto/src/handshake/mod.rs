//! Sans-IO registration handshake for IRC clients.
//!
//! The machine performs no I/O. It produces the lines to send and consumes
//! parsed server messages; the caller owns the socket.
//!
//! ```text
//! START ──(sasl)──▶ CAP_PENDING ──ACK──▶ AUTH_EXCHANGE ──900──▶ LOGGED_IN
//!   │                                                              │
//!   └──────────────────────────── 001 ─────────────────────────────┴──▶ WELCOMED
//! ```
//!
//! # Example
//!
//! ```
//! use nettirely_proto::{HandshakeConfig, HandshakeMachine, Message, Step};
//!
//! let mut machine = HandshakeMachine::new(HandshakeConfig::new("bot")).unwrap();
//! assert_eq!(machine.start(), vec!["NICK bot", "USER bot 0 * :bot"]);
//!
//! let welcome = Message::parse(":server 001 bot :Welcome").unwrap();
//! assert_eq!(machine.feed(&welcome), Ok(Step::Welcomed));
//! ```

mod machine;

pub use machine::HandshakeMachine;

use std::fmt;

use thiserror::Error;

use crate::sasl::SaslMechanism;

/// Where the handshake currently is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum HandshakeState {
    /// Nothing sent yet, or registration sent without SASL.
    #[default]
    Start,
    /// `CAP REQ sasl` sent, waiting for ACK/NAK.
    CapPending,
    /// Mechanism announced, exchanging `AUTHENTICATE` lines.
    AuthExchange,
    /// Server confirmed the login (900).
    LoggedIn,
    /// Welcome (001) received; registration is complete.
    Welcomed,
    /// The handshake failed and will not progress.
    Failed,
}

/// Configuration for the handshake state machine.
#[derive(Clone, Debug)]
pub struct HandshakeConfig {
    /// Desired nickname.
    pub nickname: String,
    /// SASL credentials, if SASL authentication is desired.
    pub sasl: Option<SaslCredentials>,
}

impl HandshakeConfig {
    /// Registration without SASL.
    pub fn new(nickname: impl Into<String>) -> Self {
        Self {
            nickname: nickname.into(),
            sasl: None,
        }
    }

    /// Attach SASL credentials.
    #[must_use]
    pub fn with_sasl(mut self, credentials: SaslCredentials) -> Self {
        self.sasl = Some(credentials);
        self
    }
}

/// SASL authentication credentials.
#[derive(Clone)]
pub struct SaslCredentials {
    /// Login name; the nickname is used when absent.
    pub username: Option<String>,
    /// Password.
    pub password: String,
    /// Mechanism to request.
    pub mechanism: SaslMechanism,
}

impl SaslCredentials {
    /// PLAIN credentials.
    pub fn plain(username: Option<String>, password: impl Into<String>) -> Self {
        Self {
            username,
            password: password.into(),
            mechanism: SaslMechanism::Plain,
        }
    }
}

impl fmt::Debug for SaslCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SaslCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("mechanism", &self.mechanism)
            .finish()
    }
}

/// What the caller should do after feeding a message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Step {
    /// Send these lines, in order.
    Send(Vec<String>),
    /// Nothing to do; read the next message.
    Wait,
    /// Registration is complete.
    Welcomed,
}

/// Errors that end a handshake.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum HandshakeError {
    /// The server refused SASL or the credentials.
    #[error("SASL authentication rejected: {0}")]
    AuthenticationRejected(String),
    /// The nickname is erroneous (432) or already in use (433).
    #[error("nickname {nick:?} unavailable: {reason}")]
    NicknameUnavailable {
        /// The nickname that was refused.
        nick: String,
        /// Why it was refused.
        reason: String,
    },
    /// Only PLAIN is implemented.
    #[error("SASL mechanism {0:?} is not supported")]
    UnsupportedMechanism(String),
    /// Server sent ERROR.
    #[error("server error: {0}")]
    ServerError(String),
}
