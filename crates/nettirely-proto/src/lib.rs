//! # nettirely-proto
//!
//! The sans-IO half of the nettirely IRC bot engine: everything that can be
//! expressed without touching a socket.
//!
//! ## Features
//!
//! - Parsing raw lines into [`Message`] values (prefix, command, arguments,
//!   trailing parameter)
//! - A tokio-util [`LineCodec`] that reassembles lines from arbitrary reads
//!   with lossy UTF-8 decoding
//! - SASL PLAIN credential encoding and 400-byte chunking
//! - CTCP ACTION framing
//! - The client registration [`HandshakeMachine`] (CAP / SASL / NICK / USER)
//!
//! ## Quick Start
//!
//! ```rust
//! use nettirely_proto::{Message, Sender};
//!
//! let msg: Message = ":nick!user@host PRIVMSG #chan :hello world".parse().unwrap();
//! assert_eq!(msg.command, "PRIVMSG");
//! assert_eq!(msg.args, vec!["#chan", "hello world"]);
//! assert_eq!(msg.sender, Some(Sender::user("nick", "user", "host")));
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod ctcp;
pub mod error;
pub mod handshake;
#[cfg(feature = "tokio")]
pub mod line;
pub mod message;
pub mod sasl;

pub use self::ctcp::Ctcp;
pub use self::error::{MessageParseError, ProtocolError};
pub use self::handshake::{
    HandshakeConfig, HandshakeError, HandshakeMachine, HandshakeState, SaslCredentials, Step,
};
#[cfg(feature = "tokio")]
pub use self::line::{LineCodec, DEFAULT_MAX_LINE_LEN};
pub use self::message::{Message, Sender};
pub use self::sasl::{chunk_response, encode_plain, SaslMechanism, SASL_CHUNK_SIZE};
