//! CTCP (Client-to-Client Protocol) framing.
//!
//! CTCP messages ride inside PRIVMSG/NOTICE text, wrapped in `\x01`
//! delimiters. The engine only ever sends ACTION (`/me`), but incoming CTCP
//! can be recognised so handlers can tell an emote from plain text.
//!
//! # Reference
//! - CTCP reference: <https://modern.ircdocs.horse/ctcp.html>
//!
//! # Example
//!
//! ```
//! use nettirely_proto::ctcp::Ctcp;
//!
//! let ctcp = Ctcp::parse("\x01ACTION waves hello\x01").unwrap();
//! assert!(ctcp.is_action());
//! assert_eq!(ctcp.params, Some("waves hello"));
//!
//! assert_eq!(Ctcp::action("dances").to_string(), "\x01ACTION dances\x01");
//! ```

use std::fmt;

/// The CTCP delimiter character (`\x01`).
pub const CTCP_DELIM: char = '\x01';

/// A CTCP message borrowed from PRIVMSG text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ctcp<'a> {
    /// The CTCP command (`ACTION`, `VERSION`, ...), as sent.
    pub command: &'a str,
    /// Everything after the command, if present.
    pub params: Option<&'a str>,
}

impl<'a> Ctcp<'a> {
    /// Build an ACTION.
    pub fn action(text: &'a str) -> Self {
        Self {
            command: "ACTION",
            params: Some(text),
        }
    }

    /// Parse CTCP framing out of message text.
    ///
    /// The closing delimiter is optional, as several clients omit it.
    pub fn parse(text: &'a str) -> Option<Self> {
        let inner = text.strip_prefix(CTCP_DELIM)?;
        let inner = inner.strip_suffix(CTCP_DELIM).unwrap_or(inner);
        if inner.is_empty() {
            return None;
        }

        let (command, params) = match inner.split_once(' ') {
            Some((command, params)) => (command, Some(params)),
            None => (inner, None),
        };

        Some(Self { command, params })
    }

    /// Returns true for ACTION.
    pub fn is_action(&self) -> bool {
        self.command.eq_ignore_ascii_case("ACTION")
    }
}

impl fmt::Display for Ctcp<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.params {
            Some(params) => write!(f, "{}{} {}{}", CTCP_DELIM, self.command, params, CTCP_DELIM),
            None => write!(f, "{}{}{}", CTCP_DELIM, self.command, CTCP_DELIM),
        }
    }
}
