//! SASL authentication helpers for IRC.
//!
//! Only the PLAIN mechanism is implemented. Other mechanism names parse to
//! [`SaslMechanism::Unsupported`] so callers can reject them before any
//! credentials are produced.
//!
//! # Reference
//! - IRCv3 SASL: <https://ircv3.net/specs/extensions/sasl-3.1>
//! - RFC 4616 (PLAIN): <https://tools.ietf.org/html/rfc4616>
//!
//! # Example
//!
//! ```
//! use nettirely_proto::sasl::{chunk_response, encode_plain, SaslMechanism};
//!
//! assert_eq!(SaslMechanism::parse("plain"), SaslMechanism::Plain);
//!
//! let encoded = encode_plain("account", "hunter2");
//! let lines: Vec<_> = chunk_response(&encoded).collect();
//! assert_eq!(lines, vec![encoded.as_str()]);
//! ```

mod plain;

pub use plain::encode_plain;

/// Maximum length of a single SASL message chunk (400 bytes).
///
/// Responses longer than this are split over several `AUTHENTICATE` lines.
pub const SASL_CHUNK_SIZE: usize = 400;

/// Marker sent as the whole `AUTHENTICATE` argument for an empty chunk.
pub const SASL_EMPTY_CHUNK: &str = "+";

/// SASL mechanisms known to the client.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SaslMechanism {
    /// PLAIN mechanism (RFC 4616) - simple username/password.
    Plain,
    /// Any other mechanism name.
    Unsupported(String),
}

impl SaslMechanism {
    /// Parse a mechanism name string.
    pub fn parse(name: &str) -> Self {
        if name.eq_ignore_ascii_case("PLAIN") {
            Self::Plain
        } else {
            Self::Unsupported(name.to_owned())
        }
    }

    /// Returns the canonical name of this mechanism.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Plain => "PLAIN",
            Self::Unsupported(s) => s,
        }
    }

    /// Check if this mechanism can be used.
    pub fn is_supported(&self) -> bool {
        matches!(self, Self::Plain)
    }
}

impl std::fmt::Display for SaslMechanism {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Split an encoded SASL response into `AUTHENTICATE` arguments.
///
/// Every chunk is at most [`SASL_CHUNK_SIZE`] bytes. When the payload length
/// is an exact multiple of the chunk size (including an empty payload) a
/// final `+` is yielded, because the server otherwise waits for more data.
pub fn chunk_response(encoded: &str) -> impl Iterator<Item = &str> {
    let needs_terminator = encoded.len() % SASL_CHUNK_SIZE == 0;
    encoded
        .as_bytes()
        .chunks(SASL_CHUNK_SIZE)
        .filter_map(|chunk| std::str::from_utf8(chunk).ok())
        .chain(needs_terminator.then_some(SASL_EMPTY_CHUNK))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mechanism_parse() {
        assert_eq!(SaslMechanism::parse("PLAIN"), SaslMechanism::Plain);
        assert_eq!(SaslMechanism::parse("plain"), SaslMechanism::Plain);
        assert_eq!(
            SaslMechanism::parse("EXTERNAL"),
            SaslMechanism::Unsupported("EXTERNAL".to_owned())
        );
    }

    #[test]
    fn test_mechanism_is_supported() {
        assert!(SaslMechanism::Plain.is_supported());
        assert!(!SaslMechanism::Unsupported("SCRAM-SHA-256".to_owned()).is_supported());
        assert_eq!(SaslMechanism::Plain.to_string(), "PLAIN");
    }

    #[test]
    fn test_chunk_response_short() {
        let chunks: Vec<_> = chunk_response("abc123").collect();
        assert_eq!(chunks, vec!["abc123"]);
    }

    #[test]
    fn test_chunk_response_long() {
        let long = "a".repeat(500);
        let chunks: Vec<_> = chunk_response(&long).collect();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].len(), 400);
        assert_eq!(chunks[1].len(), 100);
    }

    #[test]
    fn test_chunk_response_exact_multiple_gets_terminator() {
        let exact = "b".repeat(800);
        let chunks: Vec<_> = chunk_response(&exact).collect();
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), 400);
        assert_eq!(chunks[1].len(), 400);
        assert_eq!(chunks[2], "+");
    }

    #[test]
    fn test_chunk_response_empty() {
        let chunks: Vec<_> = chunk_response("").collect();
        assert_eq!(chunks, vec!["+"]);
    }
}
