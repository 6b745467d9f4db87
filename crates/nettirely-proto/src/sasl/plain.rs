//! PLAIN SASL mechanism (RFC 4616).
//!
//! # Reference
//! - RFC 4616: <https://tools.ietf.org/html/rfc4616>

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

/// Encode credentials for the PLAIN mechanism.
///
/// The PLAIN mechanism encodes `authzid NUL authcid NUL password`; for IRC
/// the authzid is left empty, so the payload is `\0login\0password`.
///
/// # Example
///
/// ```
/// use nettirely_proto::sasl::encode_plain;
///
/// // Decodes to: "\0testuser\0testpass"
/// assert_eq!(encode_plain("testuser", "testpass"), "AHRlc3R1c2VyAHRlc3RwYXNz");
/// ```
pub fn encode_plain(login: &str, password: &str) -> String {
    let payload = format!("\0{}\0{}", login, password);
    BASE64.encode(payload.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_plain() {
        let encoded = encode_plain("testuser", "testpass");
        let decoded = BASE64.decode(&encoded).unwrap();
        assert_eq!(decoded, b"\0testuser\0testpass");
    }

    #[test]
    fn test_encode_plain_utf8_password() {
        let encoded = encode_plain("bot", "pässwörd");
        let decoded = BASE64.decode(&encoded).unwrap();
        assert_eq!(decoded, "\0bot\0pässwörd".as_bytes());
    }
}
