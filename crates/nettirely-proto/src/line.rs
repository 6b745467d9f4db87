//! Line-based codec for tokio.
//!
//! Reads newline-terminated lines out of whatever chunks the socket hands
//! over and writes lines back with a `\r\n` terminator.

use bytes::{BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::error::{self, ProtocolError};

/// Maximum line length (8191 bytes, the modern IRC convention).
pub const DEFAULT_MAX_LINE_LEN: usize = 8191;

/// Line codec for IRC traffic.
///
/// Decoding searches for `\n` and strips one preceding `\r`, so both proper
/// `\r\n` framing and bare `\n` are accepted. Each line is decoded as UTF-8
/// with invalid sequences replaced by U+FFFD; decoding never fails. Empty
/// lines are yielded as empty strings and left for the caller to skip.
#[derive(Clone, Debug)]
pub struct LineCodec {
    /// Index of next byte to check for newline
    next_index: usize,
    /// Maximum line length, terminator included
    max_len: usize,
}

impl LineCodec {
    /// Create a codec with the default maximum line length.
    pub fn new() -> Self {
        Self::with_max_len(DEFAULT_MAX_LINE_LEN)
    }

    /// Create a codec with a custom maximum line length.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            next_index: 0,
            max_len,
        }
    }
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for LineCodec {
    type Item = String;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> error::Result<Option<String>> {
        let Some(offset) = src[self.next_index..].iter().position(|b| *b == b'\n') else {
            // No complete line yet - remember where we stopped
            self.next_index = src.len();

            if src.len() > self.max_len {
                return Err(ProtocolError::LineTooLong {
                    actual: src.len(),
                    limit: self.max_len,
                });
            }

            return Ok(None);
        };

        let line = src.split_to(self.next_index + offset + 1);
        self.next_index = 0;

        if line.len() > self.max_len {
            return Err(ProtocolError::LineTooLong {
                actual: line.len(),
                limit: self.max_len,
            });
        }

        let mut content = &line[..line.len() - 1];
        if let Some(stripped) = content.strip_suffix(b"\r") {
            content = stripped;
        }

        Ok(Some(String::from_utf8_lossy(content).into_owned()))
    }

    /// A partial line left when the peer hangs up is discarded; the stream
    /// simply ends.
    fn decode_eof(&mut self, src: &mut BytesMut) -> error::Result<Option<String>> {
        if let Some(line) = self.decode(src)? {
            return Ok(Some(line));
        }
        src.clear();
        self.next_index = 0;
        Ok(None)
    }
}

impl Encoder<String> for LineCodec {
    type Error = ProtocolError;

    fn encode(&mut self, line: String, dst: &mut BytesMut) -> error::Result<()> {
        if line.contains(['\r', '\n']) {
            return Err(ProtocolError::EmbeddedLineBreak(line));
        }

        dst.reserve(line.len() + 2);
        dst.put_slice(line.as_bytes());
        dst.put_slice(b"\r\n");
        Ok(())
    }
}
