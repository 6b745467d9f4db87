//! Framed line transport.
//!
//! [`split`] turns any byte stream into a [`Reader`] that yields complete
//! lines and a cloneable [`Writer`] shared with every handler.

use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use nettirely_proto::LineCodec;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::Mutex;
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::trace;

use crate::error::{Error, Result};

type BoxedRead = Box<dyn AsyncRead + Send + Unpin>;
type BoxedWrite = Box<dyn AsyncWrite + Send + Unpin>;

/// Split a stream into its framed halves.
pub fn split<S>(stream: S, max_line_len: usize) -> (Reader, Writer)
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    let (read_half, write_half) = tokio::io::split(stream);
    let writer = Writer {
        sink: Arc::new(Mutex::new(FramedWrite::new(
            Box::new(write_half) as BoxedWrite,
            LineCodec::with_max_len(max_line_len),
        ))),
    };
    let reader = Reader {
        framed: FramedRead::new(
            Box::new(read_half) as BoxedRead,
            LineCodec::with_max_len(max_line_len),
        ),
        writer: writer.clone(),
    };
    (reader, writer)
}

/// Inbound half of the connection.
pub struct Reader {
    framed: FramedRead<BoxedRead, LineCodec>,
    /// Used to answer PINGs without surfacing them.
    writer: Writer,
}

impl Reader {
    /// Next protocol line with its terminator stripped.
    ///
    /// PINGs are answered and blank lines dropped here, so callers never see
    /// either. Returns [`Error::ConnectionClosed`] at end of stream.
    pub async fn read_line(&mut self) -> Result<String> {
        loop {
            let line = self.next_raw().await?;

            if line.starts_with("PING") {
                self.writer.send_line(line.replacen("PING", "PONG", 1)).await?;
                continue;
            }
            if line.is_empty() {
                continue;
            }

            return Ok(line);
        }
    }

    async fn next_raw(&mut self) -> Result<String> {
        match self.framed.next().await {
            Some(Ok(line)) => {
                trace!(line = %line, "<<");
                Ok(line)
            }
            Some(Err(e)) => Err(e.into()),
            None => Err(Error::ConnectionClosed),
        }
    }
}

/// Outbound half of the connection.
///
/// Cheap to clone; all clones write through the same locked sink, so lines
/// from concurrent handlers never interleave.
#[derive(Clone)]
pub struct Writer {
    sink: Arc<Mutex<FramedWrite<BoxedWrite, LineCodec>>>,
}

impl Writer {
    /// Join tokens with single spaces and send them as one line.
    pub async fn send<I, S>(&self, tokens: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut line = String::new();
        for token in tokens {
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(token.as_ref());
        }
        self.send_line(line).await
    }

    /// Send one line, terminator appended. Returns once it is flushed.
    pub async fn send_line(&self, line: impl Into<String>) -> Result<()> {
        let line = line.into();
        if line.starts_with("AUTHENTICATE ") && line != "AUTHENTICATE PLAIN" {
            trace!(line = "AUTHENTICATE <redacted>", ">>");
        } else {
            trace!(line = %line, ">>");
        }

        let mut sink = self.sink.lock().await;
        sink.send(line).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt, duplex};

    #[tokio::test]
    async fn test_ping_is_answered_and_hidden() {
        let (client, mut server) = duplex(1024);
        let (mut reader, _writer) = split(client, 512);

        server
            .write_all(b"\r\nPING :abc\r\n:s NOTICE * :hello\r\n")
            .await
            .unwrap();

        let line = reader.read_line().await.unwrap();
        assert_eq!(line, ":s NOTICE * :hello");

        let mut buf = [0u8; 64];
        let n = server.read(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"PONG :abc\r\n");
    }

    #[tokio::test]
    async fn test_lines_split_across_writes() {
        let (client, mut server) = duplex(1024);
        let (mut reader, _writer) = split(client, 512);

        server.write_all(b":s 001 bot :Wel").await.unwrap();
        let pending = tokio::spawn(async move {
            let line = reader.read_line().await.unwrap();
            (reader, line)
        });
        server.write_all(b"come\r\n").await.unwrap();

        let (_reader, line) = pending.await.unwrap();
        assert_eq!(line, ":s 001 bot :Welcome");
    }

    #[tokio::test]
    async fn test_eof_is_connection_closed() {
        let (client, server) = duplex(64);
        let (mut reader, _writer) = split(client, 512);
        drop(server);

        assert!(matches!(
            reader.read_line().await,
            Err(Error::ConnectionClosed)
        ));
    }

    #[tokio::test]
    async fn test_eof_mid_line_is_connection_closed() {
        let (client, mut server) = duplex(64);
        let (mut reader, _writer) = split(client, 512);

        server.write_all(b":s NOTICE * :partial").await.unwrap();
        drop(server);

        assert!(matches!(
            reader.read_line().await,
            Err(Error::ConnectionClosed)
        ));
    }

    #[tokio::test]
    async fn test_send_joins_tokens() {
        let (client, mut server) = duplex(1024);
        let (_reader, writer) = split(client, 512);

        writer.send(["PRIVMSG", "#chan", ":hi there"]).await.unwrap();

        let mut buf = [0u8; 64];
        let n = server.read(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"PRIVMSG #chan :hi there\r\n");
    }

    #[tokio::test]
    async fn test_send_rejects_injected_line() {
        let (client, _server) = duplex(1024);
        let (_reader, writer) = split(client, 512);

        let err = writer
            .send(["PRIVMSG", "#chan", ":hi\r\nQUIT :pwned"])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Protocol(_)));
    }
}
