//! Client stream abstraction.
//!
//! Provides a unified stream type for both plaintext and TLS connections.

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::TcpStream;
use tokio_rustls::client::TlsStream;

/// A connection to an IRC server.
///
/// Wraps both plaintext TCP and TLS so the transport layer does not care
/// which one it was given.
pub enum IrcStream {
    /// Plaintext TCP connection.
    Plain(TcpStream),
    /// TLS-encrypted connection.
    Tls(Box<TlsStream<TcpStream>>),
}

impl AsyncRead for IrcStream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match self.get_mut() {
            IrcStream::Plain(stream) => Pin::new(stream).poll_read(cx, buf),
            IrcStream::Tls(stream) => Pin::new(stream.as_mut()).poll_read(cx, buf),
        }
    }
}

impl AsyncWrite for IrcStream {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        match self.get_mut() {
            IrcStream::Plain(stream) => Pin::new(stream).poll_write(cx, buf),
            IrcStream::Tls(stream) => Pin::new(stream.as_mut()).poll_write(cx, buf),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            IrcStream::Plain(stream) => Pin::new(stream).poll_flush(cx),
            IrcStream::Tls(stream) => Pin::new(stream.as_mut()).poll_flush(cx),
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            IrcStream::Plain(stream) => Pin::new(stream).poll_shutdown(cx),
            IrcStream::Tls(stream) => Pin::new(stream.as_mut()).poll_shutdown(cx),
        }
    }
}
