//! Scripted IRC server.
//!
//! Listens on an ephemeral port and hands each accepted connection to the
//! test as a [`ServerConn`], which reads what the bot sends and writes
//! whatever the test scripts back.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::time::timeout;
use tokio_rustls::TlsAcceptor;
use tokio_rustls::rustls::ServerConfig;

type BoxedRead = Box<dyn AsyncRead + Send + Unpin>;
type BoxedWrite = Box<dyn AsyncWrite + Send + Unpin>;

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

/// A listening test server.
pub struct TestServer {
    listener: TcpListener,
    port: u16,
    acceptor: Option<TlsAcceptor>,
}

impl TestServer {
    /// Bind a plaintext server on 127.0.0.1.
    pub async fn bind() -> anyhow::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let port = listener.local_addr()?.port();
        Ok(Self {
            listener,
            port,
            acceptor: None,
        })
    }

    /// Bind a server that wraps every accepted connection in TLS.
    pub async fn bind_tls(config: ServerConfig) -> anyhow::Result<Self> {
        let mut server = Self::bind().await?;
        server.acceptor = Some(TlsAcceptor::from(Arc::new(config)));
        Ok(server)
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Accept the next connection.
    pub async fn accept(&self) -> anyhow::Result<ServerConn> {
        let (tcp, _) = timeout(RECV_TIMEOUT, self.listener.accept()).await??;

        let (read, write): (BoxedRead, BoxedWrite) = match &self.acceptor {
            Some(acceptor) => {
                let tls = acceptor.accept(tcp).await?;
                let (r, w) = tokio::io::split(tls);
                (Box::new(r), Box::new(w))
            }
            None => {
                let (r, w) = tcp.into_split();
                (Box::new(r), Box::new(w))
            }
        };

        Ok(ServerConn {
            reader: BufReader::new(read),
            writer: write,
        })
    }
}

/// The server side of one accepted connection.
pub struct ServerConn {
    reader: BufReader<BoxedRead>,
    writer: BoxedWrite,
}

impl ServerConn {
    /// Send one line; CRLF is appended.
    pub async fn send(&mut self, line: &str) -> anyhow::Result<()> {
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.write_all(b"\r\n").await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Next line from the bot without its terminator.
    pub async fn recv(&mut self) -> anyhow::Result<String> {
        self.recv_timeout(RECV_TIMEOUT).await
    }

    pub async fn recv_timeout(&mut self, dur: Duration) -> anyhow::Result<String> {
        let mut line = String::new();
        let n = timeout(dur, self.reader.read_line(&mut line)).await??;
        if n == 0 {
            anyhow::bail!("connection closed by bot");
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_owned())
    }

    /// Read lines until one starts with `prefix`, returning it.
    pub async fn expect(&mut self, prefix: &str) -> anyhow::Result<String> {
        loop {
            let line = self.recv().await?;
            if line.starts_with(prefix) {
                return Ok(line);
            }
        }
    }

    /// Assert nothing arrives within `dur`.
    pub async fn expect_silence(&mut self, dur: Duration) {
        if let Ok(line) = self.recv_timeout(dur).await {
            panic!("expected silence, got {line:?}");
        }
    }

    /// Answer a plain NICK/USER registration with a welcome for `nick`.
    pub async fn welcome(&mut self, nick: &str) -> anyhow::Result<()> {
        let nick_line = self.expect("NICK ").await?;
        assert_eq!(nick_line, format!("NICK {nick}"));
        self.expect("USER ").await?;
        self.send(&format!(":irc.test 001 {nick} :Welcome to the test network")).await
    }

    /// Drop the connection from the server side.
    pub async fn close(mut self) -> anyhow::Result<()> {
        self.writer.shutdown().await?;
        Ok(())
    }
}
