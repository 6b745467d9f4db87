//! Network layer: opening the socket, TLS, line framing and registration.
//!
//! ```text
//! TcpStream ──(tls?)──▶ IrcStream ──split──▶ Reader (FramedRead<LineCodec>)
//!                                       └──▶ Writer (FramedWrite<LineCodec>, shared)
//! ```

pub mod handshake;
pub mod stream;
pub mod tls;
pub mod transport;

pub use stream::IrcStream;
pub use transport::{Reader, Writer, split};

use std::path::Path;

use tokio::net::TcpStream;
use tracing::info;

use crate::error::Result;

/// Open a TCP connection and wrap it in TLS when asked to.
pub async fn open(
    host: &str,
    port: u16,
    tls: bool,
    accept_invalid_certs: bool,
    ca_file: Option<&Path>,
) -> Result<IrcStream> {
    // Build the connector first so a bad CA file fails before any traffic
    let connector = if tls {
        Some(tls::connector(accept_invalid_certs, ca_file)?)
    } else {
        None
    };

    let tcp = TcpStream::connect((host, port)).await?;
    tcp.set_nodelay(true)?;
    info!(host = %host, port, tls, "Connected");

    match connector {
        Some(connector) => {
            let stream = tls::connect(&connector, host, tcp).await?;
            Ok(IrcStream::Tls(Box::new(stream)))
        }
        None => Ok(IrcStream::Plain(tcp)),
    }
}
