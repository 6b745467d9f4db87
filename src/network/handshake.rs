//! Drives the sans-IO [`HandshakeMachine`] over a live transport.

use nettirely_proto::{HandshakeMachine, HandshakeState, Message, Step};
use tracing::{debug, info, warn};

use super::transport::{Reader, Writer};
use crate::error::Result;

/// Run registration to completion.
///
/// Returns the nickname the server welcomed us with. Any failure aborts the
/// attempt; nothing is retried.
pub async fn register(
    reader: &mut Reader,
    writer: &Writer,
    mut machine: HandshakeMachine,
) -> Result<String> {
    for line in machine.start() {
        writer.send_line(line).await?;
    }

    loop {
        let line = reader.read_line().await?;
        let msg = match Message::parse(&line) {
            Ok(msg) => msg,
            Err(e) => {
                warn!(line = %line, error = %e, "Skipping unparseable line during handshake");
                continue;
            }
        };

        let before = machine.state();
        match machine.feed(&msg)? {
            Step::Send(lines) => {
                for line in lines {
                    writer.send_line(line).await?;
                }
            }
            Step::Wait => {}
            Step::Welcomed => {
                let nick = machine.nickname().to_owned();
                info!(nick = %nick, "Registered with server");
                return Ok(nick);
            }
        }

        let after = machine.state();
        if before != after {
            debug!(from = ?before, to = ?after, "Handshake state changed");
            if after == HandshakeState::LoggedIn {
                info!("SASL authentication succeeded");
            }
        }
    }
}
