//! Integration test common infrastructure.
//!
//! The bot under test talks to an in-process scripted server; tests drive
//! the server side line by line.

pub mod server;
pub mod tls;

#[allow(unused_imports)]
pub use server::{ServerConn, TestServer};

use nettirely::{Bot, BotOptions, ConnectOptions};

/// Bot options with the document in `dir`.
#[allow(dead_code)]
pub fn bot_options(dir: &std::path::Path) -> BotOptions {
    BotOptions::new(dir.join("state.json"))
}

/// Connect `bot` as `nick` through a plain registration and return the
/// server side of the connection.
#[allow(dead_code)]
pub async fn connect_plain(bot: &mut Bot, nick: &str) -> anyhow::Result<ServerConn> {
    let server = TestServer::bind().await?;
    let opts = ConnectOptions::new(nick, "127.0.0.1").port(server.port());

    let (connected, conn) = tokio::join!(bot.connect(&opts), async {
        let mut conn = server.accept().await?;
        conn.welcome(nick).await?;
        anyhow::Ok(conn)
    });
    connected?;
    conn
}
