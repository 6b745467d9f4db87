//! Integration tests for TLS connections.

mod common;

use common::{TestServer, bot_options, tls};
use nettirely::{Bot, ConnectOptions, Error};

#[tokio::test]
async fn test_tls_with_extra_ca_file() {
    let dir = tempfile::tempdir().unwrap();
    let fixture = tls::ca_signed(dir.path()).unwrap();
    let server = TestServer::bind_tls(fixture.server_config).await.unwrap();

    let mut bot = Bot::new(bot_options(dir.path()));
    let opts = ConnectOptions::new("tlsbot", "localhost")
        .port(server.port())
        .tls(true)
        .ca_file(&fixture.ca_path);

    let (result, ()) = tokio::join!(bot.connect(&opts), async {
        let mut conn = server.accept().await.unwrap();
        conn.welcome("tlsbot").await.unwrap();
    });
    result.unwrap();

    assert_eq!(bot.state().nick(), "tlsbot");
}

#[tokio::test]
async fn test_tls_accept_invalid_certs() {
    let dir = tempfile::tempdir().unwrap();
    let server = TestServer::bind_tls(tls::self_signed().unwrap())
        .await
        .unwrap();

    let mut bot = Bot::new(bot_options(dir.path()));
    let opts = ConnectOptions::new("tlsbot", "localhost")
        .port(server.port())
        .tls(true)
        .accept_invalid_certs(true);

    let (result, ()) = tokio::join!(bot.connect(&opts), async {
        let mut conn = server.accept().await.unwrap();
        conn.welcome("tlsbot").await.unwrap();
    });
    result.unwrap();
}

#[tokio::test]
async fn test_tls_untrusted_certificate_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let server = TestServer::bind_tls(tls::self_signed().unwrap())
        .await
        .unwrap();

    let mut bot = Bot::new(bot_options(dir.path()));
    let opts = ConnectOptions::new("tlsbot", "localhost")
        .port(server.port())
        .tls(true);

    let (result, _) = tokio::join!(bot.connect(&opts), server.accept());

    let err = result.unwrap_err();
    assert!(matches!(err, Error::Tls(_)), "got {err:?}");
    assert_eq!(err.error_code(), "tls_error");
    assert!(bot.context().is_none());
}

#[tokio::test]
async fn test_missing_ca_file_fails_before_connecting() {
    let dir = tempfile::tempdir().unwrap();
    let server = TestServer::bind().await.unwrap();

    let mut bot = Bot::new(bot_options(dir.path()));
    let opts = ConnectOptions::new("tlsbot", "localhost")
        .port(server.port())
        .tls(true)
        .ca_file(dir.path().join("missing.pem"));

    let err = bot.connect(&opts).await.unwrap_err();
    assert!(matches!(err, Error::Io(_)), "got {err:?}");
}
