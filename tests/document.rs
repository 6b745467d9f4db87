//! Integration tests for the persisted state document and teardown.

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use common::{bot_options, connect_plain};
use nettirely::{Bot, Document};
use serde_json::json;

#[tokio::test]
async fn test_shutdown_saves_and_next_bot_loads() {
    let dir = tempfile::tempdir().unwrap();

    let mut bot = Bot::new(bot_options(dir.path()));
    let _conn = connect_plain(&mut bot, "testbot").await.unwrap();

    let ctx = bot.context().unwrap();
    ctx.with_document(|doc| {
        doc.insert("greeting", json!("hello"));
        doc.insert("counts", json!({ "alice": 3 }));
    });
    bot.shutdown().unwrap();
    drop(bot);

    let bot = Bot::new(bot_options(dir.path()));
    let doc = bot.state().document.lock();
    assert_eq!(doc.get("greeting"), Some(&json!("hello")));
    assert_eq!(doc.get("counts"), Some(&json!({ "alice": 3 })));
}

#[tokio::test]
async fn test_disconnect_handlers_run_once() {
    let dir = tempfile::tempdir().unwrap();
    let calls = Arc::new(AtomicUsize::new(0));

    let mut bot = Bot::new(bot_options(dir.path()));
    let counter = calls.clone();
    bot.on_disconnect(move |ctx| {
        counter.fetch_add(1, Ordering::SeqCst);
        ctx.with_document(|doc| doc.insert("clean_exit", json!(true)));
    });

    let _conn = connect_plain(&mut bot, "testbot").await.unwrap();

    bot.shutdown().unwrap();
    bot.shutdown().unwrap();
    drop(bot);

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    let doc = Document::load(dir.path().join("state.json"));
    assert_eq!(doc.get("clean_exit"), Some(&json!(true)));
}

#[tokio::test]
async fn test_drop_runs_teardown_after_connect() {
    let dir = tempfile::tempdir().unwrap();

    let mut bot = Bot::new(bot_options(dir.path()));
    let _conn = connect_plain(&mut bot, "testbot").await.unwrap();
    bot.context()
        .unwrap()
        .with_document(|doc| doc.insert("saved_on_drop", json!(1)));
    drop(bot);

    let doc = Document::load(dir.path().join("state.json"));
    assert_eq!(doc.get("saved_on_drop"), Some(&json!(1)));
}

#[tokio::test]
async fn test_no_teardown_without_connect() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    let calls = Arc::new(AtomicUsize::new(0));

    let mut bot = Bot::new(bot_options(dir.path()));
    let counter = calls.clone();
    bot.on_disconnect(move |_ctx| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    bot.shutdown().unwrap();
    drop(bot);

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(!path.exists());
}

#[test]
fn test_corrupt_document_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    std::fs::write(&path, "{ not json").unwrap();

    let doc = Document::load(&path);
    assert!(doc.data().is_empty());

    // The corrupt file is left alone until the next save
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ not json");
}

#[test]
fn test_stale_temp_file_does_not_affect_destination() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");

    let mut doc = Document::empty(&path);
    doc.insert("value", json!(1));
    doc.save().unwrap();

    // Leftover from an interrupted save
    std::fs::write(dir.path().join("state.json.tmp"), "garbage").unwrap();
    let loaded = Document::load(&path);
    assert_eq!(loaded.get("value"), Some(&json!(1)));

    doc.insert("value", json!(2));
    doc.save().unwrap();
    assert_eq!(Document::load(&path).get("value"), Some(&json!(2)));
}
