//! State management module.
//!
//! Contains [`SharedState`] (everything handlers and the dispatch loop both
//! touch) and its parts.

mod document;
mod roster;

pub use document::Document;
pub use roster::Roster;

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::{Mutex, RwLock};
use tokio::sync::Notify;

/// Default QUIT message.
pub const DEFAULT_QUIT_REASON: &str = "Goodbye!";

/// State shared between the dispatch loop and every handler.
#[derive(Debug)]
pub struct SharedState {
    nick: RwLock<String>,
    pub roster: Roster,
    pub document: Mutex<Document>,
    running: AtomicBool,
    /// Survives `start`, so a quit asked for during registration is kept.
    quit_requested: AtomicBool,
    quit_reason: Mutex<String>,
    /// Wakes a dispatch loop blocked on a read when `quit` is called.
    stop: Notify,
}

impl SharedState {
    pub fn new(document: Document) -> Self {
        Self {
            nick: RwLock::new(String::new()),
            roster: Roster::new(),
            document: Mutex::new(document),
            running: AtomicBool::new(false),
            quit_requested: AtomicBool::new(false),
            quit_reason: Mutex::new(DEFAULT_QUIT_REASON.to_owned()),
            stop: Notify::new(),
        }
    }

    pub fn nick(&self) -> String {
        self.nick.read().clone()
    }

    pub fn set_nick(&self, nick: impl Into<String>) {
        *self.nick.write() = nick.into();
    }

    /// Returns true if `name` is the bot's own nickname.
    pub fn is_own_nick(&self, name: &str) -> bool {
        *self.nick.read() == name
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Mark the connection as running unless a quit is already pending.
    pub(crate) fn start(&self) {
        let pending = self.quit_requested.load(Ordering::Acquire);
        self.running.store(!pending, Ordering::Release);
    }

    /// The pending quit has been carried out.
    pub(crate) fn quit_done(&self) {
        self.quit_requested.store(false, Ordering::Release);
    }

    /// Ask the dispatch loop to stop after the current message.
    pub fn request_quit(&self, reason: Option<&str>) {
        if let Some(reason) = reason {
            *self.quit_reason.lock() = reason.to_owned();
        }
        self.quit_requested.store(true, Ordering::Release);
        self.running.store(false, Ordering::Release);
        // notify_one stores a permit, so a loop that is not yet waiting
        // still wakes on its next wait
        self.stop.notify_one();
    }

    pub fn quit_reason(&self) -> String {
        self.quit_reason.lock().clone()
    }

    pub(crate) async fn stopped(&self) {
        self.stop.notified().await;
    }

    pub(crate) fn set_quit_reason(&self, reason: impl Into<String>) {
        *self.quit_reason.lock() = reason.into();
    }
}
