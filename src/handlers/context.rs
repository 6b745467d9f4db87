//! The handle every handler receives.

use std::collections::HashSet;
use std::sync::Arc;

use nettirely_proto::Ctcp;

use super::Registry;
use crate::error::Result;
use crate::network::Writer;
use crate::state::{Document, SharedState};

/// Handler context: send primitives plus the bot's shared state.
///
/// Cheap to clone. Every clone writes through the same connection.
#[derive(Clone)]
pub struct Context {
    writer: Writer,
    state: Arc<SharedState>,
    registry: Arc<Registry>,
}

impl Context {
    pub(crate) fn new(writer: Writer, state: Arc<SharedState>, registry: Arc<Registry>) -> Self {
        Self {
            writer,
            state,
            registry,
        }
    }

    /// The bot's current nickname.
    pub fn nick(&self) -> String {
        self.state.nick()
    }

    pub fn state(&self) -> &Arc<SharedState> {
        &self.state
    }

    /// Registry, for adding or removing handlers at runtime.
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Members of `channel` as last seen.
    pub fn channel_users(&self, channel: &str) -> Option<HashSet<String>> {
        self.state.roster.members(channel)
    }

    /// Run `f` with the persisted document locked.
    ///
    /// Do not hold onto anything borrowed from the document across an await.
    pub fn with_document<R>(&self, f: impl FnOnce(&mut Document) -> R) -> R {
        f(&mut self.state.document.lock())
    }

    /// Save the persisted document now.
    pub fn save_document(&self) -> Result<()> {
        self.state.document.lock().save()
    }

    /// Send tokens joined by single spaces.
    pub async fn send<I, S>(&self, tokens: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.writer.send(tokens).await
    }

    /// Send a preformatted line.
    pub async fn send_raw(&self, line: impl Into<String>) -> Result<()> {
        self.writer.send_line(line).await
    }

    pub async fn join_channel(&self, channel: &str) -> Result<()> {
        self.send(["JOIN", channel]).await
    }

    pub async fn part_channel(&self, channel: &str, reason: Option<&str>) -> Result<()> {
        match reason {
            Some(reason) => self.send(["PART", channel, &format!(":{reason}")]).await,
            None => self.send(["PART", channel]).await,
        }
    }

    pub async fn kick(&self, channel: &str, nick: &str, reason: &str) -> Result<()> {
        self.send(["KICK", channel, nick, &format!(":{reason}")]).await
    }

    pub async fn send_notice(&self, target: &str, text: &str) -> Result<()> {
        self.send(["NOTICE", target, &format!(":{text}")]).await
    }

    pub async fn send_privmsg(&self, target: &str, text: &str) -> Result<()> {
        self.send(["PRIVMSG", target, &format!(":{text}")]).await
    }

    /// `/me` to `target`.
    pub async fn send_action(&self, target: &str, action: &str) -> Result<()> {
        let ctcp = Ctcp::action(action);
        self.send(["PRIVMSG", target, &format!(":{ctcp}")]).await
    }

    /// Stop the dispatch loop after the current message; QUIT is sent with
    /// `reason`, or the configured default.
    pub fn quit(&self, reason: Option<&str>) {
        self.state.request_quit(reason);
    }
}
