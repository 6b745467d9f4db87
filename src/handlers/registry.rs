//! Handler registry and per-message handler selection.
//!
//! Three independent tables (raw command, chat command, pattern) plus the
//! connect and disconnect lists. Registration takes a short write lock;
//! selection clones the chosen handlers out under a read lock, so tables can
//! change while earlier selections are still running.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures_util::FutureExt;
use nettirely_proto::Message;
use parking_lot::RwLock;
use regex::Regex;
use tracing::debug;

use super::types::{
    Arity, CommandCall, CommandFn, ConnectFn, DisconnectFn, HandlerId, MessageFn, PatternFn,
    PatternMatch, Planned,
};
use super::Context;
use crate::error::{Error, HandlerResult, Result};

struct CommandEntry {
    id: HandlerId,
    arity: Arity,
    handler: CommandFn,
}

struct PatternEntry {
    regex: Regex,
    handlers: Vec<(HandlerId, PatternFn)>,
}

#[derive(Default)]
struct Tables {
    connect: Vec<(HandlerId, ConnectFn)>,
    disconnect: Vec<(HandlerId, DisconnectFn)>,
    messages: HashMap<String, Vec<(HandlerId, MessageFn)>>,
    commands: HashMap<String, Vec<CommandEntry>>,
    /// In registration order; one entry per distinct pattern source.
    patterns: Vec<PatternEntry>,
}

/// Registry of handlers.
#[derive(Default)]
pub struct Registry {
    tables: RwLock<Tables>,
    next_id: AtomicU64,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&self) -> HandlerId {
        HandlerId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Run once registration completes, concurrently with the other connect
    /// handlers.
    pub fn on_connect<F, Fut>(&self, handler: F) -> HandlerId
    where
        F: Fn(Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        let id = self.next_id();
        let handler: ConnectFn = Arc::new(move |ctx| handler(ctx).boxed());
        self.tables.write().connect.push((id, handler));
        id
    }

    /// Run synchronously during shutdown, before the document is saved.
    pub fn on_disconnect<F>(&self, handler: F) -> HandlerId
    where
        F: Fn(&Context) + Send + Sync + 'static,
    {
        let id = self.next_id();
        let handler: DisconnectFn = Arc::new(handler);
        self.tables.write().disconnect.push((id, handler));
        id
    }

    /// Run for every message whose command token is `command` (`PRIVMSG`,
    /// `JOIN`, `001`, ...). Matching is case-insensitive.
    pub fn on_message<F, Fut>(&self, command: &str, handler: F) -> HandlerId
    where
        F: Fn(Context, Message) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        let id = self.next_id();
        let handler: MessageFn = Arc::new(move |ctx, msg| handler(ctx, msg).boxed());
        self.tables
            .write()
            .messages
            .entry(command.to_ascii_uppercase())
            .or_default()
            .push((id, handler));
        id
    }

    /// Run when a PRIVMSG's first word is exactly `word` (prefix included,
    /// e.g. `!slap`).
    pub fn on_command<F, Fut>(&self, word: &str, arity: Arity, handler: F) -> Result<HandlerId>
    where
        F: Fn(Context, CommandCall) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        if word.is_empty() {
            return Err(Error::HandlerContractViolation(
                "command word must not be empty".to_owned(),
            ));
        }
        if word.contains(char::is_whitespace) {
            return Err(Error::HandlerContractViolation(format!(
                "command word {word:?} contains whitespace and can never match"
            )));
        }

        let id = self.next_id();
        let handler: CommandFn = Arc::new(move |ctx, call| handler(ctx, call).boxed());
        self.tables
            .write()
            .commands
            .entry(word.to_owned())
            .or_default()
            .push(CommandEntry { id, arity, handler });
        Ok(id)
    }

    /// Run once per non-overlapping match of `pattern` in PRIVMSG text.
    pub fn on_pattern<F, Fut>(&self, pattern: &str, handler: F) -> Result<HandlerId>
    where
        F: Fn(Context, PatternMatch) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        let regex = Regex::new(pattern).map_err(|e| {
            Error::HandlerContractViolation(format!("invalid pattern {pattern:?}: {e}"))
        })?;
        Ok(self.on_regex(regex, handler))
    }

    /// Like [`on_pattern`](Self::on_pattern) with an already compiled regex.
    pub fn on_regex<F, Fut>(&self, regex: Regex, handler: F) -> HandlerId
    where
        F: Fn(Context, PatternMatch) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        let id = self.next_id();
        let handler: PatternFn = Arc::new(move |ctx, m| handler(ctx, m).boxed());

        let mut tables = self.tables.write();
        match tables
            .patterns
            .iter_mut()
            .find(|entry| entry.regex.as_str() == regex.as_str())
        {
            Some(entry) => entry.handlers.push((id, handler)),
            None => tables.patterns.push(PatternEntry {
                regex,
                handlers: vec![(id, handler)],
            }),
        }
        id
    }

    /// Remove one registration. Returns false if it was already gone.
    pub fn remove(&self, id: HandlerId) -> bool {
        let mut tables = self.tables.write();

        let before = tables.len();
        tables.connect.retain(|(hid, _)| *hid != id);
        tables.disconnect.retain(|(hid, _)| *hid != id);
        tables.messages.retain(|_, list| {
            list.retain(|(hid, _)| *hid != id);
            !list.is_empty()
        });
        tables.commands.retain(|_, list| {
            list.retain(|entry| entry.id != id);
            !list.is_empty()
        });
        tables.patterns.retain_mut(|entry| {
            entry.handlers.retain(|(hid, _)| *hid != id);
            !entry.handlers.is_empty()
        });

        let removed = tables.len() != before;
        if removed {
            debug!(%id, "Handler removed");
        }
        removed
    }

    /// Total number of registered handlers.
    pub fn len(&self) -> usize {
        self.tables.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn connect_handlers(&self) -> Vec<ConnectFn> {
        let tables = self.tables.read();
        tables.connect.iter().map(|(_, h)| h.clone()).collect()
    }

    pub(crate) fn disconnect_handlers(&self) -> Vec<DisconnectFn> {
        let tables = self.tables.read();
        tables.disconnect.iter().map(|(_, h)| h.clone()).collect()
    }

    /// Select every handler that should run for `msg`.
    ///
    /// `own_nick` decides the reply target of private messages. With
    /// `always_privmsg` false, PRIVMSG message handlers are skipped when a
    /// command or pattern handler already claimed the line.
    pub(crate) fn plan(&self, msg: &Message, own_nick: &str, always_privmsg: bool) -> Vec<Planned> {
        let tables = self.tables.read();
        let mut planned = Vec::new();
        let mut claimed = false;

        if msg.command == "PRIVMSG"
            && let (Some(target), Some(text)) = (msg.arg(0), msg.arg(1))
        {
            let reply_to = reply_target(msg, target, own_nick);

            let trimmed = text.trim();
            let (word, rest) = match trimmed.split_once(char::is_whitespace) {
                Some((word, rest)) => (word, rest.trim_start()),
                None => (trimmed, ""),
            };

            if let Some(entries) = tables.commands.get(word) {
                let split: Vec<String> = rest.split_whitespace().map(str::to_owned).collect();
                for entry in entries {
                    let args = match entry.arity {
                        Arity::NoSplit => vec![rest.to_owned()],
                        Arity::Any => split.clone(),
                        Arity::Exact(n) if split.len() == n => split.clone(),
                        Arity::Exact(_) => continue,
                    };
                    claimed = true;
                    planned.push(Planned::Command {
                        handler: entry.handler.clone(),
                        word: word.to_owned(),
                        call: CommandCall {
                            sender: msg.sender.clone(),
                            reply_to: reply_to.clone(),
                            args,
                        },
                    });
                }
            }

            for entry in &tables.patterns {
                for caps in entry.regex.captures_iter(text) {
                    claimed = true;
                    let matched =
                        PatternMatch::from_captures(&caps, msg.sender.clone(), reply_to.clone());
                    for (_, handler) in &entry.handlers {
                        planned.push(Planned::Pattern {
                            handler: handler.clone(),
                            pattern: entry.regex.as_str().to_owned(),
                            matched: matched.clone(),
                        });
                    }
                }
            }
        }

        let suppressed = msg.command == "PRIVMSG" && claimed && !always_privmsg;
        if !suppressed && let Some(handlers) = tables.messages.get(&msg.command) {
            for (_, handler) in handlers {
                planned.push(Planned::Message {
                    handler: handler.clone(),
                    message: msg.clone(),
                });
            }
        }

        planned
    }
}

impl Tables {
    fn len(&self) -> usize {
        self.connect.len()
            + self.disconnect.len()
            + self.messages.values().map(Vec::len).sum::<usize>()
            + self.commands.values().map(Vec::len).sum::<usize>()
            + self.patterns.iter().map(|p| p.handlers.len()).sum::<usize>()
    }
}

/// Where a reply to this PRIVMSG should go.
fn reply_target(msg: &Message, target: &str, own_nick: &str) -> String {
    if target.eq_ignore_ascii_case(own_nick) {
        msg.source_nickname().unwrap_or(target).to_owned()
    } else {
        target.to_owned()
    }
}
