//! Handler signatures and the values handlers receive.

use std::fmt;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use nettirely_proto::{Message, Sender};
use regex::Captures;

use super::Context;
use crate::error::HandlerResult;

/// Future returned by an async handler.
pub type HandlerFuture = BoxFuture<'static, HandlerResult>;

pub(crate) type ConnectFn = Arc<dyn Fn(Context) -> HandlerFuture + Send + Sync>;
pub(crate) type DisconnectFn = Arc<dyn Fn(&Context) + Send + Sync>;
pub(crate) type MessageFn = Arc<dyn Fn(Context, Message) -> HandlerFuture + Send + Sync>;
pub(crate) type CommandFn = Arc<dyn Fn(Context, CommandCall) -> HandlerFuture + Send + Sync>;
pub(crate) type PatternFn = Arc<dyn Fn(Context, PatternMatch) -> HandlerFuture + Send + Sync>;

/// How a command's arguments are delivered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Arity {
    /// Split on whitespace; only fire when there are exactly this many.
    Exact(usize),
    /// Split on whitespace; always fire.
    Any,
    /// Deliver everything after the command word as one argument.
    NoSplit,
}

/// Handle returned by every registration, used to remove it again.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandlerId(pub(crate) u64);

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "handler#{}", self.0)
    }
}

/// A chat command addressed to the bot (`!slap bob`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandCall {
    /// Who sent it.
    pub sender: Option<Sender>,
    /// Where replies should go: the channel, or the sender for a private
    /// message.
    pub reply_to: String,
    /// Arguments, shaped by the registered [`Arity`].
    pub args: Vec<String>,
}

impl CommandCall {
    pub fn arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }

    /// Sender's nickname, if it was a user.
    pub fn nick(&self) -> Option<&str> {
        self.sender.as_ref().and_then(Sender::nick)
    }
}

/// One match of a pattern handler in PRIVMSG text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatternMatch {
    pub sender: Option<Sender>,
    pub reply_to: String,
    /// The whole match.
    pub matched: String,
    /// Capture groups, 1-based as in the pattern; `None` for groups that did
    /// not participate.
    pub groups: Vec<Option<String>>,
    /// Byte offsets of the match in the message text.
    pub start: usize,
    pub end: usize,
}

impl PatternMatch {
    pub(crate) fn from_captures(
        caps: &Captures<'_>,
        sender: Option<Sender>,
        reply_to: String,
    ) -> Self {
        let whole = caps.get(0);
        Self {
            sender,
            reply_to,
            matched: whole.map(|m| m.as_str().to_owned()).unwrap_or_default(),
            groups: caps
                .iter()
                .skip(1)
                .map(|group| group.map(|m| m.as_str().to_owned()))
                .collect(),
            start: whole.map_or(0, |m| m.start()),
            end: whole.map_or(0, |m| m.end()),
        }
    }

    /// Capture group `index` (1-based).
    pub fn group(&self, index: usize) -> Option<&str> {
        index
            .checked_sub(1)
            .and_then(|i| self.groups.get(i))
            .and_then(Option::as_deref)
    }

    pub fn nick(&self) -> Option<&str> {
        self.sender.as_ref().and_then(Sender::nick)
    }
}

/// One handler selected for one message, ready to run.
pub(crate) enum Planned {
    Command {
        handler: CommandFn,
        word: String,
        call: CommandCall,
    },
    Pattern {
        handler: PatternFn,
        pattern: String,
        matched: PatternMatch,
    },
    Message {
        handler: MessageFn,
        message: Message,
    },
}

impl Planned {
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Self::Command { .. } => "command",
            Self::Pattern { .. } => "pattern",
            Self::Message { .. } => "message",
        }
    }

    /// What caused this handler to be selected, for logs.
    pub(crate) fn trigger(&self) -> &str {
        match self {
            Self::Command { word, .. } => word,
            Self::Pattern { pattern, .. } => pattern,
            Self::Message { message, .. } => &message.command,
        }
    }

    pub(crate) fn invoke(self, ctx: Context) -> HandlerFuture {
        match self {
            Self::Command { handler, call, .. } => handler(ctx, call),
            Self::Pattern {
                handler, matched, ..
            } => handler(ctx, matched),
            Self::Message { handler, message } => handler(ctx, message),
        }
    }
}
