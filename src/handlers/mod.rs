//! Event handlers.
//!
//! Handlers are plain async closures (or `async fn`s) registered on a
//! [`Registry`]. Each receives a [`Context`] plus whatever the table it sits
//! in delivers:
//!
//! | table      | key                   | payload            |
//! |------------|-----------------------|--------------------|
//! | message    | command token         | [`Message`]        |
//! | command    | first word of PRIVMSG | [`CommandCall`]    |
//! | pattern    | regex over PRIVMSG    | [`PatternMatch`]   |
//! | connect    | (none)                | (none)             |
//! | disconnect | (none), sync          | (none)             |
//!
//! [`Message`]: nettirely_proto::Message

mod context;
mod registry;
mod types;

pub use context::Context;
pub use registry::Registry;
pub use types::{Arity, CommandCall, HandlerFuture, HandlerId, PatternMatch};

pub(crate) use types::Planned;
