//! IRC message types.
//!
//! This module provides the owned [`Message`] type and the [`Sender`] that
//! identifies where a message came from.
//!
//! # Reference
//! - RFC 2812 Section 2.3.1: Message format

mod parse;
mod sender;
mod serialize;
mod types;

pub use sender::Sender;
pub use types::Message;
