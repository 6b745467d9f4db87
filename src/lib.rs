//! nettirely - an async IRC bot engine.
//!
//! The engine owns the connection (TCP or TLS), registration with optional
//! SASL PLAIN, and a dispatch loop that routes each inbound message to the
//! handlers registered for it. Handlers for one message run concurrently;
//! messages themselves are handled strictly in order.
//!
//! ```no_run
//! use nettirely::{Arity, Bot, BotOptions, ConnectOptions};
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let mut bot = Bot::new(BotOptions::new("state.json"));
//!
//! bot.on_connect(|ctx| async move {
//!     ctx.join_channel("#nettirely").await?;
//!     Ok(())
//! });
//! bot.on_command("!slap", Arity::Exact(1), |ctx, call| async move {
//!     let action = format!("slaps {} around a bit with a large trout", call.args[0]);
//!     ctx.send_action(&call.reply_to, &action).await?;
//!     Ok(())
//! })?;
//!
//! bot.connect(&ConnectOptions::new("nettirely", "irc.libera.chat").tls(true))
//!     .await?;
//! bot.run().await?;
//! bot.shutdown()?;
//! # Ok(())
//! # }
//! ```

pub mod bot;
pub mod config;
pub mod error;
pub mod handlers;
pub mod network;
pub mod state;
pub mod telemetry;

pub use bot::{Bot, BotOptions, ConnectOptions, QuitHandle, SaslOptions};
pub use error::{Error, HandlerResult, Result};
pub use handlers::{Arity, CommandCall, Context, HandlerId, PatternMatch, Registry};
pub use state::{Document, Roster, SharedState};

pub use nettirely_proto as proto;
pub use nettirely_proto::{Message, Sender};
