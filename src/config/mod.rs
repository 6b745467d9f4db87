//! Configuration loading and management.
//!
//! - [`types`]: config struct definitions and [`Config::load`]
//! - [`defaults`]: serde default functions
//! - [`validation`]: startup checks that report every problem at once

mod defaults;
mod types;
mod validation;

pub use types::{BotConfig, Config, ConfigError, ConnectionConfig, SaslConfig};
pub use validation::{ValidationError, validate};
