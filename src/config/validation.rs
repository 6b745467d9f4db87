//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::Config;
use nettirely_proto::SaslMechanism;
use thiserror::Error;

/// Validation errors for configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("connection.nick is required")]
    MissingNick,
    #[error("connection.nick must not contain whitespace, got '{0}'")]
    InvalidNick(String),
    #[error("connection.host is required")]
    MissingHost,
    #[error("connection.sasl.mechanism '{0}' is not supported (only PLAIN)")]
    UnsupportedMechanism(String),
    #[error("connection.sasl.password must not be empty")]
    EmptySaslPassword,
    #[error("connection.ca_file does not exist: {0}")]
    CaFileNotFound(String),
    #[error("connection.max_line_len must be at least 512, got {0}")]
    LineLimitTooSmall(usize),
    #[error("bot.command_prefix must not contain whitespace")]
    InvalidCommandPrefix,
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let conn = &config.connection;

    if conn.nick.is_empty() {
        errors.push(ValidationError::MissingNick);
    } else if conn.nick.contains(char::is_whitespace) {
        errors.push(ValidationError::InvalidNick(conn.nick.clone()));
    }
    if conn.host.is_empty() {
        errors.push(ValidationError::MissingHost);
    }

    if let Some(ref sasl) = conn.sasl {
        if !SaslMechanism::parse(&sasl.mechanism).is_supported() {
            errors.push(ValidationError::UnsupportedMechanism(sasl.mechanism.clone()));
        }
        if sasl.password.is_empty() {
            errors.push(ValidationError::EmptySaslPassword);
        }
    }

    if let Some(ref ca_file) = conn.ca_file
        && !ca_file.exists()
    {
        errors.push(ValidationError::CaFileNotFound(ca_file.display().to_string()));
    }

    // RFC 1459 lines are 512 bytes; anything smaller cuts off ordinary traffic
    if let Some(limit) = conn.max_line_len
        && limit < 512
    {
        errors.push(ValidationError::LineLimitTooSmall(limit));
    }

    if config.bot.command_prefix.contains(char::is_whitespace) {
        errors.push(ValidationError::InvalidCommandPrefix);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
