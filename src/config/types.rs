//! Core configuration types and loading.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use zeroize::Zeroizing;

use super::defaults::{
    default_command_prefix, default_mechanism, default_quit_reason, default_state_path,
    default_true,
};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Bot configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Where and as whom to connect.
    pub connection: ConnectionConfig,
    /// Behaviour once connected.
    #[serde(default)]
    pub bot: BotConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

/// Server connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionConfig {
    /// Nickname to register with.
    pub nick: String,
    /// Server hostname; also the TLS server name.
    pub host: String,
    /// Port; 6697 with TLS, 6667 without, when unset.
    pub port: Option<u16>,
    /// Wrap the connection in TLS.
    #[serde(default)]
    pub tls: bool,
    /// Skip certificate verification (self-signed test networks only).
    #[serde(default)]
    pub accept_invalid_certs: bool,
    /// Extra PEM trust roots on top of the platform store.
    pub ca_file: Option<PathBuf>,
    /// Maximum accepted line length in bytes.
    pub max_line_len: Option<usize>,
    /// SASL credentials.
    pub sasl: Option<SaslConfig>,
}

impl ConnectionConfig {
    /// The configured port, or the conventional one for the transport.
    pub fn effective_port(&self) -> u16 {
        self.port.unwrap_or(if self.tls { 6697 } else { 6667 })
    }
}

/// SASL configuration.
#[derive(Clone, Deserialize)]
pub struct SaslConfig {
    /// Account name; the nickname is used when unset.
    pub username: Option<String>,
    /// Account password, wiped from memory on drop.
    pub password: Zeroizing<String>,
    /// Mechanism name. Only PLAIN is implemented.
    #[serde(default = "default_mechanism")]
    pub mechanism: String,
}

impl std::fmt::Debug for SaslConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SaslConfig")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("mechanism", &self.mechanism)
            .finish()
    }
}

/// Bot behaviour configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    /// Channels joined once registration completes.
    #[serde(default)]
    pub channels: Vec<String>,
    /// Text sent with QUIT.
    #[serde(default = "default_quit_reason")]
    pub quit_reason: String,
    /// Path of the persisted JSON document.
    #[serde(default = "default_state_path")]
    pub state_path: String,
    /// Prefix of chat commands (`!slap`).
    #[serde(default = "default_command_prefix")]
    pub command_prefix: String,
    /// Run PRIVMSG message handlers even when a command or pattern handler
    /// already claimed the line.
    #[serde(default = "default_true")]
    pub always_dispatch_privmsg: bool,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            channels: Vec::new(),
            quit_reason: default_quit_reason(),
            state_path: default_state_path(),
            command_prefix: default_command_prefix(),
            always_dispatch_privmsg: true,
        }
    }
}
