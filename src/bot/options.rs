//! Connection and bot options.

use std::path::PathBuf;

use nettirely_proto::{DEFAULT_MAX_LINE_LEN, HandshakeConfig, SaslCredentials, SaslMechanism};
use zeroize::Zeroizing;

use crate::config::{BotConfig, ConnectionConfig};
use crate::state::DEFAULT_QUIT_REASON;

/// Where and how to connect.
#[derive(Clone, Debug)]
pub struct ConnectOptions {
    pub nick: String,
    pub host: String,
    /// 6697 with TLS, 6667 without, when unset.
    pub port: Option<u16>,
    pub tls: bool,
    pub accept_invalid_certs: bool,
    pub ca_file: Option<PathBuf>,
    pub max_line_len: usize,
    pub sasl: Option<SaslOptions>,
}

/// SASL settings for [`ConnectOptions`].
#[derive(Clone)]
pub struct SaslOptions {
    /// Login; the nickname when unset.
    pub username: Option<String>,
    pub password: Zeroizing<String>,
    pub mechanism: String,
}

impl std::fmt::Debug for SaslOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SaslOptions")
            .field("username", &self.username)
            .field("mechanism", &self.mechanism)
            .finish_non_exhaustive()
    }
}

impl ConnectOptions {
    pub fn new(nick: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            nick: nick.into(),
            host: host.into(),
            port: None,
            tls: false,
            accept_invalid_certs: false,
            ca_file: None,
            max_line_len: DEFAULT_MAX_LINE_LEN,
            sasl: None,
        }
    }

    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    #[must_use]
    pub fn tls(mut self, enabled: bool) -> Self {
        self.tls = enabled;
        self
    }

    #[must_use]
    pub fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    #[must_use]
    pub fn ca_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.ca_file = Some(path.into());
        self
    }

    #[must_use]
    pub fn max_line_len(mut self, limit: usize) -> Self {
        self.max_line_len = limit;
        self
    }

    /// Authenticate with SASL PLAIN.
    #[must_use]
    pub fn sasl(mut self, username: Option<String>, password: impl Into<String>) -> Self {
        self.sasl = Some(SaslOptions {
            username,
            password: Zeroizing::new(password.into()),
            mechanism: "PLAIN".to_owned(),
        });
        self
    }

    /// Override the SASL mechanism name. Only PLAIN is implemented; anything
    /// else makes `connect` fail before the socket is opened.
    #[must_use]
    pub fn sasl_mechanism(mut self, mechanism: impl Into<String>) -> Self {
        if let Some(sasl) = self.sasl.as_mut() {
            sasl.mechanism = mechanism.into();
        }
        self
    }

    pub fn effective_port(&self) -> u16 {
        self.port.unwrap_or(if self.tls { 6697 } else { 6667 })
    }

    pub(crate) fn handshake_config(&self) -> HandshakeConfig {
        let mut config = HandshakeConfig::new(self.nick.clone());
        if let Some(sasl) = &self.sasl {
            config = config.with_sasl(SaslCredentials {
                username: sasl.username.clone(),
                password: sasl.password.as_str().to_owned(),
                mechanism: SaslMechanism::parse(&sasl.mechanism),
            });
        }
        config
    }
}

impl From<&ConnectionConfig> for ConnectOptions {
    fn from(config: &ConnectionConfig) -> Self {
        Self {
            nick: config.nick.clone(),
            host: config.host.clone(),
            port: config.port,
            tls: config.tls,
            accept_invalid_certs: config.accept_invalid_certs,
            ca_file: config.ca_file.clone(),
            max_line_len: config.max_line_len.unwrap_or(DEFAULT_MAX_LINE_LEN),
            sasl: config.sasl.as_ref().map(|sasl| SaslOptions {
                username: sasl.username.clone(),
                password: sasl.password.clone(),
                mechanism: sasl.mechanism.clone(),
            }),
        }
    }
}

/// Per-instance behaviour of a [`Bot`](super::Bot).
#[derive(Clone, Debug)]
pub struct BotOptions {
    pub state_path: PathBuf,
    pub quit_reason: String,
    /// See [`BotConfig::always_dispatch_privmsg`].
    pub always_dispatch_privmsg: bool,
}

impl BotOptions {
    pub fn new(state_path: impl Into<PathBuf>) -> Self {
        Self {
            state_path: state_path.into(),
            ..Self::default()
        }
    }
}

impl Default for BotOptions {
    fn default() -> Self {
        Self {
            state_path: PathBuf::from("state.json"),
            quit_reason: DEFAULT_QUIT_REASON.to_owned(),
            always_dispatch_privmsg: true,
        }
    }
}

impl From<&BotConfig> for BotOptions {
    fn from(config: &BotConfig) -> Self {
        Self {
            state_path: PathBuf::from(&config.state_path),
            quit_reason: config.quit_reason.clone(),
            always_dispatch_privmsg: config.always_dispatch_privmsg,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nettirely_proto::HandshakeMachine;

    #[test]
    fn test_default_ports() {
        assert_eq!(ConnectOptions::new("n", "h").effective_port(), 6667);
        assert_eq!(ConnectOptions::new("n", "h").tls(true).effective_port(), 6697);
        assert_eq!(
            ConnectOptions::new("n", "h").tls(true).port(7000).effective_port(),
            7000
        );
    }

    #[test]
    fn test_unsupported_mechanism_fails_machine_construction() {
        let opts = ConnectOptions::new("bot", "h")
            .sasl(None, "pw")
            .sasl_mechanism("EXTERNAL");
        assert!(HandshakeMachine::new(opts.handshake_config()).is_err());

        let opts = ConnectOptions::new("bot", "h").sasl(None, "pw");
        assert!(HandshakeMachine::new(opts.handshake_config()).is_ok());
    }

    #[test]
    fn test_debug_hides_password() {
        let opts = ConnectOptions::new("bot", "h").sasl(Some("acct".into()), "hunter2");
        assert!(!format!("{opts:?}").contains("hunter2"));
    }
}
