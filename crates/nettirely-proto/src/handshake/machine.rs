//! Handshake state machine core implementation.

use crate::message::Message;
use crate::sasl::{chunk_response, encode_plain, SaslMechanism};

use super::{HandshakeConfig, HandshakeError, HandshakeState, Step};

/// Sans-IO state machine for the client side of IRC registration.
///
/// Handles the optional `CAP REQ sasl` → `AUTHENTICATE` exchange and the
/// NICK/USER → 001 flow.
#[derive(Clone, Debug)]
pub struct HandshakeMachine {
    config: HandshakeConfig,
    state: HandshakeState,
    /// Whether `CAP REQ` was sent and therefore needs a `CAP END`.
    negotiation_started: bool,
    /// Nickname confirmed by the server in 001.
    confirmed_nick: Option<String>,
}

impl HandshakeMachine {
    /// Create a new handshake state machine.
    ///
    /// Fails when SASL credentials name a mechanism other than PLAIN, so the
    /// caller finds out before opening a connection.
    pub fn new(config: HandshakeConfig) -> Result<Self, HandshakeError> {
        if let Some(sasl) = &config.sasl {
            if let SaslMechanism::Unsupported(name) = &sasl.mechanism {
                return Err(HandshakeError::UnsupportedMechanism(name.clone()));
            }
        }

        Ok(Self {
            config,
            state: HandshakeState::Start,
            negotiation_started: false,
            confirmed_nick: None,
        })
    }

    /// Get the current state.
    #[must_use]
    pub fn state(&self) -> HandshakeState {
        self.state
    }

    /// Nickname the server welcomed us with, falling back to the requested
    /// one before 001 arrives.
    #[must_use]
    pub fn nickname(&self) -> &str {
        self.confirmed_nick
            .as_deref()
            .unwrap_or(&self.config.nickname)
    }

    /// USER/realname field: the nickname reduced to alphabetic characters.
    #[must_use]
    pub fn username(&self) -> String {
        let username: String = self
            .config
            .nickname
            .chars()
            .filter(|c| c.is_alphabetic())
            .collect();
        if username.is_empty() {
            self.config.nickname.clone()
        } else {
            username
        }
    }

    /// Start the handshake. Returns the opening lines to send.
    #[must_use]
    pub fn start(&mut self) -> Vec<String> {
        let mut lines = Vec::with_capacity(3);

        if self.config.sasl.is_some() {
            self.negotiation_started = true;
            self.state = HandshakeState::CapPending;
            lines.push("CAP REQ sasl".to_owned());
        }

        let username = self.username();
        lines.push(format!("NICK {}", self.config.nickname));
        lines.push(format!("USER {} 0 * :{}", username, username));
        lines
    }

    /// Feed one parsed server message.
    pub fn feed(&mut self, msg: &Message) -> Result<Step, HandshakeError> {
        if matches!(self.state, HandshakeState::Welcomed | HandshakeState::Failed) {
            return Ok(Step::Wait);
        }

        let result = match msg.command.as_str() {
            "CAP" => self.handle_cap(msg),
            "AUTHENTICATE" => self.handle_authenticate(),
            "900" => self.handle_logged_in(),
            "902" | "904" | "905" | "906" => Err(HandshakeError::AuthenticationRejected(
                reason(msg, "SASL authentication failed"),
            )),
            "432" => Err(self.nick_error(msg, "Erroneous nickname")),
            "433" => Err(self.nick_error(msg, "Nickname is already in use")),
            "ERROR" => Err(HandshakeError::ServerError(
                msg.last_arg().unwrap_or("closing link").to_owned(),
            )),
            "001" => {
                self.confirmed_nick = msg.arg(0).filter(|n| !n.is_empty()).map(str::to_owned);
                self.state = HandshakeState::Welcomed;
                Ok(Step::Welcomed)
            }
            _ => Ok(Step::Wait),
        };

        if result.is_err() {
            self.state = HandshakeState::Failed;
        }
        result
    }

    fn handle_cap(&mut self, msg: &Message) -> Result<Step, HandshakeError> {
        let lists_sasl = msg
            .last_arg()
            .is_some_and(|caps| caps.split_whitespace().any(|cap| cap == "sasl"));
        if !lists_sasl {
            return Ok(Step::Wait);
        }

        match msg.arg(1) {
            Some("ACK") => match &self.config.sasl {
                Some(sasl) => {
                    self.state = HandshakeState::AuthExchange;
                    Ok(Step::Send(vec![format!("AUTHENTICATE {}", sasl.mechanism)]))
                }
                None => Ok(Step::Wait),
            },
            Some("NAK") => Err(HandshakeError::AuthenticationRejected(
                "server does not support SASL".to_owned(),
            )),
            _ => Ok(Step::Wait),
        }
    }

    fn handle_authenticate(&mut self) -> Result<Step, HandshakeError> {
        let Some(sasl) = &self.config.sasl else {
            return Ok(Step::Wait);
        };

        let encoded = match &sasl.mechanism {
            SaslMechanism::Plain => {
                let login = sasl.username.as_deref().unwrap_or(&self.config.nickname);
                encode_plain(login, &sasl.password)
            }
            SaslMechanism::Unsupported(name) => {
                return Err(HandshakeError::UnsupportedMechanism(name.clone()));
            }
        };

        Ok(Step::Send(
            chunk_response(&encoded)
                .map(|chunk| format!("AUTHENTICATE {}", chunk))
                .collect(),
        ))
    }

    fn handle_logged_in(&mut self) -> Result<Step, HandshakeError> {
        self.state = HandshakeState::LoggedIn;
        if self.negotiation_started {
            Ok(Step::Send(vec!["CAP END".to_owned()]))
        } else {
            Ok(Step::Wait)
        }
    }

    fn nick_error(&self, msg: &Message, fallback: &str) -> HandshakeError {
        HandshakeError::NicknameUnavailable {
            nick: self.config.nickname.clone(),
            reason: reason(msg, fallback),
        }
    }
}

/// Human-readable reason from the trailing parameter of a numeric reply.
///
/// The first parameter of a numeric is the target, never the reason.
fn reason(msg: &Message, fallback: &str) -> String {
    match msg.last_arg() {
        Some(text) if msg.args.len() > 1 && !text.is_empty() => text.to_owned(),
        _ => fallback.to_owned(),
    }
}
