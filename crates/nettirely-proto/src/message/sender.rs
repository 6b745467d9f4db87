//! Message origin.

use std::fmt;

/// Where a message came from, as described by its `:prefix`.
///
/// A prefix containing both `!` and `@` names a user (`nick!user@host`);
/// any other prefix is taken as a bare server name. A line without a prefix
/// has no sender at all, which is represented as `Option::<Sender>::None` on
/// [`Message`](super::Message).
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub enum Sender {
    /// A user on the network.
    User {
        /// Nickname.
        nick: String,
        /// Username (ident).
        user: String,
        /// Hostname.
        host: String,
    },
    /// A server.
    Server {
        /// Server name.
        name: String,
    },
}

impl Sender {
    /// Create a user sender.
    ///
    /// # Example
    ///
    /// ```
    /// use nettirely_proto::Sender;
    ///
    /// let sender = Sender::user("nick", "user", "host.example.com");
    /// assert_eq!(sender.nick(), Some("nick"));
    /// ```
    pub fn user(nick: impl Into<String>, user: impl Into<String>, host: impl Into<String>) -> Self {
        Self::User {
            nick: nick.into(),
            user: user.into(),
            host: host.into(),
        }
    }

    /// Create a server sender.
    pub fn server(name: impl Into<String>) -> Self {
        Self::Server { name: name.into() }
    }

    /// Parse a prefix (without its leading `:`).
    ///
    /// Lenient: never fails. The nick is everything before the first `!`,
    /// the host everything after the first `@` that follows it.
    pub fn from_prefix(prefix: &str) -> Self {
        if let Some((nick, rest)) = prefix.split_once('!') {
            if let Some((user, host)) = rest.split_once('@') {
                return Self::user(nick, user, host);
            }
        }
        Self::server(prefix)
    }

    /// The nickname, if this is a user.
    pub fn nick(&self) -> Option<&str> {
        match self {
            Self::User { nick, .. } => Some(nick),
            Self::Server { .. } => None,
        }
    }

    /// Returns true if this is a server.
    pub fn is_server(&self) -> bool {
        matches!(self, Self::Server { .. })
    }
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User { nick, user, host } => write!(f, "{}!{}@{}", nick, user, host),
            Self::Server { name } => f.write_str(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_user_prefix() {
        let sender = Sender::from_prefix("nick!user@host");
        assert_eq!(sender, Sender::user("nick", "user", "host"));
        assert_eq!(sender.to_string(), "nick!user@host");
    }

    #[test]
    fn test_bare_prefix_is_server() {
        let sender = Sender::from_prefix("irc.example.com");
        assert!(sender.is_server());
        assert_eq!(sender.nick(), None);
    }

    #[test]
    fn test_bang_without_at_is_server() {
        let sender = Sender::from_prefix("odd!prefix");
        assert_eq!(sender, Sender::server("odd!prefix"));
    }

    #[test]
    fn test_host_keeps_later_at_signs() {
        let sender = Sender::from_prefix("n!u@h@x");
        assert_eq!(sender, Sender::user("n", "u", "h@x"));
    }
}
