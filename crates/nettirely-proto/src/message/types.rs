use super::Sender;

/// An owned IRC message.
///
/// # Example
///
/// ```
/// use nettirely_proto::Message;
///
/// let msg: Message = "PING :abc".parse().unwrap();
/// assert!(msg.sender.is_none());
/// assert_eq!(msg.command, "PING");
/// assert_eq!(msg.args, vec!["abc"]);
/// ```
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Message {
    /// Message origin, absent when the line had no prefix.
    pub sender: Option<Sender>,
    /// The command token exactly as received (`PRIVMSG`, `001`, ...).
    pub command: String,
    /// Parameters in order; a trailing parameter is the last element.
    pub args: Vec<String>,
}

impl Message {
    /// Create a message without a sender.
    pub fn new<I, S>(command: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            sender: None,
            command: command.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Set the sender.
    #[must_use]
    pub fn with_sender(mut self, sender: Sender) -> Self {
        self.sender = Some(sender);
        self
    }

    /// Parameter at `index`, if present.
    pub fn arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }

    /// The last parameter, if any.
    pub fn last_arg(&self) -> Option<&str> {
        self.args.last().map(String::as_str)
    }

    /// Nickname of the sender if the sender is a user.
    pub fn source_nickname(&self) -> Option<&str> {
        self.sender.as_ref().and_then(Sender::nick)
    }

    /// Returns true if the command is a three-digit numeric reply.
    pub fn is_numeric(&self) -> bool {
        self.command.len() == 3 && self.command.bytes().all(|b| b.is_ascii_digit())
    }

    /// The numeric reply code, if this is a numeric.
    pub fn numeric_code(&self) -> Option<u16> {
        if self.is_numeric() {
            self.command.parse().ok()
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_detection() {
        let welcome = Message::new("001", ["bot", "Welcome"]);
        assert!(welcome.is_numeric());
        assert_eq!(welcome.numeric_code(), Some(1));

        let privmsg = Message::new("PRIVMSG", ["#chan", "hi"]);
        assert!(!privmsg.is_numeric());
        assert_eq!(privmsg.numeric_code(), None);
    }

    #[test]
    fn test_source_nickname() {
        let msg = Message::new("JOIN", ["#chan"]).with_sender(Sender::user("n", "u", "h"));
        assert_eq!(msg.source_nickname(), Some("n"));

        let from_server = Message::new("NOTICE", ["*", "hi"]).with_sender(Sender::server("irc"));
        assert_eq!(from_server.source_nickname(), None);
    }
}
