use std::fmt::{self, Display, Formatter};

use super::Message;

/// Writes the line without a terminator. The last argument is written as a
/// trailing parameter when it has to be (empty, contains a space, or starts
/// with `:`).
impl Display for Message {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if let Some(ref sender) = self.sender {
            write!(f, ":{} ", sender)?;
        }

        f.write_str(&self.command)?;

        let count = self.args.len();
        for (i, arg) in self.args.iter().enumerate() {
            let needs_colon =
                i + 1 == count && (arg.is_empty() || arg.contains(' ') || arg.starts_with(':'));
            if needs_colon {
                write!(f, " :{}", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{Message, Sender};

    #[test]
    fn test_display_trailing() {
        let msg = Message::new("PRIVMSG", ["#chan", "hello world"])
            .with_sender(Sender::user("nick", "user", "host"));
        assert_eq!(msg.to_string(), ":nick!user@host PRIVMSG #chan :hello world");
    }

    #[test]
    fn test_display_plain_last_arg() {
        let msg = Message::new("JOIN", ["#chan"]);
        assert_eq!(msg.to_string(), "JOIN #chan");
    }

    #[test]
    fn test_display_reparses() {
        let raw = ":irc.example.com 353 bot = #x :@op +voice plain";
        let msg = Message::parse(raw).unwrap();
        assert_eq!(msg.to_string(), raw);
    }
}
