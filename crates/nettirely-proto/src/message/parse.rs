//! Message parsing implementation.

use std::str::FromStr;

use crate::error::{MessageParseError, ProtocolError};

use super::{Message, Sender};

impl Message {
    /// Parse one line (terminator already stripped).
    ///
    /// Parameters are separated by spaces; runs of spaces between middle
    /// parameters are collapsed. The first parameter starting with `:` takes
    /// the rest of the line verbatim, minus the colon.
    pub fn parse(line: &str) -> Result<Self, MessageParseError> {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.is_empty() {
            return Err(MessageParseError::EmptyMessage);
        }

        let (sender, rest) = match line.strip_prefix(':') {
            Some(prefixed) => {
                let (prefix, rest) = prefixed.split_once(' ').unwrap_or((prefixed, ""));
                (Some(Sender::from_prefix(prefix)), rest)
            }
            None => (None, line),
        };

        let rest = rest.trim_start_matches(' ');
        let (command, mut rest) = rest.split_once(' ').unwrap_or((rest, ""));
        if command.is_empty() {
            return Err(MessageParseError::MissingCommand);
        }

        let mut args = Vec::new();
        loop {
            rest = rest.trim_start_matches(' ');
            if rest.is_empty() {
                break;
            }
            if let Some(trailing) = rest.strip_prefix(':') {
                args.push(trailing.to_owned());
                break;
            }
            match rest.split_once(' ') {
                Some((arg, tail)) => {
                    args.push(arg.to_owned());
                    rest = tail;
                }
                None => {
                    args.push(rest.to_owned());
                    break;
                }
            }
        }

        Ok(Self {
            sender,
            command: command.to_owned(),
            args,
        })
    }
}

impl FromStr for Message {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Message, Self::Err> {
        Message::parse(s).map_err(|cause| ProtocolError::InvalidMessage {
            string: s.to_owned(),
            cause,
        })
    }
}
