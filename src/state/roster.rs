//! Channel membership tracking.

use std::collections::HashSet;

use dashmap::DashMap;
use nettirely_proto::Message;

/// Channel name → member nicknames.
///
/// Tracks membership only, no modes. Built from NAMES replies and kept
/// current from JOIN/PART/KICK/QUIT/NICK traffic.
#[derive(Debug, Default)]
pub struct Roster {
    channels: DashMap<String, HashSet<String>>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Union a NAMES list into a channel, dropping `@`/`+` status markers.
    pub fn merge_names<'a>(&self, channel: &str, names: impl IntoIterator<Item = &'a str>) {
        let mut members = self.channels.entry(channel.to_owned()).or_default();
        members.extend(
            names
                .into_iter()
                .map(|name| name.trim_start_matches(['@', '+']))
                .filter(|nick| !nick.is_empty())
                .map(str::to_owned),
        );
    }

    pub fn add(&self, channel: &str, nick: &str) {
        self.channels
            .entry(channel.to_owned())
            .or_default()
            .insert(nick.to_owned());
    }

    /// Returns true if the nick was present.
    pub fn remove(&self, channel: &str, nick: &str) -> bool {
        self.channels
            .get_mut(channel)
            .is_some_and(|mut members| members.remove(nick))
    }

    /// Forget a channel entirely (we left it).
    pub fn forget(&self, channel: &str) {
        self.channels.remove(channel);
    }

    /// Remove a nick from every channel.
    pub fn remove_everywhere(&self, nick: &str) {
        for mut members in self.channels.iter_mut() {
            members.remove(nick);
        }
    }

    /// Rename a nick in every channel it is in.
    pub fn rename(&self, old: &str, new: &str) {
        for mut members in self.channels.iter_mut() {
            if members.remove(old) {
                members.insert(new.to_owned());
            }
        }
    }

    /// Snapshot of a channel's members.
    pub fn members(&self, channel: &str) -> Option<HashSet<String>> {
        self.channels.get(channel).map(|members| members.clone())
    }

    pub fn contains(&self, channel: &str, nick: &str) -> bool {
        self.channels
            .get(channel)
            .is_some_and(|members| members.contains(nick))
    }

    /// Known channel names, in no particular order.
    pub fn channels(&self) -> Vec<String> {
        self.channels.iter().map(|entry| entry.key().clone()).collect()
    }

    pub fn clear(&self) {
        self.channels.clear();
    }

    /// Apply the membership effect of one message.
    ///
    /// `own_nick` is the bot's nickname before the message; leaving a channel
    /// ourselves forgets it. Returns the new own nickname when the message
    /// renamed the bot.
    pub fn apply(&self, msg: &Message, own_nick: &str) -> Option<String> {
        match msg.command.as_str() {
            "353" => {
                if let (Some(channel), Some(names)) = (msg.arg(2), msg.arg(3)) {
                    self.merge_names(channel, names.split_whitespace());
                }
            }
            "JOIN" => {
                if let (Some(channel), Some(nick)) = (msg.arg(0), msg.source_nickname()) {
                    self.add(channel, nick);
                }
            }
            "PART" => {
                if let (Some(channel), Some(nick)) = (msg.arg(0), msg.source_nickname()) {
                    if nick == own_nick {
                        self.forget(channel);
                    } else {
                        self.remove(channel, nick);
                    }
                }
            }
            "KICK" => {
                if let (Some(channel), Some(nick)) = (msg.arg(0), msg.arg(1)) {
                    if nick == own_nick {
                        self.forget(channel);
                    } else {
                        self.remove(channel, nick);
                    }
                }
            }
            "QUIT" => {
                if let Some(nick) = msg.source_nickname() {
                    self.remove_everywhere(nick);
                }
            }
            "NICK" => {
                if let (Some(old), Some(new)) = (msg.source_nickname(), msg.arg(0)) {
                    self.rename(old, new);
                    if old == own_nick {
                        return Some(new.to_owned());
                    }
                }
            }
            _ => {}
        }
        None
    }
}
