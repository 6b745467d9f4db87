//! Default value functions for configuration.

pub fn default_mechanism() -> String {
    "PLAIN".to_string()
}

pub fn default_quit_reason() -> String {
    "Goodbye!".to_string()
}

pub fn default_state_path() -> String {
    "state.json".to_string()
}

pub fn default_command_prefix() -> String {
    "!".to_string()
}

/// Returns `true` (for serde defaults).
pub fn default_true() -> bool {
    true
}
