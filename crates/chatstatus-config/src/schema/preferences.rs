use serde::{Deserialize, Serialize};

/// User-facing preferences.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreferencesConfig {
    /// Verbose logging of frames and state changes.
    pub debug: bool,
    /// Show the local user's own read-position indicator.
    pub show_self: bool,
}

impl Default for PreferencesConfig {
    fn default() -> Self {
        Self {
            debug: false,
            show_self: true,
        }
    }
}
