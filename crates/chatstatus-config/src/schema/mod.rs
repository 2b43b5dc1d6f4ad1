//! Configuration schema types for chatstatus.
//!
//! All structs use `serde(default)` so partial configs work correctly.

mod connection;
mod preferences;

pub use connection::*;
pub use preferences::*;

use serde::{Deserialize, Serialize};

/// Current config schema version.
pub const CONFIG_SCHEMA_VERSION: u32 = 1;

/// Root configuration.
///
/// Only override what you want to change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatStatusConfig {
    pub connection: ConnectionConfig,
    pub preferences: PreferencesConfig,
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_connection_values() {
        let config = ChatStatusConfig::default();
        assert_eq!(config.connection.server, DEFAULT_SERVER);
        assert_eq!(config.connection.ping_interval_seconds, 30);
        assert_eq!(config.connection.retry_interval_seconds, 60);
        assert_eq!(config.connection.connect_timeout_seconds, 15);
    }

    #[test]
    fn default_preferences() {
        let config = ChatStatusConfig::default();
        assert!(!config.preferences.debug);
        assert!(config.preferences.show_self);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let toml_str = r#"
[connection]
server = "relay.example.org"
"#;
        let config: ChatStatusConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.connection.server, "relay.example.org");
        assert_eq!(config.connection.ping_interval_seconds, 30);
        assert!(config.preferences.show_self);
    }

    #[test]
    fn empty_toml_is_default() {
        let config: ChatStatusConfig = toml::from_str("").unwrap();
        assert_eq!(config.connection.retry_interval_seconds, 60);
        assert!(!config.preferences.debug);
    }

    #[test]
    fn unknown_sections_are_ignored() {
        let toml_str = r#"
[theme]
name = "dark"

[preferences]
show_self = false
"#;
        let config: ChatStatusConfig = toml::from_str(toml_str).unwrap();
        assert!(!config.preferences.show_self);
    }
}
