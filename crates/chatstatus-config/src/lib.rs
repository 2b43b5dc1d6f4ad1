//! chatstatus configuration.
//!
//! TOML-based configuration with full validation. All sections use
//! defaults so partial configs work out of the box.
//!
//! ```rust,no_run
//! use chatstatus_config::{load_config, config_to_json};
//!
//! let config = load_config().expect("failed to load config");
//! println!("{}", config_to_json(&config));
//! ```

pub mod schema;
pub mod toml_loader;
pub mod toml_writer;
pub mod validation;

pub use schema::{ChatStatusConfig, CONFIG_SCHEMA_VERSION};
pub use toml_writer::{save_config, save_config_to_path};

use chatstatus_common::ConfigError;

/// Load config from the platform default path, creating it if missing,
/// and validate the result.
pub fn load_config() -> Result<ChatStatusConfig, ConfigError> {
    let config = toml_loader::load_default()?;
    validation::validate(&config)?;
    Ok(config)
}

/// Serialize a config to a pretty-printed JSON string.
pub fn config_to_json(config: &ChatStatusConfig) -> String {
    serde_json::to_string_pretty(config)
        .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize config: {e}\"}}"))
}
