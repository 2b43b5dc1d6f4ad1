//! Write ChatStatusConfig to TOML on disk.
//!
//! Uses atomic writes (write to `.tmp`, then rename) so a crash mid-write
//! never leaves a truncated config behind.

use std::path::Path;

use chatstatus_common::ConfigError;

use crate::schema::ChatStatusConfig;
use crate::toml_loader::default_config_path;

// =============================================================================
// PUBLIC API
// =============================================================================

/// Write config to the platform default path.
pub fn save_config(config: &ChatStatusConfig) -> Result<(), ConfigError> {
    let path = default_config_path()?;
    save_config_to_path(config, &path)
}

/// Write config to a specific path, creating parent directories as needed.
pub fn save_config_to_path(config: &ChatStatusConfig, path: &Path) -> Result<(), ConfigError> {
    let toml_str = toml::to_string_pretty(config)
        .map_err(|e| ConfigError::ParseError(format!("failed to serialize config to TOML: {e}")))?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            ConfigError::ParseError(format!(
                "failed to create config directory {}: {e}",
                parent.display()
            ))
        })?;
    }

    let tmp_path = path.with_extension("toml.tmp");
    std::fs::write(&tmp_path, &toml_str).map_err(|e| {
        ConfigError::ParseError(format!(
            "failed to write config to {}: {e}",
            tmp_path.display()
        ))
    })?;

    if let Err(e) = std::fs::rename(&tmp_path, path) {
        tracing::warn!("atomic rename failed ({}), falling back to direct write", e);
        std::fs::write(path, &toml_str).map_err(|e2| {
            ConfigError::ParseError(format!(
                "failed to write config to {}: {e2}",
                path.display()
            ))
        })?;
    }

    tracing::debug!(path = %path.display(), "Config saved to disk");
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn save_config_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = ChatStatusConfig::default();
        config.connection.server = "localhost:9000".into();
        config.preferences.show_self = false;
        save_config_to_path(&config, &path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let parsed: ChatStatusConfig = toml::from_str(&contents).unwrap();
        assert_eq!(parsed.connection.server, "localhost:9000");
        assert!(!parsed.preferences.show_self);
        assert_eq!(
            parsed.connection.ping_interval_seconds,
            config.connection.ping_interval_seconds
        );
    }

    #[test]
    fn save_config_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("deep").join("config.toml");

        save_config_to_path(&ChatStatusConfig::default(), &path).unwrap();

        assert!(path.exists());
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("sechat.quickmediasolutions.com"));
    }

    #[test]
    fn save_config_cleans_up_tmp_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        save_config_to_path(&ChatStatusConfig::default(), &path).unwrap();

        let tmp_path = path.with_extension("toml.tmp");
        assert!(
            !tmp_path.exists(),
            "tmp file should be cleaned up after rename"
        );
    }
}
