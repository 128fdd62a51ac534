//! Configuration management for Mailforge.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Main application configuration.
///
/// This is loaded from `~/.config/mailforge/config.toml` (or platform
/// equivalent). If the file doesn't exist, default values are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Storage locations (database file, image side-store, signatures)
    pub storage: StorageConfig,
    /// Backup reminder settings
    pub backup: BackupConfig,
}

impl AppConfig {
    /// Load configuration from disk, falling back to defaults if not found.
    ///
    /// # Errors
    /// Returns error if:
    /// - Config directory cannot be determined
    /// - File exists but cannot be read
    /// - File contents are not valid TOML
    pub fn load() -> ConfigResult<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            tracing::debug!("Loading config from {}", config_path.display());
            let contents = fs::read_to_string(&config_path)?;
            let config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration with environment variable overrides.
    ///
    /// Supports the following environment variables:
    /// - `MAILFORGE_DB_FILE`: Override the database file path
    /// - `MAILFORGE_IMAGES_DIR`: Override the image side-store root
    /// - `MAILFORGE_SIGNATURES_DIR`: Override the signature directory
    pub fn load_with_env() -> ConfigResult<Self> {
        let mut config = Self::load()?;

        if let Ok(val) = std::env::var("MAILFORGE_DB_FILE") {
            config.storage.db_file = Some(PathBuf::from(&val));
            tracing::debug!("Override storage.db_file from env: {}", val);
        }

        if let Ok(val) = std::env::var("MAILFORGE_IMAGES_DIR") {
            config.storage.images_dir = Some(PathBuf::from(&val));
            tracing::debug!("Override storage.images_dir from env: {}", val);
        }

        if let Ok(val) = std::env::var("MAILFORGE_SIGNATURES_DIR") {
            config.storage.signatures_dir = Some(PathBuf::from(&val));
            tracing::debug!("Override storage.signatures_dir from env: {}", val);
        }

        Ok(config)
    }

    /// Save configuration to disk.
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> ConfigResult<()> {
        let config_path = Self::config_path()?;
        let config_dir = config_path
            .parent()
            .ok_or_else(|| ConfigError::InvalidValue {
                field: "config_path".to_string(),
                reason: "no parent directory".to_string(),
            })?;

        fs::create_dir_all(config_dir)?;
        tracing::debug!("Saving config to {}", config_path.display());

        let contents = toml::to_string_pretty(self)?;
        fs::write(config_path, contents)?;
        Ok(())
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/mailforge/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs =
            ProjectDirs::from("com", "mailforge", "mailforge").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Get the data directory path.
    ///
    /// Uses XDG base directories: `~/.local/share/mailforge`
    pub fn data_dir() -> ConfigResult<PathBuf> {
        let dirs =
            ProjectDirs::from("com", "mailforge", "mailforge").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.data_dir().to_path_buf())
    }

    /// Resolve the database file path, applying the default when unset.
    pub fn db_file(&self) -> ConfigResult<PathBuf> {
        match &self.storage.db_file {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::data_dir()?.join("mailforge.db")),
        }
    }

    /// Resolve the image side-store root, applying the default when unset.
    pub fn images_dir(&self) -> ConfigResult<PathBuf> {
        match &self.storage.images_dir {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::data_dir()?.join("images")),
        }
    }
}

/// Storage locations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Database file path; defaults to `<data dir>/mailforge.db`
    pub db_file: Option<PathBuf>,
    /// Image side-store root; defaults to `<data dir>/images`
    pub images_dir: Option<PathBuf>,
    /// Per-user signature directory; `None` disables named signatures
    pub signatures_dir: Option<PathBuf>,
}

/// Backup reminder settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackupConfig {
    /// Days between backup reminders (0 = never remind)
    pub reminder_interval_days: u32,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            reminder_interval_days: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert!(config.storage.db_file.is_none());
        assert!(config.storage.signatures_dir.is_none());
        assert_eq!(config.backup.reminder_interval_days, 30);
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("[storage]"));
        assert!(toml_str.contains("[backup]"));

        let parsed: AppConfig = toml::from_str(&toml_str).expect("parse serialized config");
        assert_eq!(
            parsed.backup.reminder_interval_days,
            config.backup.reminder_interval_days
        );
    }

    #[test]
    fn test_config_save_load() {
        let tmp = TempDir::new().expect("create temp dir");
        let config_path = tmp.path().join("config.toml");

        let mut config = AppConfig::default();
        config.storage.db_file = Some(tmp.path().join("custom.db"));
        config.backup.reminder_interval_days = 7;

        let contents = toml::to_string_pretty(&config).expect("serialize config");
        fs::write(&config_path, contents).expect("write config file");

        let loaded_contents = fs::read_to_string(&config_path).expect("read config file");
        let loaded: AppConfig = toml::from_str(&loaded_contents).expect("parse loaded config");

        assert_eq!(loaded.storage.db_file, Some(tmp.path().join("custom.db")));
        assert_eq!(loaded.backup.reminder_interval_days, 7);
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[backup]
reminder_interval_days = 14
"#;

        let config: AppConfig = toml::from_str(toml_str).expect("parse partial config");
        assert_eq!(config.backup.reminder_interval_days, 14);
        // These should be defaults
        assert!(config.storage.db_file.is_none());
        assert!(config.storage.images_dir.is_none());
    }

    #[test]
    fn test_explicit_paths_win_over_defaults() {
        let mut config = AppConfig::default();
        config.storage.db_file = Some(PathBuf::from("/tmp/override.db"));
        config.storage.images_dir = Some(PathBuf::from("/tmp/imgs"));

        assert_eq!(
            config.db_file().expect("resolve db file"),
            PathBuf::from("/tmp/override.db")
        );
        assert_eq!(
            config.images_dir().expect("resolve images dir"),
            PathBuf::from("/tmp/imgs")
        );
    }
}
