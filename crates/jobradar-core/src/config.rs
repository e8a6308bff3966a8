//! Configuration management for jobradar.
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
/// Loaded from `~/.config/jobradar/config.toml` (or platform equivalent).
/// If the file doesn't exist, default values are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP server settings
    pub server: ServerConfig,
    /// Database settings
    pub database: DatabaseConfig,
    /// Scraping behavior settings
    pub scraping: ScrapingConfig,
    /// Scheduler settings
    pub scheduler: SchedulerConfig,
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
    /// - `JOBRADAR_BIND_ADDR`: Override the HTTP bind address
    /// - `JOBRADAR_DB_PATH`: Override the database path
    /// - `JOBRADAR_DEFINITIONS_DIR`: Override the source-definitions directory
    /// - `JOBRADAR_INTERVAL_HOURS`: Override the scheduler cadence
    pub fn load_with_env() -> ConfigResult<Self> {
        let mut config = Self::load()?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides to an already-loaded config.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("JOBRADAR_BIND_ADDR") {
            tracing::debug!("Override server.bind_addr from env: {}", val);
            self.server.bind_addr = val;
        }

        if let Ok(val) = std::env::var("JOBRADAR_DB_PATH") {
            tracing::debug!("Override database.path from env: {}", val);
            self.database.path = Some(PathBuf::from(val));
        }

        if let Ok(val) = std::env::var("JOBRADAR_DEFINITIONS_DIR") {
            tracing::debug!("Override scraping.definitions_dir from env: {}", val);
            self.scraping.definitions_dir = PathBuf::from(val);
        }

        if let Ok(val) = std::env::var("JOBRADAR_INTERVAL_HOURS") {
            if let Ok(hours) = val.parse() {
                tracing::debug!("Override scheduler.interval_hours from env: {}", hours);
                self.scheduler.interval_hours = hours;
            }
        }
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
    /// Uses XDG base directories: `~/.config/jobradar/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs =
            ProjectDirs::from("io", "jobradar", "jobradar").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Get the data directory path.
    ///
    /// Uses XDG base directories: `~/.local/share/jobradar`
    pub fn data_dir() -> ConfigResult<PathBuf> {
        let dirs =
            ProjectDirs::from("io", "jobradar", "jobradar").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.data_dir().to_path_buf())
    }

    /// Resolve the database path, defaulting to the data directory.
    pub fn database_path(&self) -> ConfigResult<PathBuf> {
        match &self.database.path {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::data_dir()?.join("jobradar.db")),
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the HTTP server binds to
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:5000".to_string(),
        }
    }
}

/// Database settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite file path; `None` resolves under the XDG data directory
    pub path: Option<PathBuf>,
}

/// Scraping behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapingConfig {
    /// Directory of per-source definition TOML files
    pub definitions_dir: PathBuf,
    /// Directory where diagnostic page snapshots are written
    pub snapshot_dir: PathBuf,
    /// How many sources may be fetched concurrently during a full run
    pub max_concurrent_sources: usize,
    /// Navigation timeout in seconds
    pub nav_timeout_secs: u64,
    /// Navigation attempts per fetch
    pub max_attempts: u32,
    /// Fixed pause between navigation attempts, in seconds
    pub retry_delay_secs: u64,
    /// Initial wait after navigation, before scrolling, in seconds
    pub settle_wait_secs: u64,
    /// Scroll-to-bottom cycles after the initial wait
    pub scroll_cycles: u32,
    /// Pause after each scroll cycle, in seconds
    pub scroll_pause_secs: u64,
}

impl Default for ScrapingConfig {
    fn default() -> Self {
        Self {
            definitions_dir: PathBuf::from("source-definitions"),
            snapshot_dir: PathBuf::from("snapshots"),
            max_concurrent_sources: 3,
            nav_timeout_secs: 60,
            max_attempts: 3,
            retry_delay_secs: 5,
            settle_wait_secs: 5,
            scroll_cycles: 3,
            scroll_pause_secs: 2,
        }
    }
}

/// Scheduler settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Whether the background schedule runs at all
    pub enabled: bool,
    /// Hours between scheduled full runs. The first run fires right at
    /// startup; subsequent runs follow at this interval.
    pub interval_hours: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_hours: 6,
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
        assert_eq!(config.server.bind_addr, "127.0.0.1:5000");
        assert_eq!(config.scraping.nav_timeout_secs, 60);
        assert_eq!(config.scraping.max_attempts, 3);
        assert_eq!(config.scraping.retry_delay_secs, 5);
        assert_eq!(config.scraping.scroll_cycles, 3);
        assert_eq!(config.scheduler.interval_hours, 6);
        assert!(config.scheduler.enabled);
        assert!(config.database.path.is_none());
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("[server]"));
        assert!(toml_str.contains("[scraping]"));
        assert!(toml_str.contains("[scheduler]"));

        let parsed: AppConfig = toml::from_str(&toml_str).expect("parse serialized config");
        assert_eq!(parsed.server.bind_addr, config.server.bind_addr);
    }

    #[test]
    fn test_config_save_load() {
        let tmp = TempDir::new().expect("create temp dir");
        let config_path = tmp.path().join("config.toml");

        let mut config = AppConfig::default();
        config.server.bind_addr = "0.0.0.0:8080".to_string();
        config.scheduler.interval_hours = 12;

        let contents = toml::to_string_pretty(&config).expect("serialize config");
        fs::write(&config_path, contents).expect("write config file");

        let loaded_contents = fs::read_to_string(&config_path).expect("read config file");
        let loaded: AppConfig = toml::from_str(&loaded_contents).expect("parse loaded config");

        assert_eq!(loaded.server.bind_addr, "0.0.0.0:8080");
        assert_eq!(loaded.scheduler.interval_hours, 12);
    }

    #[test]
    fn test_env_overrides() {
        std::env::set_var("JOBRADAR_BIND_ADDR", "0.0.0.0:9000");
        std::env::set_var("JOBRADAR_INTERVAL_HOURS", "3");

        let mut config = AppConfig::default();
        config.apply_env_overrides();

        assert_eq!(config.server.bind_addr, "0.0.0.0:9000");
        assert_eq!(config.scheduler.interval_hours, 3);

        std::env::remove_var("JOBRADAR_BIND_ADDR");
        std::env::remove_var("JOBRADAR_INTERVAL_HOURS");
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[scheduler]
interval_hours = 2
"#;

        let config: AppConfig = toml::from_str(toml_str).expect("parse partial config");
        assert_eq!(config.scheduler.interval_hours, 2);
        // These should be defaults
        assert_eq!(config.server.bind_addr, "127.0.0.1:5000");
        assert_eq!(config.scraping.max_attempts, 3);
    }
}
