//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/focusdo/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/focusdo/` (~/.config/focusdo/)
//! - Data: `$XDG_DATA_HOME/focusdo/` (~/.local/share/focusdo/)
//! - State/Logs: `$XDG_STATE_HOME/focusdo/` (~/.local/state/focusdo/)

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_DATA_HOME or ~/.local/share
fn xdg_data_home() -> PathBuf {
    std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/share"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Focus timer configuration
    #[serde(default)]
    pub timer: TimerConfig,

    /// Storage location overrides
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Maximum number of log files to keep
    #[serde(default = "default_max_log_files")]
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            max_files: default_max_log_files(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_log_files() -> usize {
    5
}

/// Focus timer configuration
#[derive(Debug, Deserialize, Clone)]
pub struct TimerConfig {
    /// Session length selected when no duration is given
    #[serde(default = "default_timer_minutes")]
    pub default_minutes: u32,

    /// Session lengths offered to the user, in minutes
    #[serde(default = "default_timer_presets")]
    pub presets: Vec<u32>,

    /// Partial sessions shorter than this are discarded on early end
    #[serde(default = "default_min_recorded_secs")]
    pub min_recorded_secs: u64,

    /// Wall-clock length of one timer tick in milliseconds
    #[serde(default = "default_tick_millis")]
    pub tick_millis: u64,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            default_minutes: default_timer_minutes(),
            presets: default_timer_presets(),
            min_recorded_secs: default_min_recorded_secs(),
            tick_millis: default_tick_millis(),
        }
    }
}

impl TimerConfig {
    /// Default session length in seconds
    pub fn default_secs(&self) -> u64 {
        u64::from(self.default_minutes) * 60
    }

    /// Length in minutes of the 1-based preset `number`
    pub fn preset_minutes(&self, number: usize) -> Option<u32> {
        number
            .checked_sub(1)
            .and_then(|i| self.presets.get(i))
            .copied()
    }

    /// Whether `minutes` is one of the offered presets
    pub fn is_preset(&self, minutes: u64) -> bool {
        self.presets.iter().any(|&p| u64::from(p) == minutes)
    }

    /// Presets as shown to users (e.g., "15, 25, 45")
    pub fn presets_text(&self) -> String {
        self.presets
            .iter()
            .map(|m| m.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Validate configuration, returning error message if invalid
    pub fn validate(&self) -> Result<()> {
        if self.default_minutes == 0 {
            return Err(Error::Config(
                "timer.default_minutes must be greater than 0".to_string(),
            ));
        }
        if self.presets.iter().any(|&m| m == 0) {
            return Err(Error::Config(
                "timer.presets must not contain 0".to_string(),
            ));
        }
        if self.min_recorded_secs == 0 {
            return Err(Error::Config(
                "timer.min_recorded_secs must be greater than 0".to_string(),
            ));
        }
        if self.tick_millis == 0 {
            return Err(Error::Config(
                "timer.tick_millis must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_timer_minutes() -> u32 {
    25
}

fn default_timer_presets() -> Vec<u32> {
    vec![15, 25, 45]
}

fn default_min_recorded_secs() -> u64 {
    60
}

fn default_tick_millis() -> u64 {
    1000
}

/// Storage location overrides
#[derive(Debug, Deserialize, Default)]
pub struct StorageConfig {
    /// Override path for the store file
    pub path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        config.timer.validate()?;

        Ok(config)
    }

    /// Returns the store file to open, honoring `[storage] path`
    pub fn store_path(&self) -> PathBuf {
        self.storage
            .path
            .clone()
            .unwrap_or_else(Self::default_store_path)
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/focusdo/config.toml` (~/.config/focusdo/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("focusdo").join("config.toml")
    }

    /// Returns the data directory path (for the store file)
    ///
    /// `$XDG_DATA_HOME/focusdo/` (~/.local/share/focusdo/)
    pub fn data_dir() -> PathBuf {
        xdg_data_home().join("focusdo")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/focusdo/` (~/.local/state/focusdo/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("focusdo")
    }

    /// Returns the default store file path
    ///
    /// `$XDG_DATA_HOME/focusdo/store.db` (~/.local/share/focusdo/store.db)
    pub fn default_store_path() -> PathBuf {
        Self::data_dir().join("store.db")
    }

    /// Returns the log file path
    ///
    /// `$XDG_STATE_HOME/focusdo/focusdo.log` (~/.local/state/focusdo/focusdo.log)
    pub fn log_path() -> PathBuf {
        Self::state_dir().join("focusdo.log")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.timer.default_minutes, 25);
        assert_eq!(config.timer.presets, vec![15, 25, 45]);
        assert_eq!(config.timer.min_recorded_secs, 60);
        assert_eq!(config.timer.default_secs(), 1500);
        assert!(config.storage.path.is_none());
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[logging]
level = "debug"

[timer]
default_minutes = 45
tick_millis = 10

[storage]
path = "/tmp/focusdo-test/store.db"
"#;
        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.max_files, 5);
        assert_eq!(config.timer.default_minutes, 45);
        assert_eq!(config.timer.tick_millis, 10);
        // Unset keys keep their defaults
        assert_eq!(config.timer.presets, vec![15, 25, 45]);
        assert_eq!(
            config.store_path(),
            PathBuf::from("/tmp/focusdo-test/store.db")
        );
    }

    #[test]
    fn test_timer_config_validation() {
        assert!(TimerConfig::default().validate().is_ok());

        let config = TimerConfig {
            default_minutes: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = TimerConfig {
            presets: vec![15, 0],
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = TimerConfig {
            tick_millis: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = TimerConfig {
            min_recorded_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_presets() {
        let config = TimerConfig::default();
        assert_eq!(config.preset_minutes(1), Some(15));
        assert_eq!(config.preset_minutes(3), Some(45));
        assert_eq!(config.preset_minutes(0), None);
        assert_eq!(config.preset_minutes(4), None);
        assert!(config.is_preset(25));
        assert!(!config.is_preset(20));
        assert_eq!(config.presets_text(), "15, 25, 45");
    }

    #[test]
    fn test_load_from_rejects_invalid_timer() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[timer]\ndefault_minutes = 0\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_paths_end_with_expected_names() {
        assert!(Config::config_path().ends_with("focusdo/config.toml"));
        assert!(Config::default_store_path().ends_with("focusdo/store.db"));
        assert!(Config::log_path().ends_with("focusdo/focusdo.log"));
    }
}
