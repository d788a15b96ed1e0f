//! Configuration loading for pingme.
//!
//! Layered precedence: built-in defaults, then the user config file at
//! `~/.config/pingme/config.toml`, then an explicitly passed config file,
//! then `PINGME_*` environment variables. CLI flag overrides are applied
//! by the caller after loading.

use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::PingmeError;

/// Notification delivery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifySettings {
    /// Notification sound name (macOS only; ignored elsewhere)
    #[serde(default = "default_notify_sound")]
    pub sound: String,
}

fn default_notify_sound() -> String {
    "Glass".to_string()
}

impl Default for NotifySettings {
    fn default() -> Self {
        Self {
            sound: default_notify_sound(),
        }
    }
}

/// Main application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Directory holding the reminder collection and its lock file
    #[serde(default = "default_state_dir")]
    pub state_dir: String,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Notification delivery settings
    #[serde(default)]
    pub notify: NotifySettings,
}

fn default_state_dir() -> String {
    "~/.pingme".to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            state_dir: default_state_dir(),
            log_level: default_log_level(),
            notify: NotifySettings::default(),
        }
    }
}

impl Settings {
    /// Load settings with layered precedence:
    /// 1. Built-in defaults
    /// 2. Config file (~/.config/pingme/config.toml)
    /// 3. Explicitly passed config file (optional)
    /// 4. Environment variables (PINGME_*, `__` as the nesting separator)
    ///
    /// CLI flags should be applied by the caller after this returns.
    pub fn load(cli_config_path: Option<&str>) -> Result<Self, PingmeError> {
        let config_dir = ProjectDirs::from("", "", "pingme")
            .map(|p| p.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        let default_config_path = config_dir.join("config");

        let mut builder = Config::builder()
            .set_default("state_dir", default_state_dir())
            .map_err(|e| PingmeError::Config(e.to_string()))?
            .set_default("log_level", default_log_level())
            .map_err(|e| PingmeError::Config(e.to_string()))?
            .set_default("notify.sound", default_notify_sound())
            .map_err(|e| PingmeError::Config(e.to_string()))?
            .add_source(File::with_name(&default_config_path.to_string_lossy()).required(false));

        if let Some(path) = cli_config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // PINGME_STATE_DIR, PINGME_LOG_LEVEL, PINGME_NOTIFY__SOUND, ...
        builder = builder.add_source(
            Environment::with_prefix("PINGME")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| PingmeError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| PingmeError::Config(e.to_string()))
    }

    /// Check values that cannot be validated by deserialization alone.
    pub fn validate(&self) -> Result<(), PingmeError> {
        if self.state_dir.trim().is_empty() {
            return Err(PingmeError::Config("state_dir must not be empty".to_string()));
        }
        const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
        if !LEVELS.contains(&self.log_level.as_str()) {
            return Err(PingmeError::Config(format!(
                "log_level must be one of {LEVELS:?}, got '{}'",
                self.log_level
            )));
        }
        Ok(())
    }

    /// Expand a leading ~ in state_dir to the user's home directory.
    pub fn expanded_state_dir(&self) -> PathBuf {
        if self.state_dir.starts_with("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(&self.state_dir[2..]);
            }
        }
        PathBuf::from(&self.state_dir)
    }
}
