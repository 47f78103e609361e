//! TOML-based application configuration.
//!
//! Stores the per-mode session lengths in minutes and the long-break
//! interval. Values are clamped to a minimum of 1 on load and through every
//! setter, so the timer core only ever sees positive values.
//!
//! Configuration is stored at `~/.config/focuscycle/config.toml`.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::cycle::SessionMode;
use crate::error::ConfigError;

/// Returns `~/.config/focuscycle[-dev]/` based on FOCUSCYCLE_ENV.
///
/// Set FOCUSCYCLE_ENV=dev to use the development data directory.
///
/// # Errors
///
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("FOCUSCYCLE_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("focuscycle-dev")
    } else {
        base_dir.join("focuscycle")
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::DataDirFailed {
        path: dir.clone(),
        message: e.to_string(),
    })?;
    Ok(dir)
}

// Default functions
fn default_focus_minutes() -> u32 {
    25
}
fn default_short_break_minutes() -> u32 {
    5
}
fn default_long_break_minutes() -> u32 {
    15
}
fn default_long_break_interval() -> u32 {
    4
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/focuscycle/config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_focus_minutes")]
    pub focus_minutes: u32,
    #[serde(default = "default_short_break_minutes")]
    pub short_break_minutes: u32,
    #[serde(default = "default_long_break_minutes")]
    pub long_break_minutes: u32,
    /// Every Nth completed focus session is followed by a long break.
    #[serde(default = "default_long_break_interval")]
    pub long_break_interval: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            focus_minutes: default_focus_minutes(),
            short_break_minutes: default_short_break_minutes(),
            long_break_minutes: default_long_break_minutes(),
            long_break_interval: default_long_break_interval(),
        }
    }
}

impl Config {
    /// Settable key names, as accepted by `get`/`set`/`reset`.
    pub const KEYS: [&'static str; 4] = [
        "focus_minutes",
        "short_break_minutes",
        "long_break_minutes",
        "long_break_interval",
    ];

    fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk, writing the defaults on first run.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed, or
    /// if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => Self::parse(&content, &path),
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Load from disk, returning the defaults on any error.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    /// Load from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::parse(&content, path)
    }

    fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let cfg: Config = toml::from_str(content).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(cfg.clamped())
    }

    /// Persist to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    /// Persist to an explicit path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        std::fs::write(path, content).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Non-positive values never reach the timer core.
    fn clamped(mut self) -> Self {
        self.focus_minutes = self.focus_minutes.max(1);
        self.short_break_minutes = self.short_break_minutes.max(1);
        self.long_break_minutes = self.long_break_minutes.max(1);
        self.long_break_interval = self.long_break_interval.max(1);
        self
    }

    pub fn set_focus_minutes(&mut self, minutes: u32) {
        self.focus_minutes = minutes.max(1);
    }

    pub fn set_short_break_minutes(&mut self, minutes: u32) {
        self.short_break_minutes = minutes.max(1);
    }

    pub fn set_long_break_minutes(&mut self, minutes: u32) {
        self.long_break_minutes = minutes.max(1);
    }

    pub fn set_long_break_interval(&mut self, sessions: u32) {
        self.long_break_interval = sessions.max(1);
    }

    /// Get a config value by key.
    pub fn get(&self, key: &str) -> Option<u32> {
        match key {
            "focus_minutes" => Some(self.focus_minutes),
            "short_break_minutes" => Some(self.short_break_minutes),
            "long_break_minutes" => Some(self.long_break_minutes),
            "long_break_interval" => Some(self.long_break_interval),
            _ => None,
        }
    }

    /// Set a config value by key, clamping it to a minimum of 1.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value does not parse
    /// as a non-negative integer.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let parsed: u32 = value.parse().map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("cannot parse '{value}' as a positive integer"),
        })?;
        match key {
            "focus_minutes" => self.set_focus_minutes(parsed),
            "short_break_minutes" => self.set_short_break_minutes(parsed),
            "long_break_minutes" => self.set_long_break_minutes(parsed),
            "long_break_interval" => self.set_long_break_interval(parsed),
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }

    /// Restore a single key to its documented default.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown.
    pub fn reset(&mut self, key: &str) -> Result<(), ConfigError> {
        match key {
            "focus_minutes" => self.focus_minutes = default_focus_minutes(),
            "short_break_minutes" => self.short_break_minutes = default_short_break_minutes(),
            "long_break_minutes" => self.long_break_minutes = default_long_break_minutes(),
            "long_break_interval" => self.long_break_interval = default_long_break_interval(),
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }

    /// Restore every key to its documented default.
    pub fn reset_all(&mut self) {
        *self = Self::default();
    }

    /// Configured length of a session in `mode`.
    pub fn duration_for(&self, mode: SessionMode) -> Duration {
        let minutes = match mode {
            SessionMode::Focus => self.focus_minutes,
            SessionMode::ShortBreak => self.short_break_minutes,
            SessionMode::LongBreak => self.long_break_minutes,
        };
        Duration::minutes(i64::from(minutes))
    }

    /// Expiry instant for a session in `mode` starting at `now`.
    pub fn expiry_from(&self, now: DateTime<Utc>, mode: SessionMode) -> DateTime<Utc> {
        now + self.duration_for(mode)
    }
}
