//! TOML-based application configuration.
//!
//! Stores user preferences for the tracking windows and reminders.
//! Configuration is stored at `~/.config/mindroom/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::error::ConfigError;

/// Tracking window configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingConfig {
    /// Days scanned backwards from today when computing the streak.
    #[serde(default = "default_streak_lookback_days")]
    pub streak_lookback_days: u32,
    /// Horizon for the upcoming-occurrences list.
    #[serde(default = "default_upcoming_horizon_days")]
    pub upcoming_horizon_days: u32,
}

/// Reminder configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemindersConfig {
    /// Master switch; when false no reminders are installed for new or
    /// edited practices (existing ones are cancelled on edit).
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/mindroom/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub tracking: TrackingConfig,
    #[serde(default)]
    pub reminders: RemindersConfig,
}

// Default functions
fn default_streak_lookback_days() -> u32 {
    60
}
fn default_upcoming_horizon_days() -> u32 {
    14
}
fn default_true() -> bool {
    true
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            streak_lookback_days: default_streak_lookback_days(),
            upcoming_horizon_days: default_upcoming_horizon_days(),
        }
    }
}

impl Default for RemindersConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tracking: TrackingConfig::default(),
            reminders: RemindersConfig::default(),
        }
    }
}

impl Config {
    fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("~/.config/mindroom"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load the configuration, falling back to defaults if the file does
    /// not exist yet.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        let raw = match std::fs::read_to_string(&path) {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(ConfigError::LoadFailed {
                    path,
                    message: e.to_string(),
                })
            }
        };
        toml::from_str(&raw).map_err(|e| ConfigError::ParseFailed(e.to_string()))
    }

    /// Write the configuration back to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path()?;
        let raw = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, raw).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.tracking.streak_lookback_days, 60);
        assert_eq!(config.tracking.upcoming_horizon_days, 14);
        assert!(config.reminders.enabled);
    }

    #[test]
    fn test_missing_sections_fall_back_to_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.tracking.streak_lookback_days, 60);
        assert!(config.reminders.enabled);
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config: Config = toml::from_str(
            "[tracking]\nstreak_lookback_days = 30\n",
        )
        .unwrap();
        assert_eq!(config.tracking.streak_lookback_days, 30);
        assert_eq!(config.tracking.upcoming_horizon_days, 14);
    }

    #[test]
    fn test_round_trip() {
        let mut config = Config::default();
        config.reminders.enabled = false;
        let raw = toml::to_string_pretty(&config).unwrap();
        let back: Config = toml::from_str(&raw).unwrap();
        assert!(!back.reminders.enabled);
        assert_eq!(back.tracking.upcoming_horizon_days, 14);
    }
}
