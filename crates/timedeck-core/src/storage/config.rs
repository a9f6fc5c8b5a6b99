//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Focus-cycle phase lengths
//! - Sound preferences
//! - Theme and clock format
//! - Default timezone
//!
//! Configuration is stored at `~/.config/timedeck/config.toml`. It only seeds
//! a session; nothing the session does at runtime is written back.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::clock::Zone;
use crate::error::ConfigError;
use crate::settings::{Settings, Theme};
use crate::timer::FocusDurations;

/// Sound configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoundConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_50")]
    pub volume: u8,
}

/// UI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default)]
    pub theme: Theme,
    #[serde(default)]
    pub hour12: bool,
}

/// Clock configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClockConfig {
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/timedeck/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub focus: FocusDurations,
    #[serde(default)]
    pub sound: SoundConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub clock: ClockConfig,
}

// Default functions
fn default_true() -> bool {
    true
}
fn default_50() -> u8 {
    50
}
fn default_timezone() -> String {
    "local".into()
}

impl Default for SoundConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            volume: 50,
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            theme: Theme::Auto,
            hour12: false,
        }
    }
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as bool")))?,
                    ),
                    serde_json::Value::Number(_) => value
                        .parse::<u64>()
                        .map(|n| serde_json::Value::Number(n.into()))
                        .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?,
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        return Err(invalid("cannot replace a whole section".into()));
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults if no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, writing defaults there if the file is missing.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Object(_) | serde_json::Value::Array(_) => None,
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key. Does not save.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value is rejected; the
    /// config is left untouched in that case.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        let mut json = serde_json::to_value(&*self).map_err(|e| invalid(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| invalid(e.to_string()))?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Reject values the engines cannot use.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sound.volume > 100 {
            return Err(ConfigError::InvalidValue {
                key: "sound.volume".into(),
                message: format!("{} is above 100", self.sound.volume),
            });
        }
        if self.focus.long_break_interval == 0 {
            return Err(ConfigError::InvalidValue {
                key: "focus.long_break_interval".into(),
                message: "must be at least 1".into(),
            });
        }
        Zone::parse(&self.clock.timezone).map_err(|e| ConfigError::InvalidValue {
            key: "clock.timezone".into(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Settings a new session starts with.
    pub fn settings(&self) -> Settings {
        Settings {
            theme: self.ui.theme,
            sound_enabled: self.sound.enabled,
            volume: self.sound.volume.min(100),
            hour12: self.ui.hour12,
        }
    }

    /// Configured zone, falling back to UTC when the identifier is unknown.
    pub fn zone(&self) -> Zone {
        Zone::parse_or_utc(&self.clock.timezone)
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "using default configuration");
            Self::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.focus, FocusDurations::default());
        assert_eq!(parsed.sound.volume, 50);
        assert_eq!(parsed.ui.theme, Theme::Auto);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[focus]\nwork_secs = 3000\n").unwrap();
        assert_eq!(parsed.focus.work_secs, 3_000);
        assert_eq!(parsed.focus.short_break_secs, 300);
        assert_eq!(parsed.clock.timezone, "local");
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("ui.theme").as_deref(), Some("auto"));
        assert_eq!(cfg.get("focus.work_secs").as_deref(), Some("1500"));
        assert_eq!(cfg.get("sound.enabled").as_deref(), Some("true"));
        assert!(cfg.get("ui.missing_key").is_none());
        assert!(cfg.get("focus").is_none());
    }

    #[test]
    fn set_json_value_by_path_updates_nested_bool() {
        let mut json = serde_json::to_value(Config::default()).unwrap();
        Config::set_json_value_by_path(&mut json, "sound.enabled", "false").unwrap();
        assert_eq!(
            Config::get_json_value_by_path(&json, "sound.enabled").unwrap(),
            &serde_json::Value::Bool(false)
        );
    }

    #[test]
    fn set_json_value_by_path_rejects_unknown_key() {
        let mut json = serde_json::to_value(Config::default()).unwrap();
        let result = Config::set_json_value_by_path(&mut json, "ui.nonexistent_key", "value");
        assert!(matches!(result, Err(ConfigError::UnknownKey(_))));
    }

    #[test]
    fn set_json_value_by_path_rejects_invalid_type() {
        let mut json = serde_json::to_value(Config::default()).unwrap();
        let result = Config::set_json_value_by_path(&mut json, "ui.hour12", "not_a_bool");
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn set_updates_theme_and_timezone() {
        let mut cfg = Config::default();
        cfg.set("ui.theme", "dark").unwrap();
        cfg.set("clock.timezone", "Asia/Tokyo").unwrap();
        assert_eq!(cfg.ui.theme, Theme::Dark);
        assert_eq!(cfg.zone().id(), "Asia/Tokyo");
    }

    #[test]
    fn set_rejects_bad_values_without_mutating() {
        let mut cfg = Config::default();
        assert!(cfg.set("ui.theme", "sepia").is_err());
        assert!(cfg.set("sound.volume", "150").is_err());
        assert!(cfg.set("clock.timezone", "Atlantis/Capital").is_err());
        assert!(cfg.set("focus.long_break_interval", "0").is_err());
        assert_eq!(cfg.ui.theme, Theme::Auto);
        assert_eq!(cfg.sound.volume, 50);
        assert_eq!(cfg.clock.timezone, "local");
    }

    #[test]
    fn settings_follow_config() {
        let mut cfg = Config::default();
        cfg.sound.enabled = false;
        cfg.ui.hour12 = true;
        let s = cfg.settings();
        assert!(!s.sound_enabled);
        assert!(s.hour12);
        assert_eq!(s.volume, 50);
    }

    #[test]
    fn unknown_timezone_falls_back_to_utc() {
        let mut cfg = Config::default();
        cfg.clock.timezone = "Not/AZone".into();
        assert_eq!(cfg.zone().id(), "UTC");
    }
}
