mod config;

pub use config::{ClockConfig, Config, SoundConfig, UiConfig};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns `~/.config/timedeck[-dev]/` based on TIMEDECK_ENV.
///
/// Set TIMEDECK_ENV=dev to use the development directory, or
/// TIMEDECK_CONFIG_DIR to point somewhere else entirely.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("TIMEDECK_CONFIG_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("TIMEDECK_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("timedeck-dev")
            } else {
                base_dir.join("timedeck")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|source| ConfigError::DirUnavailable {
        path: dir.clone(),
        source,
    })?;
    Ok(dir)
}
