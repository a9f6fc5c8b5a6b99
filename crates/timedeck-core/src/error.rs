//! Core error types for timedeck-core.
//!
//! None of these are fatal to a running session: the tick loop logs and
//! carries on. They exist so that callers can surface what went wrong.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for timedeck-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Timezone resolution errors
    #[error("Timezone error: {0}")]
    Timezone(#[from] TimezoneError),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// No usable configuration directory
    #[error("Failed to prepare config directory {path}: {source}")]
    DirUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Key does not exist in the configuration tree
    #[error("unknown config key: {0}")]
    UnknownKey(String),
}

/// Timezone errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimezoneError {
    /// Identifier is not `local`, `UTC` or a known IANA zone
    #[error("unknown timezone '{0}'")]
    Unknown(String),
}

/// Sound playback errors.
#[derive(Error, Debug)]
pub enum SoundError {
    /// The platform refused or has no output device
    #[error("sound output unavailable: {0}")]
    Unavailable(String),

    /// Writing to the output failed
    #[error("sound output failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
