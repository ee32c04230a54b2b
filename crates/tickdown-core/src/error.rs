//! Core error types for tickdown-core.
//!
//! This module defines the error hierarchy using thiserror. User-facing
//! start failures live in [`StartError`] and render as the short literal
//! messages shown next to the input field.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for tickdown-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A countdown could not be started
    #[error("Start rejected: {0}")]
    Start(#[from] StartError),

    /// Sound backend errors
    #[error("Sound error: {0}")]
    Sound(#[from] SoundError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parse errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Reasons a countdown start request is rejected.
///
/// The `Display` text is exactly what the error sink receives.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartError {
    /// A session is already counting down.
    #[error("already running")]
    AlreadyRunning,

    /// The input is not a non-negative decimal number.
    #[error("not a number")]
    NotANumber,

    /// The duration is at least 10^12 nanoseconds.
    #[error("value too large")]
    TooLarge,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    MissingKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    /// Data directory could not be resolved or created
    #[error("Data directory unavailable at {path}: {source}")]
    DataDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors reported by a [`SoundPlayer`](crate::sound::SoundPlayer).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SoundError {
    /// The sound was never loaded or is unknown to the backend
    #[error("Sound '{0}' is not loaded")]
    NotLoaded(&'static str),

    /// The backend refused or failed to play
    #[error("Playback failed: {0}")]
    Playback(String),

    /// The stream handle does not refer to a live stream
    #[error("Unknown stream handle {0}")]
    UnknownStream(u32),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for ConfigError {
    fn from(err: toml::ser::Error) -> Self {
        ConfigError::ParseFailed(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_errors_render_literal_messages() {
        assert_eq!(StartError::AlreadyRunning.to_string(), "already running");
        assert_eq!(StartError::NotANumber.to_string(), "not a number");
        assert_eq!(StartError::TooLarge.to_string(), "value too large");
    }

    #[test]
    fn config_error_converts_into_core_error() {
        let err: CoreError = ConfigError::MissingKey("timer.nope".into()).into();
        assert!(err.to_string().contains("timer.nope"));
    }

    #[test]
    fn question_mark_lifts_into_core_error() {
        fn parse(input: &str) -> Result<u32> {
            let value: toml::Value = toml::from_str(input)?;
            let lead = value
                .get("tick_lead_seconds")
                .and_then(toml::Value::as_integer)
                .ok_or(StartError::NotANumber)?;
            Ok(lead as u32)
        }

        assert_eq!(parse("tick_lead_seconds = 2").unwrap(), 2);
        assert!(matches!(parse("tick_lead_seconds = ").unwrap_err(), CoreError::Toml(_)));
        assert!(matches!(
            parse("other = 1").unwrap_err(),
            CoreError::Start(StartError::NotANumber)
        ));
    }
}
