//! Core error types for rhythm-core.
//!
//! This module defines the error hierarchy using thiserror. The split
//! mirrors the propagation policy: cue errors are absorbed by the session
//! clock and never halt a transition, location errors are surfaced as a
//! retryable status, and only configuration/validation problems reach the
//! caller as hard failures.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for rhythm-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Location provider errors
    #[error("Location error: {0}")]
    Location(#[from] LocationError),

    /// Cue delivery errors (non-fatal by policy)
    #[error("Cue error: {0}")]
    Cue(#[from] CueError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Location provider errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LocationError {
    /// The platform denied access to location data
    #[error("Location permission denied")]
    PermissionDenied,

    /// No location provider exists on this device
    #[error("Location is not supported on this device")]
    Unsupported,

    /// A fix could not be obtained right now
    #[error("Position unavailable: {0}")]
    PositionUnavailable(String),

    /// No fix arrived within the provider timeout
    #[error("Location request timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },
}

impl LocationError {
    /// Terminal errors end observation; the rest leave it running and the
    /// user can retry.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            LocationError::PermissionDenied | LocationError::Unsupported
        )
    }
}

/// Cue delivery errors.
///
/// Always absorbed by the session clock: a transition happens whether or
/// not its cue could be played.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CueError {
    /// Audio playback was denied or is unavailable
    #[error("Audio playback unavailable: {0}")]
    PlaybackUnavailable(String),

    /// Vibration is unavailable on this device
    #[error("Vibration unavailable: {0}")]
    VibrationUnavailable(String),
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

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Session parameter validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Interval count outside the setup range
    #[error("Interval count must be between {min} and {max}, got {got}")]
    IntervalCountOutOfRange { min: u32, max: u32, got: u32 },

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

impl From<tokio::time::error::Elapsed> for LocationError {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        // The provider watch timeout is 10s.
        LocationError::Timeout { timeout_secs: 10 }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
