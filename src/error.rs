//! Custom error types for busy-bot.
//!
//! Startup validation failures and runtime faults are distinct variants so the
//! binary can decide which ones are reported and which ones end the process.

use std::io;
use thiserror::Error;

/// Main error type for busy-bot operations.
#[derive(Error, Debug)]
pub enum BotError {
    /// No window with the configured class name exists.
    #[error("unable to find any window using the class name '{class}'")]
    WindowNotFound { class: String },

    /// The configured interval could not be turned into a duration.
    #[error("unable to determine timing from '{value}': {reason}")]
    InvalidInterval { value: String, reason: String },

    /// A toggle was requested while the bot is faulted.
    #[error("control is disabled while the bot is {state}")]
    ControlDisabled { state: String },

    /// Error reading or parsing the settings file.
    #[error("failed to load settings from '{path}': {reason}")]
    ConfigLoad { path: String, reason: String },

    /// Error writing the settings file.
    #[error("failed to save settings to '{path}': {reason}")]
    ConfigSave { path: String, reason: String },

    /// The OS refused the injected input.
    #[error("failed to send {keystroke} to the focused window: {reason}")]
    KeySendFailed { keystroke: String, reason: String },

    /// Platform-specific operation is not supported.
    #[error("operation not supported on this platform: {0}")]
    UnsupportedPlatform(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for busy-bot operations.
pub type Result<T> = std::result::Result<T, BotError>;

impl BotError {
    /// Create a new WindowNotFound error.
    pub fn window_not_found(class: impl Into<String>) -> Self {
        Self::WindowNotFound {
            class: class.into(),
        }
    }

    /// Create a new InvalidInterval error.
    pub fn invalid_interval(value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInterval {
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a new ControlDisabled error.
    pub fn control_disabled(state: impl Into<String>) -> Self {
        Self::ControlDisabled {
            state: state.into(),
        }
    }

    /// Create a new ConfigLoad error.
    pub fn config_load(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ConfigLoad {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a new ConfigSave error.
    pub fn config_save(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ConfigSave {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a new KeySendFailed error.
    pub fn key_send_failed(keystroke: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::KeySendFailed {
            keystroke: keystroke.into(),
            reason: reason.into(),
        }
    }

    /// Create a new UnsupportedPlatform error.
    pub fn unsupported_platform(message: impl Into<String>) -> Self {
        Self::UnsupportedPlatform(message.into())
    }

    /// True for the errors raised by startup validation.
    ///
    /// These are reported to the user and end the process normally instead of
    /// being treated as crashes.
    pub fn is_startup_validation(&self) -> bool {
        matches!(
            self,
            Self::WindowNotFound { .. } | Self::InvalidInterval { .. }
        )
    }
}
