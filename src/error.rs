//! Error types surfaced by the click engine, hotkey registration and input injection

use thiserror::Error;

/// Settings that make it impossible to start clicking
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Click interval must be greater than zero")]
    ZeroInterval,

    #[error("No click locations recorded - pick at least one location or click at the cursor")]
    NoLocations,
}

/// Global hotkey registration failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HotkeyError {
    #[error("Hotkey {0} is already in use by another application")]
    Conflict(String),

    #[error("Unknown key '{0}'")]
    UnknownKey(String),

    #[error("Invalid hotkey '{0}'")]
    InvalidCombo(String),

    #[error("Hotkey registration failed: {0}")]
    Backend(String),
}

/// Synthetic input injection failures (logged, never surfaced per click)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("Failed to query pointer position: {0}")]
    QueryPointer(String),

    #[error("Failed to move pointer: {0}")]
    MovePointer(String),

    #[error("Failed to send input event: {0}")]
    SendEvent(String),
}
