//! Error types for edudismiss-core

use std::time::Duration;

use thiserror::Error;

/// Result type alias using edudismiss-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to the remote store
#[derive(Error, Debug)]
pub enum Error {
    /// No endpoint URL is configured for the remote store
    #[error("Remote store endpoint is not configured")]
    NotConfigured,

    /// HTTP transport error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Request exceeded its read timeout
    #[error("Request exceeded {}ms", .0.as_millis())]
    Timeout(Duration),

    /// Remote store answered with a non-OK status
    #[error("Remote store error: {0}")]
    Api(String),

    /// Response body could not be interpreted
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A status or settings command that was refused before any state changed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Calling a student outside the dismissal window
    #[error("Dismissal is paused: the dismissal window is closed")]
    DismissalPaused,

    /// Schedule failed validation
    #[error("Invalid schedule: {0}")]
    InvalidSchedule(String),
}
