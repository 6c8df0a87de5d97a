//! Error types shared across pawcursor crates.

use std::path::PathBuf;

/// Top-level error type for pawcursor operations.
#[derive(Debug, thiserror::Error)]
pub enum PawcursorError {
    /// The detector could not produce a frame. Fatal to the tick loop.
    #[error("Acquisition error: {message}")]
    Acquisition { message: String },

    /// An output sink call failed. Recoverable.
    #[error("Sink error: {message}")]
    Sink { message: String },

    /// Rejected tracking parameters. Raised at startup only.
    #[error("Invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Detector error: {message}")]
    Detector { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using PawcursorError.
pub type PawcursorResult<T> = Result<T, PawcursorError>;

impl PawcursorError {
    pub fn acquisition(msg: impl Into<String>) -> Self {
        Self::Acquisition {
            message: msg.into(),
        }
    }

    pub fn sink(msg: impl Into<String>) -> Self {
        Self::Sink {
            message: msg.into(),
        }
    }

    pub fn invalid_configuration(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn detector(msg: impl Into<String>) -> Self {
        Self::Detector {
            message: msg.into(),
        }
    }

    /// Whether the tick loop must shut down on this error.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Sink { .. })
    }
}
