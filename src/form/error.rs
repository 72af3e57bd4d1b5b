//! Form state-specific error types.

use std::path::PathBuf;

/// Errors that can occur while managing form state and its draft.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    /// Field name not recognized
    #[error("Unknown form field: {0}")]
    UnknownField(String),

    /// Draft file could not be read
    #[error("Failed to read draft from {path}: {source}")]
    DraftReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Draft file could not be written
    #[error("Failed to write draft to {path}: {source}")]
    DraftWriteFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Draft contents could not be (de)serialized
    #[error("Failed to process draft contents: {0}")]
    DraftFormat(#[from] serde_yaml::Error),

    /// Shared state was already borrowed
    #[error("Shared state is busy: {0}")]
    Busy(String),
}
