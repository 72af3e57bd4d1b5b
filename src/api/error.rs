//! Backend API error types.

use std::path::PathBuf;

/// Errors that can occur while talking to the recruitment backend.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned a non-success status
    #[error("API error (status {status}): {message}")]
    Status { status: u16, message: String },

    /// Failed to deserialize API response
    #[error("Failed to deserialize API response: {0}")]
    Deserialization(#[from] serde_json::Error),

    /// Thumbnail file could not be read for upload
    #[error("Failed to read thumbnail {path}: {source}")]
    Thumbnail {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configured base URL is not a valid URL
    #[error("Invalid API base URL '{0}'")]
    InvalidBaseUrl(String),

    /// Generic API error
    #[error("Backend API error: {0}")]
    Other(String),
}
