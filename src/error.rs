//! Application-wide error types.
//!
//! This module defines the main error type hierarchy for the application,
//! allowing for type-safe error handling throughout the codebase.

pub use crate::api::ApiError;
pub use crate::config::ConfigError;
pub use crate::form::StateError;
pub use crate::submit::SubmitError;

/// Main application error type.
///
/// This is the top-level error type that encompasses all error types
/// in the application. It uses `thiserror` for automatic error derivation
/// and conversion.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Backend API-related errors
    #[error("Backend API error: {0}")]
    Api(#[from] ApiError),

    /// Form and draft state errors
    #[error("State error: {0}")]
    State(#[from] StateError),

    /// Submission errors
    #[error("Submission error: {0}")]
    Submit(#[from] SubmitError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Logger initialization errors
    #[error("Logger error: {0}")]
    Logger(String),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

/// Convenience type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;
