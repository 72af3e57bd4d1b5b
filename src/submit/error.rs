//! Submission-specific error types.

use crate::api::ApiError;
use crate::form::FieldName;

/// Errors that can occur while assembling or sending a submission.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    /// A value needed for the payload is missing or malformed
    #[error("Field {field} is not ready for submission")]
    Incomplete { field: FieldName },

    /// Another submission is still outstanding
    #[error("A submission is already in flight")]
    InFlight,

    /// The submission collaborator failed
    #[error("Submission failed: {0}")]
    Api(#[from] ApiError),
}
