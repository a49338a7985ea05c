//! crates/dermascan_core/src/error.rs
//!
//! Error types raised by the stores and the analysis flow.

use crate::ports::PortError;

/// Errors from `SessionStore` operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Invalid email or password")]
    Authentication,

    #[error("An account with email {0} already exists")]
    DuplicateAccount(String),

    #[error("Another sign-in request is already in progress")]
    Busy,

    #[error("Signed out before the request completed")]
    Superseded,

    #[error("Credential error: {0}")]
    Credentials(String),

    #[error("Session storage error: {0}")]
    Storage(#[from] PortError),
}

/// Intake problems caught before anything is sent or stored.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please upload an image to analyze")]
    MissingImage,

    #[error("Unsupported image type: {0} (expected png, jpg or jpeg)")]
    UnsupportedImageType(String),

    #[error("Age must be a whole number, got '{0}'")]
    InvalidAge(String),
}

/// Errors from `AnalysisFlow::submit`.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The analysis service could not produce a report.
    #[error("Analysis request failed: {0}")]
    Request(#[source] PortError),

    #[error("An analysis is already in progress")]
    Busy,
}
