//! services/api/src/error.rs
//!
//! Defines the primary error type for the service binaries.

use crate::config::ConfigError;
use dermascan_core::error::{AnalysisError, SessionError};
use dermascan_core::ports::PortError;

/// The primary error type for the `dermascan-api` crate.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    #[error("{0}")]
    Session(#[from] SessionError),

    #[error("{0}")]
    Analysis(#[from] AnalysisError),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
