//! crates/dermascan_core/src/ports.rs
//!
//! Defines the service contracts (traits) the core depends on.
//! Durable storage and the remote analysis service live behind these traits so
//! the stores can run against an in-memory fake in tests.

use async_trait::async_trait;

use crate::domain::{AnalysisReport, AnalysisSubmission};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// The remote side answered with a non-success status.
    #[error("Request rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Durable key-value storage. Values are JSON documents.
///
/// A missing key is `Ok(None)`, and deleting a missing key succeeds.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> PortResult<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> PortResult<()>;

    async fn delete(&self, key: &str) -> PortResult<()>;
}

#[async_trait]
pub trait AnalysisService: Send + Sync {
    /// Submits an image plus intake details and returns the diagnosis.
    async fn analyze(&self, submission: &AnalysisSubmission) -> PortResult<AnalysisReport>;
}
