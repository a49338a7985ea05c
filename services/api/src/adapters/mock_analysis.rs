//! services/api/src/adapters/mock_analysis.rs
//!
//! An in-process `AnalysisService` for working without the analysis server.
//! It waits out a fixed delay and answers from the catalog.

use std::time::Duration;

use async_trait::async_trait;
use dermascan_core::domain::{AnalysisReport, AnalysisSubmission};
use dermascan_core::ports::{AnalysisService, PortResult};
use tracing::info;

use crate::catalog;

/// Delay the mock waits before answering.
pub const DEFAULT_MOCK_DELAY: Duration = Duration::from_secs(2);

#[derive(Clone, Debug)]
pub struct MockAnalysisAdapter {
    delay: Duration,
}

impl MockAnalysisAdapter {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for MockAnalysisAdapter {
    fn default() -> Self {
        Self::new(DEFAULT_MOCK_DELAY)
    }
}

#[async_trait]
impl AnalysisService for MockAnalysisAdapter {
    async fn analyze(&self, submission: &AnalysisSubmission) -> PortResult<AnalysisReport> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let report = catalog::report(&submission.details, &mut rand::thread_rng());
        info!("Mock analysis of {}: {}", submission.image.file_name, report.disease);
        Ok(report)
    }
}
