//! crates/dermascan_core/src/analysis.rs
//!
//! The intake-to-result round trip: validate the form, ask the analysis
//! service for a report, and record it in the `ResultStore`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{error, info};

use crate::domain::{AnalysisResult, NewAnalysisResult};
use crate::error::AnalysisError;
use crate::in_flight::InFlight;
use crate::intake::IntakeForm;
use crate::ports::AnalysisService;
use crate::result_store::ResultStore;

pub struct AnalysisFlow {
    service: Arc<dyn AnalysisService>,
    results: Arc<ResultStore>,
    pending: AtomicBool,
}

impl AnalysisFlow {
    pub fn new(service: Arc<dyn AnalysisService>, results: Arc<ResultStore>) -> Self {
        Self {
            service,
            results,
            pending: AtomicBool::new(false),
        }
    }

    pub fn is_analyzing(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    /// Runs one analysis. Nothing is stored unless the service returns a report.
    pub async fn submit(&self, form: IntakeForm) -> Result<AnalysisResult, AnalysisError> {
        let submission = form.validate()?;
        let _pending = InFlight::try_acquire(&self.pending).ok_or(AnalysisError::Busy)?;

        info!(
            "Submitting {} ({} bytes) for analysis",
            submission.image.file_name,
            submission.image.bytes.len()
        );
        let report = self.service.analyze(&submission).await.map_err(|e| {
            error!("Analysis request failed: {}", e);
            AnalysisError::Request(e)
        })?;

        let candidate =
            NewAnalysisResult::from_report(report, submission.image.data_url(), submission.details);
        Ok(self.results.add_result(candidate).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AnalysisReport, AnalysisSubmission, ImageUpload};
    use crate::error::ValidationError;
    use crate::persistence::MemoryStore;
    use crate::ports::{PortError, PortResult};
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    /// Answers with a fixed report, or fails when `reject` is set.
    struct ScriptedService {
        calls: AtomicUsize,
        reject: bool,
        delay: Duration,
    }

    impl ScriptedService {
        fn new(reject: bool) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                reject,
                delay: Duration::ZERO,
            }
        }
    }

    #[async_trait]
    impl AnalysisService for ScriptedService {
        async fn analyze(&self, submission: &AnalysisSubmission) -> PortResult<AnalysisReport> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            if self.reject {
                return Err(PortError::Rejected {
                    status: 500,
                    message: "model unavailable".to_string(),
                });
            }
            Ok(AnalysisReport {
                disease: "Eczema".to_string(),
                description: format!("seen in {}", submission.image.file_name),
                remedies: vec!["Use a humidifier".to_string()],
                products: Vec::new(),
                symptoms: vec!["Itching".to_string()],
                confidence: Some(0.91),
            })
        }
    }

    fn flow(service: Arc<ScriptedService>) -> (AnalysisFlow, Arc<ResultStore>) {
        let results = Arc::new(ResultStore::new(Arc::new(MemoryStore::new())));
        (AnalysisFlow::new(service, results.clone()), results)
    }

    fn form() -> IntakeForm {
        IntakeForm {
            name: "Ana".to_string(),
            age: "31".to_string(),
            allergies: "nuts, dairy".to_string(),
            image: Some(ImageUpload::new("arm.jpg", vec![1u8, 2, 3]).unwrap()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn successful_analysis_is_stored() {
        let service = Arc::new(ScriptedService::new(false));
        let (flow, results) = flow(service.clone());

        let result = flow.submit(form()).await.unwrap();
        assert_eq!(result.disease, "Eczema");
        assert_eq!(result.confidence, Some(0.91));
        assert_eq!(result.user_details.allergies, vec!["nuts", "dairy"]);
        assert!(result.image_url.starts_with("data:image/jpeg;base64,"));
        assert_eq!(results.most_recent().await, Some(result));
    }

    #[tokio::test]
    async fn validation_fails_before_the_service_is_called() {
        let service = Arc::new(ScriptedService::new(false));
        let (flow, results) = flow(service.clone());

        let outcome = flow.submit(IntakeForm::default()).await;
        assert!(matches!(
            outcome,
            Err(AnalysisError::Validation(ValidationError::MissingImage))
        ));
        assert_eq!(service.calls.load(Ordering::SeqCst), 0);
        assert!(results.is_empty().await);
    }

    #[tokio::test]
    async fn rejected_request_stores_nothing() {
        let service = Arc::new(ScriptedService::new(true));
        let (flow, results) = flow(service);

        let outcome = flow.submit(form()).await;
        assert!(matches!(
            outcome,
            Err(AnalysisError::Request(PortError::Rejected { status: 500, .. }))
        ));
        assert!(results.is_empty().await);
        assert!(!flow.is_analyzing());
    }

    #[tokio::test]
    async fn overlapping_submission_is_busy() {
        let service = Arc::new(ScriptedService {
            delay: Duration::from_millis(50),
            ..ScriptedService::new(false)
        });
        let (flow, results) = flow(service);

        let (first, second) = tokio::join!(flow.submit(form()), flow.submit(form()));
        assert!(first.is_ok());
        assert!(matches!(second, Err(AnalysisError::Busy)));
        assert_eq!(results.len().await, 1);
    }
}
