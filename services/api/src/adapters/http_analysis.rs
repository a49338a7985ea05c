//! services/api/src/adapters/http_analysis.rs
//!
//! This module contains the adapter for the remote analysis endpoint.
//! It implements the `AnalysisService` port by posting the image and intake
//! fields as multipart/form-data.

use std::time::Duration;

use async_trait::async_trait;
use dermascan_core::domain::{AnalysisReport, AnalysisSubmission};
use dermascan_core::intake::join_allergies;
use dermascan_core::ports::{AnalysisService, PortError, PortResult};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

#[derive(Clone)]
pub struct HttpAnalysisAdapter {
    client: Client,
    endpoint: String,
}

/// Shape of an error body, e.g. `{"error": "Invalid file type"}`.
#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

impl HttpAnalysisAdapter {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> PortResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PortError::Unexpected(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    fn form(submission: &AnalysisSubmission) -> PortResult<Form> {
        let image = Part::bytes(submission.image.bytes.to_vec())
            .file_name(submission.image.file_name.clone())
            .mime_str(&submission.image.content_type)
            .map_err(|e| PortError::Unexpected(format!("Invalid image type: {}", e)))?;

        let details = &submission.details;
        Ok(Form::new()
            .part("image", image)
            .text("name", details.name.clone())
            .text("age", details.age.map(|a| a.to_string()).unwrap_or_default())
            .text("gender", details.gender.clone())
            .text("skinType", details.skin_type.clone())
            .text("allergies", join_allergies(&details.allergies)))
    }
}

//=========================================================================================
// `AnalysisService` Trait Implementation
//=========================================================================================

#[async_trait]
impl AnalysisService for HttpAnalysisAdapter {
    async fn analyze(&self, submission: &AnalysisSubmission) -> PortResult<AnalysisReport> {
        debug!("POST {}", self.endpoint);
        let response = self
            .client
            .post(&self.endpoint)
            .multipart(Self::form(submission)?)
            .send()
            .await
            .map_err(|e| PortError::Unexpected(format!("Analysis request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PortError::Unexpected(format!("Failed to read analysis response: {}", e)))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.error)
                .unwrap_or(body);
            warn!("Analysis endpoint answered {}: {}", status, message);
            return Err(PortError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body)
            .map_err(|e| PortError::Unexpected(format!("Malformed analysis response: {}", e)))
    }
}
