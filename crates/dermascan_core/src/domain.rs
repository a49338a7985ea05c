//! crates/dermascan_core/src/domain.rs
//!
//! Defines the core data structures for the application.
//! Persisted forms are JSON with camelCase field names, so the structs carry
//! their serde attributes here rather than in a separate record layer.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The currently signed-in user. Never carries credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

/// One entry in the local account ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    /// Argon2 PHC string.
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl RegisteredUser {
    pub fn session(&self) -> Session {
        Session {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub name: String,
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Snapshot of the intake form at submission time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDetails {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub skin_type: String,
    #[serde(default)]
    pub allergies: Vec<String>,
}

/// The body returned by an analysis service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub disease: String,
    pub description: String,
    #[serde(default)]
    pub remedies: Vec<String>,
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub symptoms: Vec<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
}

/// An uploaded photo, as selected by the user.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

/// A validated intake, ready to be sent to an analysis service.
#[derive(Debug, Clone)]
pub struct AnalysisSubmission {
    pub image: ImageUpload,
    pub details: UserDetails,
}

/// A result candidate; the store assigns `id` and `date` on insertion.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAnalysisResult {
    pub disease: String,
    pub description: String,
    pub image_url: String,
    pub remedies: Vec<String>,
    pub products: Vec<Product>,
    pub symptoms: Vec<String>,
    pub confidence: Option<f64>,
    pub user_details: UserDetails,
}

impl NewAnalysisResult {
    pub fn from_report(report: AnalysisReport, image_url: String, user_details: UserDetails) -> Self {
        Self {
            disease: report.disease,
            description: report.description,
            image_url,
            remedies: report.remedies,
            products: report.products,
            symptoms: report.symptoms,
            confidence: report.confidence,
            user_details,
        }
    }
}

/// A stored analysis. Immutable once the store has handed it out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub id: Uuid,
    pub date: DateTime<Utc>,
    pub disease: String,
    pub description: String,
    pub image_url: String,
    pub remedies: Vec<String>,
    pub products: Vec<Product>,
    #[serde(default)]
    pub symptoms: Vec<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
    pub user_details: UserDetails,
}

impl AnalysisResult {
    pub(crate) fn materialize(candidate: NewAnalysisResult, date: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            disease: candidate.disease,
            description: candidate.description,
            image_url: candidate.image_url,
            remedies: candidate.remedies,
            products: candidate.products,
            symptoms: candidate.symptoms,
            confidence: candidate.confidence,
            user_details: candidate.user_details,
        }
    }
}
