//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the stub analysis API and the master
//! definition for the OpenAPI document.

use std::collections::HashMap;

use axum::{
    extract::Multipart,
    http::StatusCode,
    response::Json,
};
use bytes::Bytes;
use dermascan_core::domain::{AnalysisReport, Product, UserDetails};
use dermascan_core::intake::{image_content_type, parse_allergies};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::{OpenApi, ToSchema};

use crate::catalog;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        analyze_handler,
        health_handler,
        diseases_handler,
    ),
    components(
        schemas(AnalyzeResponse, ProductBody, UserDetailsBody, DiseaseSummary, HealthResponse, ErrorResponse)
    ),
    tags(
        (name = "DermaScan Analysis API", description = "Stub skin-condition analysis endpoints.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductBody {
    pub name: String,
    pub image_url: String,
    pub description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserDetailsBody {
    pub name: String,
    pub age: Option<u32>,
    pub gender: String,
    pub skin_type: String,
    pub allergies: Vec<String>,
}

/// The diagnosis returned for an uploaded image.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub disease: String,
    pub confidence: Option<f64>,
    pub description: String,
    pub symptoms: Vec<String>,
    pub remedies: Vec<String>,
    pub products: Vec<ProductBody>,
    pub user_details: UserDetailsBody,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DiseaseSummary {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

type Rejection = (StatusCode, Json<ErrorResponse>);

fn bad_request(message: impl Into<String>) -> Rejection {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

impl From<Product> for ProductBody {
    fn from(product: Product) -> Self {
        Self {
            name: product.name,
            image_url: product.image_url,
            description: product.description,
        }
    }
}

impl From<UserDetails> for UserDetailsBody {
    fn from(details: UserDetails) -> Self {
        Self {
            name: details.name,
            age: details.age,
            gender: details.gender,
            skin_type: details.skin_type,
            allergies: details.allergies,
        }
    }
}

impl AnalyzeResponse {
    fn new(report: AnalysisReport, details: UserDetails) -> Self {
        Self {
            disease: report.disease,
            confidence: report.confidence,
            description: report.description,
            symptoms: report.symptoms,
            remedies: report.remedies,
            products: report.products.into_iter().map(ProductBody::from).collect(),
            user_details: details.into(),
        }
    }
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Analyze an uploaded skin photo.
///
/// Accepts a multipart/form-data request with an `image` file part and the
/// optional text parts `name`, `age`, `gender`, `skinType` and `allergies`
/// (comma-separated).
#[utoipa::path(
    post,
    path = "/api/analyze",
    request_body(content_type = "multipart/form-data", description = "The image and intake fields."),
    responses(
        (status = 200, description = "Analysis completed", body = AnalyzeResponse),
        (status = 400, description = "Missing or unsupported image, or invalid field", body = ErrorResponse)
    )
)]
pub async fn analyze_handler(mut multipart: Multipart) -> Result<Json<AnalyzeResponse>, Rejection> {
    let mut image: Option<(String, Bytes)> = None;
    let mut fields: HashMap<String, String> = HashMap::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(format!("Failed to read multipart data: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == "image" {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| bad_request(format!("Failed to read image bytes: {}", e)))?;
            image = Some((file_name, data));
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| bad_request(format!("Failed to read field {}: {}", name, e)))?;
            fields.insert(name, value);
        }
    }

    let (file_name, data) = image.ok_or_else(|| bad_request("No image part"))?;
    if file_name.is_empty() {
        return Err(bad_request("No selected file"));
    }
    if image_content_type(&file_name).is_err() {
        warn!("Rejected upload {}", file_name);
        return Err(bad_request("Invalid file type"));
    }

    let text = |key: &str| fields.get(key).map(|v| v.trim().to_string()).unwrap_or_default();
    let age = match text("age").as_str() {
        "" => None,
        raw => Some(
            raw.parse::<u32>()
                .map_err(|_| bad_request(format!("Invalid age '{}'", raw)))?,
        ),
    };
    let details = UserDetails {
        name: text("name"),
        age,
        gender: text("gender"),
        skin_type: text("skinType"),
        allergies: parse_allergies(&text("allergies")),
    };

    let report = catalog::report(&details, &mut rand::thread_rng());
    info!(
        "Analyzed {} ({} bytes): {} at {:?}",
        file_name,
        data.len(),
        report.disease,
        report.confidence
    );
    Ok(Json(AnalyzeResponse::new(report, details)))
}

/// Liveness probe.
#[utoipa::path(
    get,
    path = "/api/health",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
    })
}

/// List the conditions the analysis can report.
#[utoipa::path(
    get,
    path = "/api/diseases",
    responses((status = 200, description = "Known conditions", body = [DiseaseSummary]))
)]
pub async fn diseases_handler() -> Json<Vec<DiseaseSummary>> {
    Json(
        catalog::CONDITIONS
            .iter()
            .map(|c| DiseaseSummary {
                name: c.name.to_string(),
                description: c.summary.to_string(),
            })
            .collect(),
    )
}
