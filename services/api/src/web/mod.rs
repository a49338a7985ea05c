//! services/api/src/web/mod.rs
//!
//! Router assembly for the stub analysis server.

pub mod rest;

use axum::{
    extract::DefaultBodyLimit,
    http::{header::CONTENT_TYPE, HeaderValue, Method},
    response::Json,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;

use crate::config::{Config, ConfigError};
use crate::error::ApiError;

pub use rest::{analyze_handler, diseases_handler, health_handler, ApiDoc};

/// Largest accepted upload.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Routes without the CORS layer; used directly by tests.
pub fn api_routes() -> Router {
    Router::new()
        .route("/api/analyze", post(analyze_handler))
        .route("/api/health", get(health_handler))
        .route("/api/diseases", get(diseases_handler))
        .route(
            "/api-docs/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}

/// The full stub analysis server.
pub fn router(config: &Config) -> Result<Router, ApiError> {
    let origin = config.allowed_origin.parse::<HeaderValue>().map_err(|e| {
        ConfigError::InvalidValue("ALLOWED_ORIGIN".to_string(), e.to_string())
    })?;

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE]);

    Ok(api_routes().layer(cors))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::rest::{DiseaseSummary, ErrorResponse, HealthResponse};
    use axum_test::multipart::{MultipartForm, Part};
    use axum_test::TestServer;

    fn server() -> TestServer {
        TestServer::builder()
            .build(api_routes())
            .expect("Failed to create test server")
    }

    #[tokio::test]
    async fn health_reports_healthy() {
        let response = server().get("/api/health").await;
        response.assert_status_ok();
        assert_eq!(response.json::<HealthResponse>().status, "healthy");
    }

    #[tokio::test]
    async fn diseases_lists_the_catalog() {
        let response = server().get("/api/diseases").await;
        response.assert_status_ok();
        let diseases = response.json::<Vec<DiseaseSummary>>();
        assert_eq!(diseases.len(), 5);
        assert!(diseases.iter().any(|d| d.name == "Vitiligo"));
    }

    #[tokio::test]
    async fn analyze_without_image_is_rejected() {
        let form = MultipartForm::new().add_text("name", "Ana");
        let response = server().post("/api/analyze").multipart(form).await;
        response.assert_status_bad_request();
        assert_eq!(response.json::<ErrorResponse>().error, "No image part");
    }

    #[tokio::test]
    async fn analyze_rejects_unsupported_files() {
        let image = Part::bytes(vec![1u8, 2, 3])
            .file_name("scan.gif")
            .mime_type("image/gif");
        let form = MultipartForm::new().add_part("image", image);
        let response = server().post("/api/analyze").multipart(form).await;
        response.assert_status_bad_request();
        assert_eq!(response.json::<ErrorResponse>().error, "Invalid file type");
    }

    #[tokio::test]
    async fn openapi_document_lists_the_analyze_path() {
        let response = server().get("/api-docs/openapi.json").await;
        response.assert_status_ok();
        assert!(response.text().contains("/api/analyze"));
    }

    #[test]
    fn invalid_origin_is_a_config_error() {
        let mut config = Config::from_lookup(|_| None).unwrap();
        config.allowed_origin = "bad\norigin".to_string();
        assert!(matches!(router(&config), Err(ApiError::Config(_))));
    }
}
