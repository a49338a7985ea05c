//! services/api/src/bin/api.rs
//!
//! Runs the stub analysis server.

use dermascan_api::{config::Config, error::ApiError, logging, web};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Config::from_env()?;
    logging::init(config.log_level);
    info!("Configuration loaded. Starting stub analysis server...");

    // --- 2. Create the Web Router ---
    let app = web::router(&config)?;

    // --- 3. Start the Server ---
    info!("Listening on {}", config.bind_address);
    info!(
        "OpenAPI document available at http://{}/api-docs/openapi.json",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
