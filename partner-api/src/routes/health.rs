//! Health check endpoint.
//!
//! A plain liveness probe: 200 with an empty body. No authentication,
//! no dependency checks.

use axum::{http::StatusCode, response::IntoResponse, routing::get, Router};

use crate::state::AppState;

/// GET /health - liveness check
pub async fn health() -> impl IntoResponse {
    StatusCode::OK
}

/// Create the health routes router.
pub fn create_router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
