//! REST API Routes Module
//!
//! Route handlers for the partner registry plus the top-level router
//! assembly: CORS for browser clients and request tracing.

pub mod health;
pub mod partner;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Assemble the full API router over the given state.
pub fn create_api_router(state: AppState) -> Router {
    Router::new()
        .merge(health::create_router())
        .merge(partner::create_router())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
