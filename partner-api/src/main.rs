//! Partner Registry API Server Entry Point
//!
//! Bootstraps configuration, connects the PostGIS store and the Redis
//! cache, and starts the Axum HTTP server.

use std::sync::Arc;

use partner_api::{create_api_router, ApiConfig, ApiError, ApiResult, AppState};
use partner_storage::{
    PartnerService, PgConfig, PgPartnerStore, RedisCache, RedisConfig, ServiceConfig,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ApiResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let pg_config = PgConfig::from_env();
    let store = PgPartnerStore::from_config(&pg_config)?;

    let redis_config = RedisConfig::from_env();
    let cache = RedisCache::connect(&redis_config)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to connect cache: {}", e)))?;

    let partners = PartnerService::new(
        Arc::new(store),
        Arc::new(cache),
        ServiceConfig::from_env(),
    );
    let app = create_api_router(AppState::new(partners));

    let api_config = ApiConfig::from_env();
    let addr = api_config.bind_addr()?;
    tracing::info!(%addr, "Starting partner registry API server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;

    let server = axum::serve(listener, app);
    tokio::select! {
        result = server => {
            result.map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
