//! Partner Registry API - REST Layer
//!
//! Axum HTTP surface over the partner access facade. Handlers marshal
//! requests and map outcomes to status codes; persistence and caching
//! live in `partner-storage`.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult, ErrorCode};
pub use routes::create_api_router;
pub use state::AppState;
