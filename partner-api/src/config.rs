//! API Configuration Module
//!
//! Bind-address configuration loaded from environment variables with
//! development defaults.

use std::net::SocketAddr;

use crate::error::{ApiError, ApiResult};

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Interface to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl ApiConfig {
    /// Create ApiConfig from environment variables.
    ///
    /// Environment variables:
    /// - `PARTNER_API_BIND`: bind interface (default: 0.0.0.0)
    /// - `PORT` or `PARTNER_API_PORT`: listen port (default: 3000)
    pub fn from_env() -> Self {
        let host =
            std::env::var("PARTNER_API_BIND").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = std::env::var("PORT")
            .ok()
            .or_else(|| std::env::var("PARTNER_API_PORT").ok())
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);

        Self { host, port }
    }

    /// Resolve the socket address to bind.
    pub fn bind_addr(&self) -> ApiResult<SocketAddr> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse::<SocketAddr>()
            .map_err(|e| ApiError::invalid_input(format!("Invalid bind address {}: {}", addr, e)))
    }
}
