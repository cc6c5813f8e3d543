//! Redis-backed cache store.
//!
//! Values are opaque serialized partner records with a per-key TTL.
//! The cache holds disposable derived copies only; it is never the
//! source of truth, and every failure here maps to
//! `PartnerError::CacheUnavailable` so callers can degrade to a
//! store read.

use std::time::Duration;

use async_trait::async_trait;
use partner_core::{PartnerError, PartnerResult};
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use crate::traits::CacheStore;

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Redis connection configuration.
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Redis connection URL.
    pub url: String,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379/0".to_string(),
        }
    }
}

impl RedisConfig {
    /// Create a Redis configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            url: std::env::var("PARTNER_REDIS_URL")
                .unwrap_or_else(|_| "redis://127.0.0.1:6379/0".to_string()),
        }
    }
}

// ============================================================================
// CACHE STORE
// ============================================================================

/// Redis [`CacheStore`] over a multiplexed connection manager.
///
/// `ConnectionManager` reconnects on its own; cloning it is cheap and
/// shares the underlying connection.
#[derive(Clone)]
pub struct RedisCache {
    manager: ConnectionManager,
}

impl RedisCache {
    /// Connect to Redis with the given configuration.
    pub async fn connect(config: &RedisConfig) -> PartnerResult<Self> {
        let client = redis::Client::open(config.url.as_str())
            .map_err(|e| PartnerError::cache_unavailable(format!("Invalid Redis URL: {}", e)))?;
        let manager = ConnectionManager::new(client).await.map_err(|e| {
            PartnerError::cache_unavailable(format!("Redis connection failed: {}", e))
        })?;
        Ok(Self { manager })
    }
}

#[async_trait]
impl CacheStore for RedisCache {
    async fn get(&self, key: &str) -> PartnerResult<Option<String>> {
        let mut conn = self.manager.clone();
        conn.get(key)
            .await
            .map_err(|e| PartnerError::cache_unavailable(e.to_string()))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> PartnerResult<()> {
        let mut conn = self.manager.clone();
        conn.set_ex(key, value, ttl.as_secs())
            .await
            .map_err(|e| PartnerError::cache_unavailable(e.to_string()))
    }
}
