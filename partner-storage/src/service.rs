//! Partner access facade.
//!
//! Orchestrates cache-aside reads and pass-through writes over a
//! [`PartnerStore`] and a [`CacheStore`], both injected at
//! construction.
//!
//! Read protocol: probe the cache; on a hit deserialize and return
//! without touching the store; on a miss read the store and, only if
//! a partner was found, populate the cache with the fixed TTL. The
//! by-coordinate path keys on a geohash cell rather than an exact
//! coordinate, so nearby lookups share one entry; the cell size is
//! fixed by [`GEOHASH_PRECISION`]. Within one cell the cached answer
//! may differ from the exact nearest for up to the TTL - that
//! imprecision is the accepted price of the hit rate.
//!
//! Cache failures never fail a request: a failed probe degrades to a
//! store read and a failed populate is dropped, both logged at WARN.

use std::sync::Arc;
use std::time::Duration;

use geohash::Coord;
use partner_core::{NewPartner, Partner, PartnerError, PartnerResult};

use crate::traits::{CacheStore, PartnerStore};

/// Geohash precision for by-coordinate cache keys.
///
/// Six characters is a cell of roughly 1.2 km x 0.6 km: small enough
/// that one nearest-partner answer is representative for the whole
/// cell, large enough that repeat lookups in an area actually hit.
pub const GEOHASH_PRECISION: usize = 6;

/// Default expiration for cache entries, in seconds.
const DEFAULT_CACHE_TTL_SECS: u64 = 3600;

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Facade configuration.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Fixed expiration applied to every cache entry.
    pub cache_ttl: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
        }
    }
}

impl ServiceConfig {
    /// Create a configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            cache_ttl: Duration::from_secs(
                std::env::var("PARTNER_CACHE_TTL_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_CACHE_TTL_SECS),
            ),
        }
    }
}

// ============================================================================
// CACHE KEYS
// ============================================================================

/// Cache key for a by-id lookup.
pub fn partner_id_key(id: i64) -> String {
    format!("partner_{}", id)
}

/// Cache key for a by-coordinate lookup: the geohash cell the
/// coordinate falls in.
///
/// Fails for coordinates outside the geohashable range. That is a
/// cache-path failure, not a query failure: callers degrade to an
/// uncached store read.
pub fn partner_geohash_key(longitude: f64, latitude: f64) -> PartnerResult<String> {
    let cell = geohash::encode(
        Coord {
            x: longitude,
            y: latitude,
        },
        GEOHASH_PRECISION,
    )
    .map_err(|e| PartnerError::cache_unavailable(format!("geohash failed: {}", e)))?;
    Ok(format!("partner_{}", cell))
}

// ============================================================================
// FACADE
// ============================================================================

/// Cache-aside facade over a partner store.
#[derive(Clone)]
pub struct PartnerService {
    store: Arc<dyn PartnerStore>,
    cache: Arc<dyn CacheStore>,
    cache_ttl: Duration,
}

impl PartnerService {
    /// Build the facade from its collaborators.
    pub fn new(
        store: Arc<dyn PartnerStore>,
        cache: Arc<dyn CacheStore>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            store,
            cache,
            cache_ttl: config.cache_ttl,
        }
    }

    /// Register a new partner.
    ///
    /// Writes go straight to the store. No cache entry can exist for
    /// a not-yet-created partner, and entries for other partners are
    /// unaffected by the insert, so the cache is left alone.
    pub async fn create(&self, candidate: &NewPartner) -> PartnerResult<Partner> {
        self.store.create(candidate).await
    }

    /// Fetch a partner by id, cache first.
    pub async fn get_by_id(&self, id: i64) -> PartnerResult<Option<Partner>> {
        let key = partner_id_key(id);
        if let Some(hit) = self.probe(&key).await {
            return Ok(Some(hit));
        }

        match self.store.get_by_id(id).await? {
            Some(partner) => {
                self.populate(&key, &partner).await;
                Ok(Some(partner))
            }
            // NotFound propagates without populating the cache.
            None => Ok(None),
        }
    }

    /// Find the nearest partner covering a coordinate, cache first.
    ///
    /// The answer must be identical with and without the cache, so a
    /// coordinate that cannot be geohashed skips the cache instead of
    /// failing a request the store itself would answer.
    pub async fn search_nearest_containing(
        &self,
        longitude: f64,
        latitude: f64,
    ) -> PartnerResult<Option<Partner>> {
        let key = match partner_geohash_key(longitude, latitude) {
            Ok(key) => Some(key),
            Err(e) => {
                tracing::warn!(
                    longitude,
                    latitude,
                    error = %e,
                    "Geohash key derivation failed, skipping cache"
                );
                None
            }
        };

        if let Some(key) = &key {
            if let Some(hit) = self.probe(key).await {
                return Ok(Some(hit));
            }
        }

        match self
            .store
            .search_nearest_containing(longitude, latitude)
            .await?
        {
            Some(partner) => {
                if let Some(key) = &key {
                    self.populate(key, &partner).await;
                }
                Ok(Some(partner))
            }
            None => Ok(None),
        }
    }

    /// Probe the cache. Any failure (connectivity, undecodable entry)
    /// is treated as a miss.
    async fn probe(&self, key: &str) -> Option<Partner> {
        let raw = match self.cache.get(key).await {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!(key, error = %e, "Cache read failed, falling back to store");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(partner) => Some(partner),
            Err(e) => {
                tracing::warn!(key, error = %e, "Discarding undecodable cache entry");
                None
            }
        }
    }

    /// Populate the cache after a store hit. Failures are logged and
    /// dropped; the partner is returned to the caller regardless.
    async fn populate(&self, key: &str, partner: &Partner) {
        let raw = match serde_json::to_string(partner) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(key, error = %e, "Failed to serialize partner for cache");
                return;
            }
        };
        if let Err(e) = self.cache.set(key, &raw, self.cache_ttl).await {
            tracing::warn!(key, error = %e, "Cache write failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use partner_core::{MultiPolygonGeometry, PointGeometry};

    use crate::memory::{InMemoryCache, InMemoryPartnerStore};

    /// Store wrapper that counts reads, for cache-coherency assertions.
    struct CountingStore {
        inner: InMemoryPartnerStore,
        reads: AtomicUsize,
    }

    impl CountingStore {
        fn new() -> Self {
            Self {
                inner: InMemoryPartnerStore::new(),
                reads: AtomicUsize::new(0),
            }
        }

        fn reads(&self) -> usize {
            self.reads.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PartnerStore for CountingStore {
        async fn create(&self, candidate: &NewPartner) -> PartnerResult<Partner> {
            self.inner.create(candidate).await
        }

        async fn get_by_id(&self, id: i64) -> PartnerResult<Option<Partner>> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.inner.get_by_id(id).await
        }

        async fn search_nearest_containing(
            &self,
            longitude: f64,
            latitude: f64,
        ) -> PartnerResult<Option<Partner>> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.inner.search_nearest_containing(longitude, latitude).await
        }
    }

    /// Cache that fails every operation.
    struct BrokenCache;

    #[async_trait]
    impl CacheStore for BrokenCache {
        async fn get(&self, _key: &str) -> PartnerResult<Option<String>> {
            Err(PartnerError::cache_unavailable("connection refused"))
        }

        async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> PartnerResult<()> {
            Err(PartnerError::cache_unavailable("connection refused"))
        }
    }

    fn sample_candidate() -> NewPartner {
        NewPartner {
            trading_name: "Adega da Cerveja - Pinheiros".to_string(),
            owner_name: "Ze da Silva".to_string(),
            document: "12345678901234".to_string(),
            coverage_area: MultiPolygonGeometry::new(vec![vec![vec![
                [30.0, 20.0],
                [45.0, 40.0],
                [10.0, 40.0],
                [30.0, 20.0],
            ]]]),
            address: PointGeometry::new(30.0, 30.0),
        }
    }

    fn service_with(
        store: Arc<dyn PartnerStore>,
        cache: Arc<dyn CacheStore>,
    ) -> PartnerService {
        PartnerService::new(store, cache, ServiceConfig::default())
    }

    #[tokio::test]
    async fn test_read_through_hits_store_exactly_once() {
        let store = Arc::new(CountingStore::new());
        let cache = Arc::new(InMemoryCache::new());
        let service = service_with(store.clone(), cache.clone());

        let created = service.create(&sample_candidate()).await.unwrap();
        assert_eq!(store.reads(), 0);

        let first = service.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(store.reads(), 1);
        assert_eq!(cache.len(), 1);

        let second = service.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(store.reads(), 1, "second read must be served from cache");
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_miss_does_not_populate_cache() {
        let store = Arc::new(CountingStore::new());
        let cache = Arc::new(InMemoryCache::new());
        let service = service_with(store.clone(), cache.clone());

        assert_eq!(service.get_by_id(999).await.unwrap(), None);
        assert!(cache.is_empty());

        // No negative caching: the store is consulted again.
        assert_eq!(service.get_by_id(999).await.unwrap(), None);
        assert_eq!(store.reads(), 2);
    }

    #[tokio::test]
    async fn test_search_uses_geohash_cell_key() {
        let store = Arc::new(CountingStore::new());
        let cache = Arc::new(InMemoryCache::new());
        let service = service_with(store.clone(), cache.clone());

        let created = service.create(&sample_candidate()).await.unwrap();

        let found = service
            .search_nearest_containing(30.0, 30.0)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, created.id);
        assert_eq!(store.reads(), 1);

        // A nearby coordinate in the same geohash cell reuses the entry.
        let again = service
            .search_nearest_containing(30.0001, 30.0001)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(again.id, created.id);
        assert_eq!(store.reads(), 1);
    }

    #[tokio::test]
    async fn test_broken_cache_degrades_to_store() {
        let store = Arc::new(CountingStore::new());
        let service = service_with(store.clone(), Arc::new(BrokenCache));

        let created = service.create(&sample_candidate()).await.unwrap();

        let found = service.get_by_id(created.id).await.unwrap();
        assert!(found.is_some());

        let found = service
            .search_nearest_containing(30.0, 30.0)
            .await
            .unwrap();
        assert!(found.is_some());

        // Every read went to the store, none failed.
        assert_eq!(store.reads(), 2);
    }

    #[tokio::test]
    async fn test_undecodable_cache_entry_is_a_miss() {
        let store = Arc::new(CountingStore::new());
        let cache = Arc::new(InMemoryCache::new());
        let service = service_with(store.clone(), cache.clone());

        let created = service.create(&sample_candidate()).await.unwrap();
        cache
            .set(
                &partner_id_key(created.id),
                "not json",
                Duration::from_secs(60),
            )
            .await
            .unwrap();

        let found = service.get_by_id(created.id).await.unwrap();
        assert!(found.is_some());
        assert_eq!(store.reads(), 1);
    }

    #[tokio::test]
    async fn test_out_of_range_search_matches_cacheless_semantics() {
        let store = Arc::new(CountingStore::new());
        let cache = Arc::new(InMemoryCache::new());
        let service = service_with(store.clone(), cache.clone());

        service.create(&sample_candidate()).await.unwrap();

        // No coverage contains (200, 95); the store answers None and
        // the ungeohashable coordinate must not fail the request.
        let direct = store.inner.search_nearest_containing(200.0, 95.0).await;
        let through_facade = service.search_nearest_containing(200.0, 95.0).await;
        assert_eq!(through_facade, direct);
        assert_eq!(through_facade.unwrap(), None);

        // The cache was skipped entirely, not populated.
        assert!(cache.is_empty());
        assert_eq!(store.reads(), 1);
    }

    #[tokio::test]
    async fn test_write_does_not_touch_cache() {
        let store = Arc::new(CountingStore::new());
        let cache = Arc::new(InMemoryCache::new());
        let service = service_with(store.clone(), cache.clone());

        service.create(&sample_candidate()).await.unwrap();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_key_shapes() {
        assert_eq!(partner_id_key(42), "partner_42");

        let key = partner_geohash_key(-46.57421, -21.785741).unwrap();
        assert!(key.starts_with("partner_"));
        assert_eq!(key.len(), "partner_".len() + GEOHASH_PRECISION);

        // Deterministic.
        assert_eq!(key, partner_geohash_key(-46.57421, -21.785741).unwrap());
    }
}
