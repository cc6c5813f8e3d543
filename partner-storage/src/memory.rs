//! In-memory store and cache implementations.
//!
//! These back the facade and API tests without PostgreSQL or Redis.
//! The store mirrors the engine semantics the production store relies
//! on: geometries round-trip through the codec, the document
//! constraint is enforced atomically with the insert, containment is
//! a hard filter, and ranking uses Euclidean distance in CRS 4326
//! degrees with lowest id breaking ties.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use geo::{Contains, Distance, Euclidean};
use geo_types::Point;
use partner_core::{NewPartner, Partner, PartnerError, PartnerResult};

use crate::codec;
use crate::traits::{CacheStore, PartnerStore};

// ============================================================================
// PARTNER STORE
// ============================================================================

#[derive(Default)]
struct StoreState {
    next_id: i64,
    partners: Vec<Partner>,
}

/// In-memory [`PartnerStore`] double.
#[derive(Default)]
pub struct InMemoryPartnerStore {
    state: Mutex<StoreState>,
}

impl InMemoryPartnerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PartnerStore for InMemoryPartnerStore {
    async fn create(&self, candidate: &NewPartner) -> PartnerResult<Partner> {
        // Same round trip as the production store: what is returned is
        // what survived the storage encoding.
        let coverage_wkt = codec::encode_multi_polygon(&candidate.coverage_area)?;
        let address_wkt = codec::encode_point(&candidate.address)?;
        let coverage_area = codec::decode_multi_polygon(&coverage_wkt)?;
        let address = codec::decode_point(&address_wkt)?;

        let mut state = self
            .state
            .lock()
            .map_err(|_| PartnerError::store_unavailable("store lock poisoned"))?;

        if state
            .partners
            .iter()
            .any(|p| p.document == candidate.document)
        {
            return Err(PartnerError::duplicate_document(&candidate.document));
        }

        state.next_id += 1;
        let partner = Partner {
            id: state.next_id,
            trading_name: candidate.trading_name.clone(),
            owner_name: candidate.owner_name.clone(),
            document: candidate.document.clone(),
            coverage_area,
            address,
        };
        state.partners.push(partner.clone());
        Ok(partner)
    }

    async fn get_by_id(&self, id: i64) -> PartnerResult<Option<Partner>> {
        let state = self
            .state
            .lock()
            .map_err(|_| PartnerError::store_unavailable("store lock poisoned"))?;
        Ok(state.partners.iter().find(|p| p.id == id).cloned())
    }

    async fn search_nearest_containing(
        &self,
        longitude: f64,
        latitude: f64,
    ) -> PartnerResult<Option<Partner>> {
        let state = self
            .state
            .lock()
            .map_err(|_| PartnerError::store_unavailable("store lock poisoned"))?;
        let query = Point::new(longitude, latitude);

        let mut best: Option<(f64, &Partner)> = None;
        for partner in &state.partners {
            let region = codec::wire_to_multi_polygon(&partner.coverage_area)?;
            if !region.contains(&query) {
                continue;
            }

            let address = Point::new(partner.address.longitude(), partner.address.latitude());
            let distance = Euclidean::distance(address, query);

            let closer = match &best {
                None => true,
                Some((best_distance, best_partner)) => {
                    match distance.partial_cmp(best_distance).unwrap_or(Ordering::Equal) {
                        Ordering::Less => true,
                        Ordering::Equal => partner.id < best_partner.id,
                        Ordering::Greater => false,
                    }
                }
            };
            if closer {
                best = Some((distance, partner));
            }
        }

        Ok(best.map(|(_, partner)| partner.clone()))
    }
}

// ============================================================================
// CACHE STORE
// ============================================================================

struct CacheEntry {
    value: String,
    expires_at: Instant,
}

/// In-memory [`CacheStore`] double with real expiration.
#[derive(Default)]
pub struct InMemoryCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (non-expired) entries. Test helper.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .lock()
            .map(|entries| entries.values().filter(|e| e.expires_at > now).count())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CacheStore for InMemoryCache {
    async fn get(&self, key: &str) -> PartnerResult<Option<String>> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| PartnerError::cache_unavailable("cache lock poisoned"))?;

        match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Ok(Some(entry.value.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> PartnerResult<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| PartnerError::cache_unavailable("cache lock poisoned"))?;
        entries.insert(
            key.to_string(),
            CacheEntry {
                value: value.to_string(),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }
}
