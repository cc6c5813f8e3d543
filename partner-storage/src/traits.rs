//! Store and cache contracts.
//!
//! The facade depends on these traits rather than on concrete
//! implementations, so production wiring (PostGIS + Redis) and test
//! wiring (the in-memory doubles) are both explicit constructor
//! arguments, not a process-wide registry.

use std::time::Duration;

use async_trait::async_trait;
use partner_core::{NewPartner, Partner, PartnerResult};

/// Persistence contract for partners.
///
/// A missing record is a valid outcome, so both read operations
/// return `Option<Partner>` rather than an error.
#[async_trait]
pub trait PartnerStore: Send + Sync {
    /// Insert a new partner and return it with its assigned id.
    ///
    /// The document-uniqueness invariant is enforced by the store's
    /// own constraint, atomically with the insert; a violation
    /// surfaces as `PartnerError::DuplicateDocument`, any other
    /// persistence failure as `PartnerError::StoreUnavailable`.
    async fn create(&self, candidate: &NewPartner) -> PartnerResult<Partner>;

    /// Point lookup by primary key.
    async fn get_by_id(&self, id: i64) -> PartnerResult<Option<Partner>>;

    /// Among partners whose coverage area contains the query point,
    /// return the one whose address is nearest to it.
    ///
    /// Containment is a hard filter: a close but non-containing
    /// partner is never returned. Equidistant candidates are broken
    /// deterministically by lowest id.
    async fn search_nearest_containing(
        &self,
        longitude: f64,
        latitude: f64,
    ) -> PartnerResult<Option<Partner>>;
}

/// Key/value cache with per-key expiration.
///
/// Keys are opaque strings constructed by the caller; values are
/// opaque serialized records. The cache is a pure acceleration layer:
/// correctness must hold identically if every `get` returns `None`.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Get a value. Expired and absent keys both return `None`.
    async fn get(&self, key: &str) -> PartnerResult<Option<String>>;

    /// Set a value with a time-to-live. Always overwrites.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> PartnerResult<()>;
}
