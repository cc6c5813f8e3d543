//! Partner Registry Storage Layer
//!
//! Owns persistence and caching for the registry:
//!
//! - [`codec`] translates wire geometry (GeoJSON-shaped structs) to
//!   and from the storage engine's WKT encoding, fixed to SRID 4326.
//! - [`traits`] defines the [`PartnerStore`] and [`CacheStore`]
//!   contracts. Both have one production implementation ([`pg`],
//!   [`redis_cache`]) and one in-memory implementation ([`memory`])
//!   used as the test double.
//! - [`service`] is the access facade: cache-aside reads keyed by id
//!   or by geohash cell, write pass-through.

pub mod codec;
pub mod memory;
pub mod pg;
pub mod redis_cache;
pub mod service;
pub mod traits;

pub use memory::{InMemoryCache, InMemoryPartnerStore};
pub use pg::{PgConfig, PgPartnerStore};
pub use redis_cache::{RedisCache, RedisConfig};
pub use service::{PartnerService, ServiceConfig, GEOHASH_PRECISION};
pub use traits::{CacheStore, PartnerStore};
