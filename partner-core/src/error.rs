//! Error taxonomy for partner registry operations.
//!
//! "Not found" is deliberately absent: both read paths return
//! `Option<Partner>`, because a missing record is a first-class valid
//! outcome, not an error.

use thiserror::Error;

/// Errors surfaced by the geometry codec, the partner store and the
/// cache store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PartnerError {
    /// Malformed input geometry, rejected before any store interaction.
    #[error("Invalid geometry: {reason}")]
    InvalidGeometry { reason: String },

    /// The insert violated the document-uniqueness constraint.
    /// Never retried: retrying a duplicate insert cannot succeed.
    #[error("Document {document} is already registered")]
    DuplicateDocument { document: String },

    /// Any other persistence failure: connection loss, unrelated
    /// constraint violations, protocol errors.
    #[error("Store unavailable: {reason}")]
    StoreUnavailable { reason: String },

    /// Cache connectivity or serialization failure. Callers degrade
    /// to a store read instead of failing the request.
    #[error("Cache unavailable: {reason}")]
    CacheUnavailable { reason: String },
}

impl PartnerError {
    pub fn invalid_geometry(reason: impl Into<String>) -> Self {
        PartnerError::InvalidGeometry {
            reason: reason.into(),
        }
    }

    pub fn duplicate_document(document: impl Into<String>) -> Self {
        PartnerError::DuplicateDocument {
            document: document.into(),
        }
    }

    pub fn store_unavailable(reason: impl Into<String>) -> Self {
        PartnerError::StoreUnavailable {
            reason: reason.into(),
        }
    }

    pub fn cache_unavailable(reason: impl Into<String>) -> Self {
        PartnerError::CacheUnavailable {
            reason: reason.into(),
        }
    }
}

/// Result type alias used throughout the registry crates.
pub type PartnerResult<T> = Result<T, PartnerError>;
