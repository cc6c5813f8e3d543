//! Partner Registry Core - Entity Types
//!
//! Pure data structures with no behavior beyond structural validation.
//! All other crates depend on this. This crate contains ONLY data types
//! and the shared error taxonomy - no persistence or transport logic.

pub mod error;
pub mod geometry;

use serde::{Deserialize, Serialize};

pub use error::{PartnerError, PartnerResult};
pub use geometry::{MultiPolygonGeometry, PointGeometry, Position, SRID};

// ============================================================================
// FIELD LIMITS
// ============================================================================

/// Maximum length of a trading name, matching the column width.
pub const MAX_TRADING_NAME_LEN: usize = 50;

/// Maximum length of an owner name, matching the column width.
pub const MAX_OWNER_NAME_LEN: usize = 256;

// ============================================================================
// ENTITIES
// ============================================================================

/// A registered partner.
///
/// The `id` is assigned by the store on creation and never changes.
/// `document` is the natural key: globally unique, enforced by the
/// store's unique constraint rather than by application code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Partner {
    pub id: i64,
    pub trading_name: String,
    pub owner_name: String,
    pub document: String,
    /// Multi-polygon region the partner serves, CRS 4326.
    pub coverage_area: MultiPolygonGeometry,
    /// Physical location, CRS 4326. Used as the distance tie-breaker
    /// among partners whose coverage contains a query point.
    pub address: PointGeometry,
}

/// A partner candidate, as submitted for registration.
///
/// Identical to [`Partner`] minus the store-assigned id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPartner {
    pub trading_name: String,
    pub owner_name: String,
    pub document: String,
    pub coverage_area: MultiPolygonGeometry,
    pub address: PointGeometry,
}

impl NewPartner {
    /// Validate both geometries structurally.
    ///
    /// Malformed geometry is rejected here, before any store
    /// interaction.
    pub fn validate(&self) -> PartnerResult<()> {
        self.coverage_area.validate()?;
        self.address.validate()?;
        Ok(())
    }

    /// Promote the candidate to a full [`Partner`] once the store has
    /// assigned an id.
    pub fn into_partner(self, id: i64) -> Partner {
        Partner {
            id,
            trading_name: self.trading_name,
            owner_name: self.owner_name,
            document: self.document,
            coverage_area: self.coverage_area,
            address: self.address,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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
            address: PointGeometry::new(-46.57421, -21.785741),
        }
    }

    #[test]
    fn test_valid_candidate_passes_validation() {
        assert!(sample_candidate().validate().is_ok());
    }

    #[test]
    fn test_into_partner_preserves_fields() {
        let candidate = sample_candidate();
        let partner = candidate.clone().into_partner(7);

        assert_eq!(partner.id, 7);
        assert_eq!(partner.trading_name, candidate.trading_name);
        assert_eq!(partner.document, candidate.document);
        assert_eq!(partner.coverage_area, candidate.coverage_area);
        assert_eq!(partner.address, candidate.address);
    }

    #[test]
    fn test_partner_json_shape() -> Result<(), serde_json::Error> {
        let partner = sample_candidate().into_partner(1);
        let json = serde_json::to_value(&partner)?;

        assert_eq!(json["id"], 1);
        assert_eq!(json["document"], "12345678901234");
        assert_eq!(json["coverage_area"]["type"], "MultiPolygon");
        assert_eq!(json["address"]["type"], "Point");
        assert_eq!(json["address"]["coordinates"][0], -46.57421);

        let back: Partner = serde_json::from_value(json)?;
        assert_eq!(back, partner);
        Ok(())
    }
}
