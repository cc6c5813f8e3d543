//! Wire-level geometry types.
//!
//! GeoJSON-shaped structures for the two geometry kinds the registry
//! supports: a point address and a multi-polygon coverage area. Both
//! are fixed to CRS 4326 (WGS-84 longitude/latitude degrees).
//!
//! Structural validation lives here so malformed geometry is rejected
//! at the boundary; conversion to the storage encoding lives in the
//! storage crate's codec.

use serde::{Deserialize, Serialize};

use crate::error::{PartnerError, PartnerResult};

/// CRS identifier for WGS-84 longitude/latitude.
pub const SRID: i32 = 4326;

/// A GeoJSON position: `[longitude, latitude]`.
pub type Position = [f64; 2];

/// Minimum positions in a closed linear ring (triangle plus closure).
const MIN_RING_LEN: usize = 4;

// ============================================================================
// POINT
// ============================================================================

/// GeoJSON type tag for points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointKind {
    Point,
}

/// A single point, serialized as GeoJSON
/// `{"type": "Point", "coordinates": [lng, lat]}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointGeometry {
    #[serde(rename = "type")]
    pub kind: PointKind,
    pub coordinates: Position,
}

impl PointGeometry {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            kind: PointKind::Point,
            coordinates: [longitude, latitude],
        }
    }

    pub fn longitude(&self) -> f64 {
        self.coordinates[0]
    }

    pub fn latitude(&self) -> f64 {
        self.coordinates[1]
    }

    /// Reject non-finite coordinates and out-of-range degrees.
    pub fn validate(&self) -> PartnerResult<()> {
        validate_position(&self.coordinates)
    }
}

// ============================================================================
// MULTI-POLYGON
// ============================================================================

/// GeoJSON type tag for multi-polygons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MultiPolygonKind {
    MultiPolygon,
}

/// A multi-polygon region, serialized as GeoJSON
/// `{"type": "MultiPolygon", "coordinates": [...]}`.
///
/// Coordinates nest as polygons, then linear rings, then positions.
/// The first ring of each polygon is the exterior; any further rings
/// are holes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiPolygonGeometry {
    #[serde(rename = "type")]
    pub kind: MultiPolygonKind,
    pub coordinates: Vec<Vec<Vec<Position>>>,
}

impl MultiPolygonGeometry {
    pub fn new(coordinates: Vec<Vec<Vec<Position>>>) -> Self {
        Self {
            kind: MultiPolygonKind::MultiPolygon,
            coordinates,
        }
    }

    /// Reject empty geometry, short rings, unclosed rings, and
    /// non-finite or out-of-range coordinates.
    pub fn validate(&self) -> PartnerResult<()> {
        if self.coordinates.is_empty() {
            return Err(PartnerError::invalid_geometry(
                "multi-polygon has no polygons",
            ));
        }

        for polygon in &self.coordinates {
            if polygon.is_empty() {
                return Err(PartnerError::invalid_geometry("polygon has no rings"));
            }

            for ring in polygon {
                if ring.len() < MIN_RING_LEN {
                    return Err(PartnerError::invalid_geometry(format!(
                        "ring has {} positions, need at least {}",
                        ring.len(),
                        MIN_RING_LEN
                    )));
                }
                if ring.first() != ring.last() {
                    return Err(PartnerError::invalid_geometry("ring is not closed"));
                }
                for position in ring {
                    validate_position(position)?;
                }
            }
        }

        Ok(())
    }
}

fn validate_position(position: &Position) -> PartnerResult<()> {
    let [lng, lat] = *position;
    if !lng.is_finite() || !lat.is_finite() {
        return Err(PartnerError::invalid_geometry(
            "coordinate is not a finite number",
        ));
    }
    if !(-180.0..=180.0).contains(&lng) {
        return Err(PartnerError::invalid_geometry(format!(
            "longitude {} out of range [-180, 180]",
            lng
        )));
    }
    if !(-90.0..=90.0).contains(&lat) {
        return Err(PartnerError::invalid_geometry(format!(
            "latitude {} out of range [-90, 90]",
            lat
        )));
    }
    Ok(())
}
