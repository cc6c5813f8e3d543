//! Geometry codec: wire geometry to and from the storage encoding.
//!
//! The store keeps geometries in PostGIS `geometry` columns and talks
//! to them as WKT text (`ST_GeomFromText` on the way in, `ST_AsText`
//! on the way out), always SRID 4326. This module converts between
//! the GeoJSON-shaped wire types and that WKT encoding, via
//! `geo-types`. No internal state.

use std::str::FromStr;

use geo_types::{Coord, Geometry, LineString, MultiPolygon, Point, Polygon};
use partner_core::{MultiPolygonGeometry, PartnerError, PartnerResult, PointGeometry, Position};
use wkt::ToWkt;

// ============================================================================
// ENCODE (wire -> WKT)
// ============================================================================

/// Encode a wire point as WKT.
///
/// Fails with `InvalidGeometry` if the point is not structurally
/// valid; never touches the store.
pub fn encode_point(point: &PointGeometry) -> PartnerResult<String> {
    point.validate()?;
    let geom = Point::new(point.longitude(), point.latitude());
    Ok(geom.wkt_string())
}

/// Encode a wire multi-polygon as WKT.
pub fn encode_multi_polygon(region: &MultiPolygonGeometry) -> PartnerResult<String> {
    region.validate()?;

    let polygons: Vec<Polygon<f64>> = region
        .coordinates
        .iter()
        .map(|polygon| {
            let mut rings = polygon.iter().map(|ring| ring_to_line_string(ring));
            // validate() guarantees at least one ring per polygon
            let exterior = rings.next().unwrap_or_else(|| LineString::new(vec![]));
            Polygon::new(exterior, rings.collect())
        })
        .collect();

    Ok(MultiPolygon::new(polygons).wkt_string())
}

fn ring_to_line_string(ring: &[Position]) -> LineString<f64> {
    LineString::from(
        ring.iter()
            .map(|&[x, y]| Coord { x, y })
            .collect::<Vec<Coord<f64>>>(),
    )
}

// ============================================================================
// DECODE (WKT -> wire)
// ============================================================================

/// Decode WKT returned by the store into a wire point.
pub fn decode_point(wkt: &str) -> PartnerResult<PointGeometry> {
    match parse_wkt(wkt)? {
        Geometry::Point(point) => Ok(PointGeometry::new(point.x(), point.y())),
        other => Err(PartnerError::invalid_geometry(format!(
            "expected POINT, got {}",
            geometry_kind(&other)
        ))),
    }
}

/// Decode WKT returned by the store into a wire multi-polygon.
pub fn decode_multi_polygon(wkt: &str) -> PartnerResult<MultiPolygonGeometry> {
    match parse_wkt(wkt)? {
        Geometry::MultiPolygon(region) => Ok(multi_polygon_to_wire(&region)),
        // PostGIS may hand back a bare POLYGON for single-polygon
        // regions; promote it to keep the wire type stable.
        Geometry::Polygon(polygon) => {
            Ok(multi_polygon_to_wire(&MultiPolygon::new(vec![polygon])))
        }
        other => Err(PartnerError::invalid_geometry(format!(
            "expected MULTIPOLYGON, got {}",
            geometry_kind(&other)
        ))),
    }
}

/// Build a geo-types multi-polygon from wire coordinates.
///
/// Used by the in-memory store for containment tests; shares the ring
/// handling with [`encode_multi_polygon`].
pub fn wire_to_multi_polygon(region: &MultiPolygonGeometry) -> PartnerResult<MultiPolygon<f64>> {
    region.validate()?;
    let polygons = region
        .coordinates
        .iter()
        .map(|polygon| {
            let mut rings = polygon.iter().map(|ring| ring_to_line_string(ring));
            let exterior = rings.next().unwrap_or_else(|| LineString::new(vec![]));
            Polygon::new(exterior, rings.collect())
        })
        .collect();
    Ok(MultiPolygon::new(polygons))
}

fn multi_polygon_to_wire(region: &MultiPolygon<f64>) -> MultiPolygonGeometry {
    let coordinates = region
        .iter()
        .map(|polygon| {
            std::iter::once(polygon.exterior())
                .chain(polygon.interiors().iter())
                .map(line_string_to_ring)
                .collect()
        })
        .collect();
    MultiPolygonGeometry::new(coordinates)
}

fn line_string_to_ring(ring: &LineString<f64>) -> Vec<Position> {
    ring.coords().map(|c| [c.x, c.y]).collect()
}

/// Parse a WKT string into a geo-types geometry.
fn parse_wkt(wkt: &str) -> PartnerResult<Geometry<f64>> {
    wkt::Wkt::from_str(wkt)
        .map_err(|e| PartnerError::invalid_geometry(format!("WKT parse failed: {:?}", e)))
        .and_then(|w| {
            w.try_into().map_err(|e: wkt::conversion::Error| {
                PartnerError::invalid_geometry(format!("WKT conversion failed: {:?}", e))
            })
        })
}

fn geometry_kind(geom: &Geometry<f64>) -> &'static str {
    match geom {
        Geometry::Point(_) => "POINT",
        Geometry::Line(_) | Geometry::LineString(_) => "LINESTRING",
        Geometry::Polygon(_) | Geometry::Rect(_) | Geometry::Triangle(_) => "POLYGON",
        Geometry::MultiPoint(_) => "MULTIPOINT",
        Geometry::MultiLineString(_) => "MULTILINESTRING",
        Geometry::MultiPolygon(_) => "MULTIPOLYGON",
        Geometry::GeometryCollection(_) => "GEOMETRYCOLLECTION",
    }
}
