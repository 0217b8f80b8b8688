//! Geometry helpers shared by tracts and target units.
//!
//! Coordinates are `(longitude, latitude)` in degrees and are never reprojected.
//! Only the exterior ring of a polygon takes part in aggregation; interior rings
//! (holes) are carried along but ignored.

use geo::{BoundingRect, Centroid, Coord, LineString, Polygon};

use crate::error::{AggregationError, Result, UnitKind};

/// Axis-aligned bounding box in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BBox {
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        }
    }

    pub fn width(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    pub fn height(&self) -> f64 {
        self.max_lat - self.min_lat
    }
}

/// Build a polygon from a single outer ring of `(lon, lat)` pairs.
pub fn polygon_from_ring(ring: &[(f64, f64)]) -> Polygon<f64> {
    let coords: Vec<Coord<f64>> = ring.iter().map(|&(x, y)| Coord { x, y }).collect();
    Polygon::new(LineString::new(coords), vec![])
}

/// Number of distinct ring positions, not counting a closing vertex equal to the first.
pub fn vertex_count(ring: &LineString<f64>) -> usize {
    let n = ring.0.len();
    if n > 1 && ring.0.first() == ring.0.last() {
        n - 1
    } else {
        n
    }
}

/// Reject structurally invalid outer rings.
///
/// An empty outer ring is accepted; it simply covers nothing. Holes are not
/// inspected.
pub fn validate_polygon(polygon: &Polygon<f64>, kind: UnitKind, id: &str) -> Result<()> {
    let ring = polygon.exterior();

    if let Some(index) = ring
        .0
        .iter()
        .position(|c| !c.x.is_finite() || !c.y.is_finite())
    {
        return Err(AggregationError::InvalidCoordinate {
            kind,
            id: id.to_string(),
            index,
        });
    }

    let vertices = vertex_count(ring);
    if vertices > 0 && vertices < 3 {
        return Err(AggregationError::InvalidRing {
            kind,
            id: id.to_string(),
            vertices,
        });
    }

    Ok(())
}

/// Bounding box of the outer ring, `None` when the ring is empty
pub fn ring_bbox(polygon: &Polygon<f64>) -> Option<BBox> {
    polygon
        .exterior()
        .bounding_rect()
        .map(|rect| BBox::new(rect.min().x, rect.min().y, rect.max().x, rect.max().y))
}

/// Area centroid of the outer ring.
///
/// Zero-area rings fall back to the centroid of their vertices (handled by `geo`).
pub fn ring_centroid(polygon: &Polygon<f64>) -> Option<Coord<f64>> {
    let outer = Polygon::new(polygon.exterior().clone(), vec![]);
    outer.centroid().map(|p| p.0)
}
