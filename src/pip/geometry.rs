//! Exact point-in-polygon tests and basic geometry validation.
//!
//! Containment is boundary-exclusive: a point lying on any ring edge or
//! vertex is reported as [`Location::Boundary`] and is *not* contained.
//! Each test is O(v) in the number of vertices of the region.

use geo::algorithm::validation::InvalidPolygon;
use geo::{Coord, LineString, MultiPolygon, Polygon, Validation};
use thiserror::Error;

/// Where a coordinate lies relative to a geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Inside,
    Boundary,
    Outside,
}

/// Reasons a region boundary is unusable for containment testing
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("boundary has no polygons")]
    EmptyBoundary,
    #[error("polygon {polygon} ring {ring} has {count} coordinates, need at least 4")]
    TooFewCoordinates {
        polygon: usize,
        ring: usize,
        count: usize,
    },
    #[error("polygon {polygon} ring {ring} is not closed")]
    OpenRing { polygon: usize, ring: usize },
    #[error("polygon {polygon} ring {ring} has a non-finite coordinate")]
    NonFiniteCoordinate { polygon: usize, ring: usize },
    #[error("polygon {polygon} has zero area")]
    ZeroArea { polygon: usize },
    #[error("polygon {polygon} has a self-intersecting ring")]
    SelfIntersection { polygon: usize },
    #[error("polygon {polygon} is invalid: {reason}")]
    InvalidRings { polygon: usize, reason: String },
}

/// Check that every ring is closed, finite and long enough, that every
/// exterior ring encloses a non-zero area, and that each polygon is valid in
/// the OGC sense (no self-intersecting or crossing rings, holes inside the
/// exterior). Overlap between polygons of one boundary is allowed.
pub fn validate(boundary: &MultiPolygon<f64>) -> Result<(), GeometryError> {
    if boundary.0.is_empty() {
        return Err(GeometryError::EmptyBoundary);
    }

    for (pi, polygon) in boundary.0.iter().enumerate() {
        let rings = std::iter::once(polygon.exterior()).chain(polygon.interiors());
        for (ri, ring) in rings.enumerate() {
            validate_ring(ring, pi, ri)?;
        }
        if signed_area(polygon.exterior()) == 0.0 {
            return Err(GeometryError::ZeroArea { polygon: pi });
        }
        match polygon.check_validation() {
            Ok(()) => {}
            Err(InvalidPolygon::SelfIntersection(_)) => {
                return Err(GeometryError::SelfIntersection { polygon: pi });
            }
            Err(other) => {
                return Err(GeometryError::InvalidRings {
                    polygon: pi,
                    reason: other.to_string(),
                });
            }
        }
    }

    Ok(())
}

fn validate_ring(
    ring: &LineString<f64>,
    polygon: usize,
    index: usize,
) -> Result<(), GeometryError> {
    let coords = &ring.0;
    if coords.len() < 4 {
        return Err(GeometryError::TooFewCoordinates {
            polygon,
            ring: index,
            count: coords.len(),
        });
    }
    if coords.iter().any(|c| !c.x.is_finite() || !c.y.is_finite()) {
        return Err(GeometryError::NonFiniteCoordinate {
            polygon,
            ring: index,
        });
    }
    if coords.first() != coords.last() {
        return Err(GeometryError::OpenRing {
            polygon,
            ring: index,
        });
    }
    Ok(())
}

/// Shoelace area; positive for counter-clockwise rings
fn signed_area(ring: &LineString<f64>) -> f64 {
    let twice: f64 = ring
        .0
        .windows(2)
        .map(|w| w[0].x * w[1].y - w[1].x * w[0].y)
        .sum();
    twice / 2.0
}

/// Boundary-exclusive containment: true only for [`Location::Inside`].
pub fn contains(boundary: &MultiPolygon<f64>, coord: Coord<f64>) -> bool {
    locate(boundary, coord) == Location::Inside
}

/// Locate a coordinate against a multipolygon, treated as the union of its
/// polygons.
pub fn locate(boundary: &MultiPolygon<f64>, coord: Coord<f64>) -> Location {
    let mut on_boundary = false;
    for polygon in &boundary.0 {
        match locate_in_polygon(polygon, coord) {
            Location::Inside => return Location::Inside,
            Location::Boundary => on_boundary = true,
            Location::Outside => {}
        }
    }
    if on_boundary {
        Location::Boundary
    } else {
        Location::Outside
    }
}

/// Locate a coordinate against one polygon; holes subtract from the exterior.
pub fn locate_in_polygon(polygon: &Polygon<f64>, coord: Coord<f64>) -> Location {
    match locate_in_ring(polygon.exterior(), coord) {
        Location::Inside => {}
        other => return other,
    }
    for hole in polygon.interiors() {
        match locate_in_ring(hole, coord) {
            Location::Inside => return Location::Outside,
            Location::Boundary => return Location::Boundary,
            Location::Outside => {}
        }
    }
    Location::Inside
}

/// Even-odd ray casting along +x, with an exact on-edge check first.
///
/// An unclosed ring is treated as if closed.
pub fn locate_in_ring(ring: &LineString<f64>, p: Coord<f64>) -> Location {
    let coords = &ring.0;
    if coords.len() < 2 {
        return Location::Outside;
    }

    let closing = match (coords.first(), coords.last()) {
        (Some(first), Some(last)) if first != last => Some((*last, *first)),
        _ => None,
    };

    let mut inside = false;
    let edges = coords.windows(2).map(|w| (w[0], w[1])).chain(closing);
    for (a, b) in edges {
        if on_segment(p, a, b) {
            return Location::Boundary;
        }
        if (a.y > p.y) != (b.y > p.y) {
            let x_cross = a.x + (p.y - a.y) * (b.x - a.x) / (b.y - a.y);
            if p.x < x_cross {
                inside = !inside;
            }
        }
    }

    if inside {
        Location::Inside
    } else {
        Location::Outside
    }
}

fn on_segment(p: Coord<f64>, a: Coord<f64>, b: Coord<f64>) -> bool {
    let cross = (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x);
    if cross != 0.0 {
        return false;
    }
    p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x) && p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y)
}
