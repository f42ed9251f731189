//! Spatial relationship between candidate geometry and the coverage circle.

use geo::{Area, BooleanOps, Contains, Distance, Haversine, Intersects};
use geo_types::Polygon;

use crate::models::{LatLng, OverlapKind};

/// Interior-overlap areas below this are boundary touches, not overlap
const MIN_OVERLAP_AREA: f64 = 1e-12;

/// Classify a candidate polygon against the circle polygon.
///
/// Evaluated in strict priority order — containment first, then interior
/// overlap, then boundary intersection — so a candidate can never be
/// classified two ways. `None` excludes the candidate entirely.
pub fn classify_overlap(circle: &Polygon<f64>, candidate: &Polygon<f64>) -> Option<OverlapKind> {
    if circle.contains(candidate) {
        return Some(OverlapKind::FullyContained);
    }
    if candidate.contains(circle) {
        return Some(OverlapKind::ContainsCircle);
    }
    if !circle.intersects(candidate) {
        return None;
    }
    // Interiors overlapping vs a mere boundary touch
    let shared = circle.intersection(candidate);
    if shared.unsigned_area() > MIN_OVERLAP_AREA {
        Some(OverlapKind::Overlaps)
    } else {
        Some(OverlapKind::Intersects)
    }
}

/// Point-only candidates: in range or excluded
pub fn classify_point(center: LatLng, point: LatLng, radius_km: f64) -> Option<OverlapKind> {
    if distance_km(center, point) <= radius_km {
        Some(OverlapKind::PointInRadius)
    } else {
        None
    }
}

/// Geodesic distance in kilometers
pub fn distance_km(a: LatLng, b: LatLng) -> f64 {
    Haversine.distance(a.to_point(), b.to_point()) / 1000.0
}
