//! Polygon approximation of a geodesic circle.

use geo_types::{Coord, LineString, Polygon};

use crate::models::LatLng;

/// Default vertex count for the coverage circle ring
pub const DEFAULT_SEGMENTS: usize = 64;

/// Kilometers per degree of latitude (flat-earth approximation)
const KM_PER_DEGREE: f64 = 111.32;

/// Build a closed ring of `segments` equally-angled vertices at
/// `radius_km` from `center`.
///
/// Uses a flat-earth degree offset (1/111.32 degrees per km, longitude
/// scaled by cos(lat)). Accurate only for small-to-moderate radii at
/// mid-latitudes; this is a known precision limit of the design, kept
/// deliberately in favor of simplicity.
pub fn circle_ring(center: LatLng, radius_km: f64, segments: usize) -> LineString<f64> {
    let lat_span = radius_km / KM_PER_DEGREE;
    let lng_span = radius_km / (KM_PER_DEGREE * center.lat.to_radians().cos());

    let mut coords = Vec::with_capacity(segments + 1);
    for i in 0..segments {
        let theta = 2.0 * std::f64::consts::PI * (i as f64) / (segments as f64);
        coords.push(Coord {
            x: center.lng + lng_span * theta.cos(),
            y: center.lat + lat_span * theta.sin(),
        });
    }
    // Close the ring
    coords.push(coords[0]);

    LineString::new(coords)
}

/// The coverage circle as a polygon for set-relationship tests
pub fn circle_polygon(center: LatLng, radius_km: f64, segments: usize) -> Polygon<f64> {
    Polygon::new(circle_ring(center, radius_km, segments), vec![])
}
