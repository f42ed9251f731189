//! Localities resolved against a coverage circle.

use geo_types::Point;
use serde::{Deserialize, Serialize};

/// Geographic point (lat/lng, WGS84)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Validate WGS84 range
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }

    /// Convert to a geo point (x = lng, y = lat)
    pub fn to_point(self) -> Point<f64> {
        Point::new(self.lng, self.lat)
    }

    pub fn from_point(p: Point<f64>) -> Self {
        Self {
            lat: p.y(),
            lng: p.x(),
        }
    }
}

/// Spatial relationship between a candidate locality and the coverage circle.
///
/// Decided by a fixed priority order (containment before overlap before
/// boundary intersection) so a candidate is never classified two ways.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlapKind {
    /// Candidate polygon lies entirely within the circle
    FullyContained,
    /// Candidate polygon contains the whole circle
    ContainsCircle,
    /// Interiors overlap without either containing the other
    Overlaps,
    /// Boundaries touch without interior overlap
    Intersects,
    /// Point-only candidate within the radius
    PointInRadius,
    /// Produced by the reverse-geocoding fallback, no boundary geometry
    FallbackEstimate,
}

/// How trustworthy the locality's geometry classification is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    /// Derived from authoritative boundary data
    Authoritative,
    /// Estimated via reverse-geocoded sample points
    Fallback,
}

/// A named locality covered (wholly or partly) by the coverage circle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedLocality {
    pub name: String,
    /// Lowercased, trimmed name used for deduplication
    pub normalized_key: String,
    /// Name plus optional postal code and country label
    pub display_name: String,
    pub centroid: LatLng,
    pub distance_km: f64,
    pub overlap_kind: OverlapKind,
    pub confidence: Confidence,
}

impl ResolvedLocality {
    pub fn normalize_key(name: &str) -> String {
        name.trim().to_lowercase()
    }
}

/// Which path produced a coverage result.
///
/// Lets callers tell "the source answered and nothing is here"
/// (`Authoritative` with an empty list) apart from "every data source
/// failed" (`Unavailable`), e.g. to offer a retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoverageSource {
    Authoritative,
    Fallback,
    Unavailable,
}

/// Final output of a coverage resolution, ordered by distance ascending.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coverage {
    pub localities: Vec<ResolvedLocality>,
    pub source: CoverageSource,
}

impl Coverage {
    pub fn unavailable() -> Self {
        Self {
            localities: Vec::new(),
            source: CoverageSource::Unavailable,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.localities.is_empty()
    }
}
