//! Degraded-mode resolution by grid sampling and reverse geocoding.
//!
//! Invoked only when the primary boundary pipeline yields nothing. Trades
//! boundary precision for a guaranteed best-effort answer: sample points
//! across the circle, reverse-geocode each, and tag everything that comes
//! back as a lower-confidence estimate.

use futures::stream::{self, StreamExt};
use tracing::{debug, warn};

use crate::geocode::GeocodingClient;
use crate::geometry::distance_km;
use crate::merge::dedupe_and_rank;
use crate::models::{Confidence, LatLng, OverlapKind, ResolvedLocality};

/// Reverse lookups in flight at once. A bounded batch, unlike the
/// boundary client's strictly sequential mirror attempts.
const LOOKUP_CONCURRENCY: usize = 4;

/// Kilometers per degree of latitude (flat-earth approximation)
const KM_PER_DEGREE: f64 = 111.32;

pub struct FallbackResolver {
    geocoder: Option<GeocodingClient>,
    max_samples: usize,
}

impl FallbackResolver {
    pub fn new(geocoder: Option<GeocodingClient>, max_samples: usize) -> Self {
        Self {
            geocoder,
            max_samples,
        }
    }

    /// Best-effort localities inside the circle. Per-sample failures are
    /// skipped; a missing geocoder credential yields an empty result.
    pub async fn resolve(&self, center: LatLng, radius_km: f64) -> Vec<ResolvedLocality> {
        let Some(geocoder) = &self.geocoder else {
            warn!("no geocoder credential configured, fallback resolution yields nothing");
            return Vec::new();
        };

        let samples = sample_points(center, radius_km, self.max_samples);
        debug!(
            count = samples.len(),
            radius_km, "issuing fallback reverse lookups"
        );

        let features: Vec<_> = stream::iter(samples)
            .map(|point| async move {
                match geocoder.reverse(point).await {
                    Ok(features) => features,
                    Err(err) => {
                        warn!(error = %err, "reverse lookup failed, skipping sample");
                        Vec::new()
                    }
                }
            })
            .buffer_unordered(LOOKUP_CONCURRENCY)
            .collect::<Vec<_>>()
            .await
            .into_iter()
            .flatten()
            .collect();

        let localities = features
            .into_iter()
            .filter_map(|feature| {
                let centroid = feature.center_latlng();
                let distance = distance_km(center, centroid);
                if distance > radius_km {
                    return None;
                }
                Some(ResolvedLocality {
                    normalized_key: ResolvedLocality::normalize_key(&feature.text),
                    display_name: feature.place_name,
                    name: feature.text,
                    centroid,
                    distance_km: distance,
                    overlap_kind: OverlapKind::FallbackEstimate,
                    confidence: Confidence::Fallback,
                })
            })
            .collect();

        dedupe_and_rank(localities)
    }
}

/// Sample grid: the center plus concentric rings. Ring count and points
/// per ring scale with the radius; points outside the circle are dropped
/// and the total is capped at `max_samples`.
pub fn sample_points(center: LatLng, radius_km: f64, max_samples: usize) -> Vec<LatLng> {
    let ring_count = ((radius_km / 4.0).ceil() as usize).clamp(1, 3);
    let lat_cos = center.lat.to_radians().cos();

    let mut points = vec![center];
    for ring in 1..=ring_count {
        let ring_radius = radius_km * (ring as f64) / (ring_count as f64 + 0.5);
        let point_count = 4 + 2 * ring;
        for i in 0..point_count {
            let theta = 2.0 * std::f64::consts::PI * (i as f64) / (point_count as f64);
            points.push(LatLng::new(
                center.lat + (ring_radius / KM_PER_DEGREE) * theta.sin(),
                center.lng + (ring_radius / (KM_PER_DEGREE * lat_cos)) * theta.cos(),
            ));
        }
    }

    points.retain(|p| distance_km(center, *p) <= radius_km);
    points.truncate(max_samples);
    points
}

#[cfg(test)]
mod tests {
    use super::*;

    const MELBOURNE: LatLng = LatLng {
        lat: -37.8136,
        lng: 144.9631,
    };

    #[test]
    fn samples_stay_inside_the_circle_and_cap() {
        for radius_km in [1.0, 5.0, 15.0] {
            let samples = sample_points(MELBOURNE, radius_km, 12);
            assert!(!samples.is_empty());
            assert!(samples.len() <= 12);
            for p in &samples {
                assert!(distance_km(MELBOURNE, *p) <= radius_km + 1e-9);
            }
        }
    }

    #[test]
    fn first_sample_is_the_center() {
        let samples = sample_points(MELBOURNE, 10.0, 12);
        assert_eq!(samples[0], MELBOURNE);
    }

    #[test]
    fn larger_radii_sample_more_rings() {
        let small = sample_points(MELBOURNE, 2.0, 100);
        let large = sample_points(MELBOURNE, 12.0, 100);
        assert!(large.len() > small.len());
    }

    #[tokio::test]
    async fn missing_credential_resolves_to_empty() {
        let resolver = FallbackResolver::new(None, 12);
        let localities = resolver.resolve(MELBOURNE, 10.0).await;
        assert!(localities.is_empty());
    }
}
