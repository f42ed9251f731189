//! Coverage orchestration: cache, primary boundary pipeline, fallback.

mod debounce;

pub use debounce::{DebounceController, LocationId, ResolveOutcome, ResolvePhase};

use geo::Centroid;
use tracing::{debug, info, warn};

use crate::boundary::{BoundaryClient, BoundaryElement, RetryPolicy};
use crate::cache::{CacheKey, CoverageCache};
use crate::config::Config;
use crate::fallback::FallbackResolver;
use crate::geocode::GeocodingClient;
use crate::geometry::{
    circle_polygon, classify_overlap, classify_point, distance_km, element_polygon,
    DEFAULT_SEGMENTS,
};
use crate::merge::dedupe_and_rank;
use crate::models::{Confidence, Coverage, CoverageSource, LatLng, ResolvedLocality};
use crate::names::is_likely_suburb;

/// Top-level resolver composing the whole pipeline.
///
/// Infallible by design: upstream failures degrade through retries,
/// mirror failover, and the reverse-geocoding fallback; the worst case is
/// an empty `Unavailable` result, never an error.
pub struct CoverageResolver {
    boundary: BoundaryClient,
    fallback: FallbackResolver,
    cache: CoverageCache,
    country_label: String,
}

impl CoverageResolver {
    pub fn new(config: &Config) -> Self {
        let policy = RetryPolicy {
            max_retries: config.boundary.max_retries,
            base_delay: config.boundary.base_delay(),
            max_delay: config.boundary.max_delay(),
            attempt_timeout: config.boundary.attempt_timeout(),
        };
        let boundary = BoundaryClient::new(config.boundary.mirrors.clone(), policy);
        let geocoder = GeocodingClient::new(
            &config.geocoder.base_url,
            config.geocoder.access_token.clone(),
            &config.geocoder.country,
        );
        Self {
            boundary,
            fallback: FallbackResolver::new(geocoder, config.geocoder.max_samples),
            cache: CoverageCache::new(std::time::Duration::from_secs(config.cache.ttl_secs)),
            country_label: config.geocoder.country_label.clone(),
        }
    }

    /// Resolve the set of localities the circle at `center`/`radius_km`
    /// covers, ordered by distance ascending.
    pub async fn resolve(&self, center: LatLng, radius_km: f64) -> Coverage {
        let key = CacheKey::new(center, radius_km);
        if let Some(hit) = self.cache.get(&key) {
            return hit;
        }

        let fetched = self.boundary.fetch_candidates(center, radius_km).await;
        let fetch_failed = fetched.is_err();

        let mut localities = match fetched {
            Ok(elements) => self.classify_elements(center, radius_km, elements),
            Err(err) => {
                warn!(error = %err, "primary boundary source unavailable");
                Vec::new()
            }
        };

        let mut source = CoverageSource::Authoritative;
        if localities.is_empty() {
            let estimated = self.fallback.resolve(center, radius_km).await;
            if !estimated.is_empty() {
                info!(count = estimated.len(), "using fallback coverage estimate");
                localities = estimated;
                source = CoverageSource::Fallback;
            } else if fetch_failed {
                source = CoverageSource::Unavailable;
            }
        }

        let coverage = Coverage { localities, source };
        // Empty results are cached too, so a dead window is not re-queried
        self.cache.insert(key, coverage.clone());
        coverage
    }

    /// Run each raw element through parse → name filter → overlap
    /// classification; malformed candidates are skipped individually.
    fn classify_elements(
        &self,
        center: LatLng,
        radius_km: f64,
        elements: Vec<BoundaryElement>,
    ) -> Vec<ResolvedLocality> {
        let circle = circle_polygon(center, radius_km, DEFAULT_SEGMENTS);
        let mut localities = Vec::new();

        for element in elements {
            let Some(name) = element.name().map(str::to_string) else {
                continue;
            };
            if !is_likely_suburb(&name) {
                debug!(name = %name, "name rejected as unlikely locality");
                continue;
            }

            let (overlap_kind, centroid) = match element_polygon(&element) {
                Some(polygon) => {
                    let Some(kind) = classify_overlap(&circle, &polygon) else {
                        continue;
                    };
                    let centroid = polygon
                        .centroid()
                        .map(LatLng::from_point)
                        .or_else(|| element.point());
                    let Some(centroid) = centroid else { continue };
                    (kind, centroid)
                }
                None => {
                    let Some(point) = element.point() else { continue };
                    let Some(kind) = classify_point(center, point, radius_km) else {
                        continue;
                    };
                    (kind, point)
                }
            };

            let display_name = match element.postal_code() {
                Some(postcode) => format!("{} {}, {}", name, postcode, self.country_label),
                None => format!("{}, {}", name, self.country_label),
            };

            localities.push(ResolvedLocality {
                normalized_key: ResolvedLocality::normalize_key(&name),
                display_name,
                name,
                centroid,
                distance_km: distance_km(center, centroid),
                overlap_kind,
                confidence: Confidence::Authoritative,
            });
        }

        dedupe_and_rank(localities)
    }
}
