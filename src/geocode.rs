//! Reverse-geocoding client for the fallback path.
//!
//! Talks to a features-style geocoding API (point → named places) with a
//! country restriction. Only reverse lookup is used here; the forward
//! direction belongs to the free-text search collaborator, out of scope.

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::models::LatLng;

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("geocoder returned status {0}")]
    Status(u16),
}

/// A named place returned by the geocoder
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodedFeature {
    /// Short name, e.g. "Brunswick"
    pub text: String,
    /// Full formatted name, e.g. "Brunswick, Victoria 3056, Australia"
    pub place_name: String,
    /// [lng, lat]
    pub center: [f64; 2],
}

impl GeocodedFeature {
    pub fn center_latlng(&self) -> LatLng {
        LatLng::new(self.center[1], self.center[0])
    }
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    features: Vec<GeocodedFeature>,
}

pub struct GeocodingClient {
    client: Client,
    base_url: String,
    access_token: String,
    country: String,
}

impl GeocodingClient {
    /// Returns `None` when no access token is configured — the fallback
    /// path then yields zero results instead of erroring (degraded mode,
    /// observable in logs).
    pub fn new(base_url: &str, access_token: Option<String>, country: &str) -> Option<Self> {
        let access_token = access_token?;
        Some(Self {
            client: Client::builder()
                .user_agent("catchment/0.1 (service-area coverage resolver)")
                .timeout(Duration::from_secs(10))
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token,
            country: country.to_string(),
        })
    }

    /// Reverse lookup: localities at or around `point`
    pub async fn reverse(&self, point: LatLng) -> Result<Vec<GeocodedFeature>, GeocodeError> {
        let url = format!("{}/{},{}.json", self.base_url, point.lng, point.lat);
        debug!(lat = point.lat, lng = point.lng, "reverse geocode lookup");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("types", "locality,neighborhood,place"),
                ("country", self.country.as_str()),
                ("limit", "1"),
                ("access_token", self.access_token.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeocodeError::Status(status.as_u16()));
        }

        let body: GeocodeResponse = response.json().await?;
        Ok(body.features)
    }
}
