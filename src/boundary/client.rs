//! Boundary query client over prioritized mirrors.

use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::policy::{run_with_policy, RetryPolicy};
use crate::models::LatLng;

/// Buffer applied to the query radius so edge-straddling boundaries are
/// returned by the source and left to the overlap classifier to decide
const RADIUS_BUFFER: f64 = 1.2;

#[derive(Debug, Error)]
pub enum BoundaryError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("mirror returned status {0}")]
    Status(u16),
    #[error("mirror reported overload")]
    Overloaded,
    #[error("malformed response: {0}")]
    Deserialize(String),
    #[error("all boundary mirrors exhausted")]
    MirrorsExhausted,
}

impl BoundaryError {
    /// Transient failures are retried, then failed over; the rest are not —
    /// retrying malformed input or a rejected query cannot help.
    pub fn is_transient(&self) -> bool {
        match self {
            BoundaryError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            BoundaryError::Status(code) => *code >= 500 || *code == 429,
            BoundaryError::Overloaded => true,
            BoundaryError::Deserialize(_) | BoundaryError::MirrorsExhausted => false,
        }
    }
}

/// Raw element type from the boundary source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Node,
    Way,
    Relation,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ElementVertex {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ElementMember {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub geometry: Vec<ElementVertex>,
}

/// One raw element from the boundary source. Transient: parsed into a
/// candidate polygon or point, classified, then discarded.
#[derive(Debug, Clone, Deserialize)]
pub struct BoundaryElement {
    #[serde(rename = "type")]
    pub kind: ElementKind,
    pub id: i64,
    #[serde(default)]
    pub tags: HashMap<String, String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub center: Option<ElementVertex>,
    #[serde(default)]
    pub geometry: Vec<ElementVertex>,
    #[serde(default)]
    pub members: Vec<ElementMember>,
}

impl BoundaryElement {
    /// Source identifier: "{kind}/{id}"
    pub fn source_id(&self) -> String {
        let kind = match self.kind {
            ElementKind::Node => "node",
            ElementKind::Way => "way",
            ElementKind::Relation => "relation",
        };
        format!("{}/{}", kind, self.id)
    }

    pub fn name(&self) -> Option<&str> {
        self.tags.get("name").map(String::as_str)
    }

    pub fn postal_code(&self) -> Option<&str> {
        self.tags
            .get("postal_code")
            .or_else(|| self.tags.get("addr:postcode"))
            .map(String::as_str)
    }

    /// Representative point: own coordinates for nodes, source-supplied
    /// center otherwise
    pub fn point(&self) -> Option<LatLng> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Some(LatLng::new(lat, lon)),
            _ => self.center.map(|c| LatLng::new(c.lat, c.lon)),
        }
    }
}

#[derive(Debug, Deserialize)]
struct BoundaryResponse {
    #[serde(default)]
    elements: Vec<BoundaryElement>,
    /// Set by the source when a query was cut short (e.g. overload)
    remark: Option<String>,
}

/// Queries locality nodes and administrative boundaries near a point.
///
/// Mirrors are tried strictly in order, each under the retry policy;
/// attempts are never issued in parallel so a degraded mirror fleet is
/// not amplified into an outage.
pub struct BoundaryClient {
    client: Client,
    mirrors: Vec<String>,
    policy: RetryPolicy,
}

impl BoundaryClient {
    pub fn new(mirrors: Vec<String>, policy: RetryPolicy) -> Self {
        Self {
            client: Client::builder()
                .user_agent("catchment/0.1 (service-area coverage resolver)")
                .timeout(policy.attempt_timeout)
                .build()
                .expect("Failed to create HTTP client"),
            mirrors,
            policy,
        }
    }

    /// Fetch raw boundary elements around `center`.
    ///
    /// `Err(MirrorsExhausted)` means every mirror failed — a non-fatal
    /// signal the orchestrator maps to the fallback path, never surfaced
    /// to callers as an error.
    pub async fn fetch_candidates(
        &self,
        center: LatLng,
        radius_km: f64,
    ) -> Result<Vec<BoundaryElement>, BoundaryError> {
        let query = build_query(center, radius_km, self.policy.attempt_timeout);

        for mirror in &self.mirrors {
            let result = run_with_policy(&self.policy, || self.attempt(mirror, &query)).await;
            match result {
                Ok(elements) => {
                    info!(
                        mirror = %mirror,
                        count = elements.len(),
                        "boundary query succeeded"
                    );
                    return Ok(elements);
                }
                Err(err) => {
                    warn!(mirror = %mirror, error = %err, "mirror exhausted, failing over");
                }
            }
        }

        Err(BoundaryError::MirrorsExhausted)
    }

    async fn attempt(
        &self,
        mirror: &str,
        query: &str,
    ) -> Result<Vec<BoundaryElement>, BoundaryError> {
        debug!(mirror = %mirror, "issuing boundary query");

        let response = self
            .client
            .post(mirror)
            .form(&[("data", query)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(BoundaryError::Status(status.as_u16()));
        }

        let body: BoundaryResponse = response
            .json()
            .await
            .map_err(|e| BoundaryError::Deserialize(e.to_string()))?;

        if let Some(remark) = &body.remark {
            let lowered = remark.to_lowercase();
            if lowered.contains("load") || lowered.contains("timed out") {
                return Err(BoundaryError::Overloaded);
            }
        }

        Ok(body.elements)
    }
}

/// Spatial query for place/locality nodes and postal-coded administrative
/// boundaries within the buffered radius
fn build_query(center: LatLng, radius_km: f64, timeout: Duration) -> String {
    let radius_m = (radius_km * RADIUS_BUFFER * 1000.0).round() as i64;
    format!(
        "[out:json][timeout:{timeout}];\
         (\
           node[\"place\"~\"^(suburb|neighbourhood|quarter|town|village|hamlet)$\"](around:{r},{lat},{lng});\
           relation[\"boundary\"=\"administrative\"][\"postal_code\"](around:{r},{lat},{lng});\
           relation[\"place\"~\"^(suburb|neighbourhood)$\"](around:{r},{lat},{lng});\
         );\
         out tags center geom;",
        timeout = timeout.as_secs(),
        r = radius_m,
        lat = center.lat,
        lng = center.lng,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_buffers_the_radius() {
        let q = build_query(
            LatLng::new(-37.8136, 144.9631),
            10.0,
            Duration::from_secs(20),
        );
        assert!(q.contains("around:12000"));
        assert!(q.contains("[timeout:20]"));
        assert!(q.contains("postal_code"));
    }

    #[test]
    fn element_point_prefers_own_coordinates() {
        let node = BoundaryElement {
            kind: ElementKind::Node,
            id: 1,
            tags: HashMap::new(),
            lat: Some(-37.8),
            lon: Some(144.9),
            center: Some(ElementVertex { lat: 0.0, lon: 0.0 }),
            geometry: vec![],
            members: vec![],
        };
        let p = node.point().unwrap();
        assert_eq!(p.lat, -37.8);
        assert_eq!(node.source_id(), "node/1");
    }

    #[test]
    fn transient_classification() {
        assert!(BoundaryError::Status(503).is_transient());
        assert!(BoundaryError::Status(429).is_transient());
        assert!(BoundaryError::Overloaded.is_transient());
        assert!(!BoundaryError::Status(404).is_transient());
        assert!(!BoundaryError::Deserialize("bad".into()).is_transient());
    }

    #[test]
    fn postal_code_falls_back_to_addr_tag() {
        let mut tags = HashMap::new();
        tags.insert("addr:postcode".to_string(), "3056".to_string());
        let el = BoundaryElement {
            kind: ElementKind::Relation,
            id: 2,
            tags,
            lat: None,
            lon: None,
            center: None,
            geometry: vec![],
            members: vec![],
        };
        assert_eq!(el.postal_code(), Some("3056"));
    }
}
