use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;
use url::Url;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Config {
    pub boundary: BoundaryConfig,
    pub geocoder: GeocoderConfig,
    pub cache: CacheConfig,
    pub debounce: DebounceConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct BoundaryConfig {
    /// Mirrors tried in order; the first healthy one wins
    pub mirrors: Vec<String>,
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub attempt_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GeocoderConfig {
    pub base_url: String,
    /// Without a token the fallback path yields no results
    pub access_token: Option<String>,
    /// ISO country code restriction for reverse lookups
    pub country: String,
    /// Human-readable country suffix for display names
    pub country_label: String,
    pub max_samples: usize,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DebounceConfig {
    pub quiet_window_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            boundary: BoundaryConfig::default(),
            geocoder: GeocoderConfig::default(),
            cache: CacheConfig::default(),
            debounce: DebounceConfig::default(),
        }
    }
}

impl Default for BoundaryConfig {
    fn default() -> Self {
        Self {
            mirrors: vec![
                "https://overpass-api.de/api/interpreter".to_string(),
                "https://overpass.kumi.systems/api/interpreter".to_string(),
                "https://maps.mail.ru/osm/tools/overpass/api/interpreter".to_string(),
            ],
            max_retries: 2,
            base_delay_ms: 1_000,
            max_delay_ms: 5_000,
            attempt_timeout_secs: 20,
        }
    }
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.mapbox.com/geocoding/v5/mapbox.places".to_string(),
            access_token: None,
            country: "au".to_string(),
            country_label: "Australia".to_string(),
            max_samples: 12,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_secs: 300 }
    }
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            quiet_window_ms: 1_000,
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        config.validate()?;
        Ok(config)
    }

    /// Reject unusable endpoint URLs up front rather than at first request
    pub fn validate(&self) -> Result<()> {
        if self.boundary.mirrors.is_empty() {
            anyhow::bail!("at least one boundary mirror is required");
        }
        for mirror in &self.boundary.mirrors {
            Url::parse(mirror).with_context(|| format!("invalid mirror URL: {mirror}"))?;
        }
        Url::parse(&self.geocoder.base_url)
            .with_context(|| format!("invalid geocoder URL: {}", self.geocoder.base_url))?;
        Ok(())
    }
}

impl BoundaryConfig {
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }

    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_secs(self.attempt_timeout_secs)
    }
}
