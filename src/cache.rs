//! Short-TTL cache for resolved coverage, keyed by rounded center plus
//! radius. Staleness is checked lazily at read time; there is no
//! background sweep.

use hashbrown::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::models::{Coverage, LatLng};

/// Cache key: center rounded to 4 decimal places (~11 m), radius in whole
/// meters. Rounding raises the hit rate for near-identical repeated
/// queries, e.g. re-renders after a marker nudge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    lat_e4: i64,
    lng_e4: i64,
    radius_m: u64,
}

impl CacheKey {
    pub fn new(center: LatLng, radius_km: f64) -> Self {
        Self {
            lat_e4: (center.lat * 1e4).round() as i64,
            lng_e4: (center.lng * 1e4).round() as i64,
            radius_m: (radius_km * 1000.0).round() as u64,
        }
    }
}

struct CacheEntry {
    coverage: Coverage,
    created_at: Instant,
}

/// TTL cache over resolved coverage; safe to share behind `&self`.
pub struct CoverageCache {
    ttl: Duration,
    entries: Mutex<HashMap<CacheKey, CacheEntry>>,
}

impl CoverageCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, key: &CacheKey) -> Option<Coverage> {
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        match entries.get(key) {
            Some(entry) if entry.created_at.elapsed() < self.ttl => {
                debug!(?key, "coverage cache hit");
                Some(entry.coverage.clone())
            }
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Insert or supersede the entry for `key`
    pub fn insert(&self, key: CacheKey, coverage: Coverage) {
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        entries.insert(
            key,
            CacheEntry {
                coverage,
                created_at: Instant::now(),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.lock().expect("cache lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CoverageSource;

    fn coverage() -> Coverage {
        Coverage {
            localities: vec![],
            source: CoverageSource::Authoritative,
        }
    }

    #[test]
    fn rounding_collapses_near_identical_keys() {
        let a = CacheKey::new(LatLng::new(-37.81361, 144.96312), 10.0);
        let b = CacheKey::new(LatLng::new(-37.81359, 144.96308), 10.0);
        assert_eq!(a, b);

        let c = CacheKey::new(LatLng::new(-37.8200, 144.9631), 10.0);
        assert_ne!(a, c);
    }

    #[test]
    fn entries_expire_lazily() {
        let cache = CoverageCache::new(Duration::from_millis(0));
        let key = CacheKey::new(LatLng::new(-37.8136, 144.9631), 10.0);
        cache.insert(key, coverage());
        assert!(cache.get(&key).is_none());
        // Stale entry was removed on read
        assert!(cache.is_empty());
    }

    #[test]
    fn fresh_entries_hit() {
        let cache = CoverageCache::new(Duration::from_secs(300));
        let key = CacheKey::new(LatLng::new(-37.8136, 144.9631), 10.0);
        assert!(cache.get(&key).is_none());
        cache.insert(key, coverage());
        assert!(cache.get(&key).is_some());
    }

    #[test]
    fn same_key_is_superseded() {
        let cache = CoverageCache::new(Duration::from_secs(300));
        let key = CacheKey::new(LatLng::new(-37.8136, 144.9631), 10.0);
        cache.insert(key, coverage());
        let mut newer = coverage();
        newer.source = CoverageSource::Fallback;
        cache.insert(key, newer);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&key).unwrap().source, CoverageSource::Fallback);
    }
}
