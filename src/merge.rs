//! Deduplication and ranking of resolved localities.

use hashbrown::HashMap;

use crate::models::ResolvedLocality;

/// Merge duplicates by normalized key — keeping the entry with the
/// smallest distance — and sort ascending by distance.
pub fn dedupe_and_rank(candidates: Vec<ResolvedLocality>) -> Vec<ResolvedLocality> {
    let mut best: HashMap<String, ResolvedLocality> = HashMap::new();

    for candidate in candidates {
        match best.get(&candidate.normalized_key) {
            Some(existing) if existing.distance_km <= candidate.distance_km => {}
            _ => {
                best.insert(candidate.normalized_key.clone(), candidate);
            }
        }
    }

    let mut merged: Vec<ResolvedLocality> = best.into_values().collect();
    merged.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Confidence, LatLng, OverlapKind};

    fn locality(name: &str, distance_km: f64) -> ResolvedLocality {
        ResolvedLocality {
            name: name.to_string(),
            normalized_key: ResolvedLocality::normalize_key(name),
            display_name: name.to_string(),
            centroid: LatLng::new(0.0, 0.0),
            distance_km,
            overlap_kind: OverlapKind::FullyContained,
            confidence: Confidence::Authoritative,
        }
    }

    #[test]
    fn duplicates_keep_minimum_distance() {
        let merged = dedupe_and_rank(vec![
            locality("Brunswick", 4.2),
            locality("brunswick ", 1.3),
            locality("Brunswick", 2.8),
        ]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].distance_km, 1.3);
    }

    #[test]
    fn no_two_entries_share_a_key() {
        let merged = dedupe_and_rank(vec![
            locality("Carlton", 2.0),
            locality("Fitzroy", 1.0),
            locality("CARLTON", 3.0),
            locality("Fitzroy", 0.5),
        ]);
        let mut keys: Vec<&str> = merged.iter().map(|l| l.normalized_key.as_str()).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), merged.len());
    }

    #[test]
    fn output_sorted_by_distance_ascending() {
        let merged = dedupe_and_rank(vec![
            locality("Carlton", 3.0),
            locality("Fitzroy", 1.0),
            locality("Northcote", 2.0),
        ]);
        let distances: Vec<f64> = merged.iter().map(|l| l.distance_km).collect();
        assert_eq!(distances, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn empty_input_is_fine() {
        assert!(dedupe_and_rank(vec![]).is_empty());
    }
}
