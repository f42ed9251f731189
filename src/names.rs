//! Plausibility filter for candidate locality names.
//!
//! Boundary sources return plenty of named features that are not
//! localities: campuses, hospitals, apartment complexes, retirement
//! estates. Names matching an exclusion term are rejected — unless they
//! also match one of the allow patterns covering legitimate locality
//! naming conventions ("Ascot Park", "Keilor Village"), which win.

use regex::Regex;
use std::sync::LazyLock;

static EXCLUDE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(estate|college|university|school|housing|towers?|village|court|complex|medical|hospital|centre|center|apartments?|retirement|motel|hotel|club|mall|plaza|caravan)\b",
    )
    .expect("invalid exclusion pattern")
});

static ALLOW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[A-Z][A-Za-z'’-]+(?: [A-Z][A-Za-z'’-]+)* (?:Park|Heights|Gardens|Village|Grove|Hill|Hills|Waters|Downs|Rise)$",
    )
    .expect("invalid allow pattern")
});

/// Accept or reject a candidate name as a plausible locality.
pub fn is_likely_suburb(name: &str) -> bool {
    let name = name.trim();
    if name.is_empty() {
        return false;
    }
    if ALLOW.is_match(name) {
        return true;
    }
    !EXCLUDE.is_match(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_locality_names_pass() {
        assert!(is_likely_suburb("Brunswick"));
        assert!(is_likely_suburb("Brunswick East"));
        assert!(is_likely_suburb("St Kilda"));
    }

    #[test]
    fn institutional_names_are_rejected() {
        assert!(!is_likely_suburb("Monash University"));
        assert!(!is_likely_suburb("Epworth Hospital"));
        assert!(!is_likely_suburb("Highpoint Shopping Centre"));
        assert!(!is_likely_suburb("Sunset Retirement Estate"));
        assert!(!is_likely_suburb("Docklands Towers"));
    }

    #[test]
    fn allow_patterns_override_exclusions() {
        // "Village" is an exclusion term but a legitimate suffix too
        assert!(is_likely_suburb("Keilor Village"));
        assert!(is_likely_suburb("Ascot Park"));
        assert!(is_likely_suburb("Glen Waverley Heights"));
        assert!(is_likely_suburb("Hope Valley Gardens"));
    }

    #[test]
    fn lowercase_institutional_suffix_still_rejected() {
        // Does not match the capitalized allow convention
        assert!(!is_likely_suburb("the old village"));
    }

    #[test]
    fn blank_names_are_rejected() {
        assert!(!is_likely_suburb(""));
        assert!(!is_likely_suburb("   "));
    }
}
