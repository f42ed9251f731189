//! Core data models for coverage resolution.

pub mod locality;

pub use locality::{Confidence, Coverage, CoverageSource, LatLng, OverlapKind, ResolvedLocality};
