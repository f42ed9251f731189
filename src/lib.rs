//! Catchment - service-area coverage resolution
//!
//! Determines, for a point on a map and a radius, the named localities the
//! radius covers, so a service provider can declare a geographic service
//! area. Combines an external boundary-data source with retry/failover, a
//! reverse-geocoding fallback, a short-TTL cache, and debounced
//! generation-fenced resolution under rapid input.

pub mod boundary;
pub mod cache;
pub mod config;
pub mod fallback;
pub mod geocode;
pub mod geometry;
pub mod merge;
pub mod models;
pub mod names;
pub mod resolver;

pub use config::Config;
pub use models::{Confidence, Coverage, CoverageSource, LatLng, OverlapKind, ResolvedLocality};
pub use resolver::{CoverageResolver, DebounceController};
