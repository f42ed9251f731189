//! Circle construction, boundary-element parsing, and overlap
//! classification against the coverage circle.

mod circle;
mod overlap;
mod parse;

pub use circle::{circle_polygon, circle_ring, DEFAULT_SEGMENTS};
pub use overlap::{classify_overlap, classify_point, distance_km};
pub use parse::element_polygon;
