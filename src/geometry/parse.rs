//! Candidate polygons from raw boundary elements.

use geo_types::{Coord, LineString, Polygon};
use tracing::debug;

use crate::boundary::{BoundaryElement, ElementKind, ElementVertex};

/// Build a polygon for a raw element, or `None` when it carries no
/// usable boundary geometry (the candidate is dropped, the batch
/// continues).
///
/// Relations use only the "outer"-role ways present in the element
/// payload itself; multi-way boundaries spanning separately fetched
/// elements are not stitched. Documented simplification.
pub fn element_polygon(element: &BoundaryElement) -> Option<Polygon<f64>> {
    match element.kind {
        ElementKind::Node => None,
        ElementKind::Way => ring_polygon(to_coords(&element.geometry)),
        ElementKind::Relation => {
            let rings: Vec<Vec<Coord<f64>>> = element
                .members
                .iter()
                .filter(|m| m.role == "outer" || m.role.is_empty())
                .map(|m| to_coords(&m.geometry))
                .filter(|coords| coords.len() >= 2)
                .collect();

            if rings.is_empty() {
                return None;
            }

            let polygons = merge_rings_to_polygons(rings);
            if polygons.is_empty() {
                debug!(
                    source_id = %element.source_id(),
                    "relation members did not form a closed ring"
                );
                return None;
            }

            // Several closed rings can survive; the one with the most
            // vertices is the outer boundary in practice
            polygons
                .into_iter()
                .max_by_key(|p| p.exterior().0.len())
        }
    }
}

fn to_coords(vertices: &[ElementVertex]) -> Vec<Coord<f64>> {
    vertices
        .iter()
        .map(|v| Coord { x: v.lon, y: v.lat })
        .collect()
}

/// Close an open ring and require at least 4 vertices afterwards
fn ring_polygon(mut ring: Vec<Coord<f64>>) -> Option<Polygon<f64>> {
    if ring.len() < 3 {
        return None;
    }
    if ring.first() != ring.last() {
        ring.push(ring[0]);
    }
    if ring.len() < 4 {
        return None;
    }
    Some(Polygon::new(LineString::new(ring), vec![]))
}

/// Merge contiguous way segments into closed polygons.
///
/// Segments are joined end-to-end (reversing where needed) until no more
/// connections exist; anything that still fails to close is discarded.
fn merge_rings_to_polygons(rings: Vec<Vec<Coord<f64>>>) -> Vec<Polygon<f64>> {
    let mut result = Vec::new();
    let mut remaining = rings;

    while !remaining.is_empty() {
        let mut current = remaining.remove(0);

        if current.first() == current.last() && current.len() >= 4 {
            result.push(Polygon::new(LineString::new(current), vec![]));
            continue;
        }

        let mut merged = true;
        while merged && !remaining.is_empty() {
            merged = false;

            let current_start = current.first().copied();
            let current_end = current.last().copied();

            for i in 0..remaining.len() {
                let segment_start = remaining[i].first().copied();
                let segment_end = remaining[i].last().copied();

                if current_end == segment_start {
                    let mut segment = remaining.remove(i);
                    segment.remove(0);
                    current.extend(segment);
                    merged = true;
                    break;
                } else if current_end == segment_end {
                    let mut segment = remaining.remove(i);
                    segment.reverse();
                    segment.remove(0);
                    current.extend(segment);
                    merged = true;
                    break;
                } else if current_start == segment_end {
                    let mut segment = remaining.remove(i);
                    segment.pop();
                    segment.extend(current);
                    current = segment;
                    merged = true;
                    break;
                } else if current_start == segment_start {
                    let mut segment = remaining.remove(i);
                    segment.reverse();
                    segment.pop();
                    segment.extend(current);
                    current = segment;
                    merged = true;
                    break;
                }
            }
        }

        if let Some(polygon) = ring_polygon(current) {
            result.push(polygon);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::ElementMember;
    use std::collections::HashMap;

    fn vertex(lat: f64, lon: f64) -> ElementVertex {
        ElementVertex { lat, lon }
    }

    fn way(geometry: Vec<ElementVertex>) -> BoundaryElement {
        BoundaryElement {
            kind: ElementKind::Way,
            id: 1,
            tags: HashMap::new(),
            lat: None,
            lon: None,
            center: None,
            geometry,
            members: vec![],
        }
    }

    #[test]
    fn way_ring_is_closed_if_open() {
        let el = way(vec![
            vertex(0.0, 0.0),
            vertex(0.0, 1.0),
            vertex(1.0, 1.0),
        ]);
        let poly = element_polygon(&el).unwrap();
        let ring = &poly.exterior().0;
        assert_eq!(ring.len(), 4);
        assert_eq!(ring.first(), ring.last());
    }

    #[test]
    fn degenerate_way_is_dropped() {
        let el = way(vec![vertex(0.0, 0.0), vertex(0.0, 1.0)]);
        assert!(element_polygon(&el).is_none());
    }

    #[test]
    fn node_has_no_polygon() {
        let el = BoundaryElement {
            kind: ElementKind::Node,
            id: 9,
            tags: HashMap::new(),
            lat: Some(0.0),
            lon: Some(0.0),
            center: None,
            geometry: vec![],
            members: vec![],
        };
        assert!(element_polygon(&el).is_none());
    }

    #[test]
    fn relation_merges_split_outer_ways() {
        let el = BoundaryElement {
            kind: ElementKind::Relation,
            id: 5,
            tags: HashMap::new(),
            lat: None,
            lon: None,
            center: None,
            geometry: vec![],
            members: vec![
                ElementMember {
                    role: "outer".to_string(),
                    geometry: vec![vertex(0.0, 0.0), vertex(0.0, 1.0), vertex(1.0, 1.0)],
                },
                ElementMember {
                    role: "outer".to_string(),
                    geometry: vec![vertex(1.0, 1.0), vertex(1.0, 0.0), vertex(0.0, 0.0)],
                },
            ],
        };
        let poly = element_polygon(&el).unwrap();
        assert_eq!(poly.exterior().0.first(), poly.exterior().0.last());
        assert!(poly.exterior().0.len() >= 5);
    }

    #[test]
    fn relation_ignores_inner_members() {
        let el = BoundaryElement {
            kind: ElementKind::Relation,
            id: 6,
            tags: HashMap::new(),
            lat: None,
            lon: None,
            center: None,
            geometry: vec![],
            members: vec![ElementMember {
                role: "inner".to_string(),
                geometry: vec![
                    vertex(0.0, 0.0),
                    vertex(0.0, 1.0),
                    vertex(1.0, 1.0),
                    vertex(0.0, 0.0),
                ],
            }],
        };
        assert!(element_polygon(&el).is_none());
    }

    #[test]
    fn disconnected_segments_are_discarded() {
        let el = BoundaryElement {
            kind: ElementKind::Relation,
            id: 7,
            tags: HashMap::new(),
            lat: None,
            lon: None,
            center: None,
            geometry: vec![],
            members: vec![
                ElementMember {
                    role: "outer".to_string(),
                    geometry: vec![vertex(0.0, 0.0), vertex(0.0, 1.0)],
                },
                ElementMember {
                    role: "outer".to_string(),
                    geometry: vec![vertex(5.0, 5.0), vertex(6.0, 6.0)],
                },
            ],
        };
        assert!(element_polygon(&el).is_none());
    }
}
