//! Boundary edge extraction from a triangulation
//!
//! Every triangle contributes its three undirected edges. An edge shared by
//! two triangles is interior and cancels out; the boundary is exactly the set
//! of edges seen an odd number of times. Edges are keyed by endpoint
//! *positions*, so coincident vertices with different indices merge.

use std::collections::HashMap;

use glam::Vec3;
use navlink_common::{Result, Triangulation};

use crate::config::EdgeParameters;
use crate::edge::Edge;

/// Bit-exact position key; `-0.0` and `0.0` map to the same key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
struct PositionKey([u32; 3]);

impl PositionKey {
    fn new(p: Vec3) -> Self {
        let bits = |v: f32| if v == 0.0 { 0.0f32.to_bits() } else { v.to_bits() };
        Self([bits(p.x), bits(p.y), bits(p.z)])
    }
}

/// Order-independent key of an undirected segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct SegmentKey(PositionKey, PositionKey);

impl SegmentKey {
    fn new(a: Vec3, b: Vec3) -> Self {
        let (ka, kb) = (PositionKey::new(a), PositionKey::new(b));
        if ka <= kb {
            Self(ka, kb)
        } else {
            Self(kb, ka)
        }
    }
}

/// First sighting of a segment plus how many triangles share it
#[derive(Debug)]
struct SegmentTally {
    start: Vec3,
    end: Vec3,
    face_normal: Vec3,
    count: u32,
}

/// Result of boundary extraction
#[derive(Debug, Clone, Default)]
pub struct BoundaryExtraction {
    /// Boundary edges with usable anchors, in first-seen order
    pub edges: Vec<Edge>,
    /// Boundary edges dropped because they could not produce anchors
    pub degenerate: usize,
}

/// Extracts the boundary edges of a triangulation.
///
/// Fails only for a malformed triangulation (bad stride or index bounds).
/// Degenerate boundary edges are counted and dropped.
pub fn extract_boundary_edges(
    triangulation: &Triangulation,
    params: &EdgeParameters,
) -> Result<BoundaryExtraction> {
    triangulation.validate()?;

    let mut slots: HashMap<SegmentKey, usize> = HashMap::new();
    let mut tallies: Vec<SegmentTally> = Vec::new();

    for tri in 0..triangulation.triangle_count() {
        let [a, b, c] = triangulation.triangle(tri)?;

        // Each edge takes the remaining corner to orient its face normal
        for (p, q, r) in [(a, b, c), (b, c, a), (c, a, b)] {
            let key = SegmentKey::new(p, q);
            match slots.get(&key) {
                Some(&slot) => tallies[slot].count += 1,
                None => {
                    slots.insert(key, tallies.len());
                    tallies.push(SegmentTally {
                        start: p,
                        end: q,
                        face_normal: (q - p).cross(r - p),
                        count: 1,
                    });
                }
            }
        }
    }

    let mut extraction = BoundaryExtraction::default();
    for tally in tallies.iter().filter(|t| t.count % 2 == 1) {
        let edge = Edge::new(tally.start, tally.end, tally.face_normal, params.max_edge_length);
        if edge.has_pivot_point {
            extraction.edges.push(edge);
        } else {
            log::info!(
                "Dropping degenerate boundary edge {:?} -> {:?}",
                tally.start,
                tally.end
            );
            extraction.degenerate += 1;
        }
    }

    log::debug!(
        "Boundary extraction: {} triangles, {} unique segments, {} boundary edges, {} degenerate",
        triangulation.triangle_count(),
        tallies.len(),
        extraction.edges.len(),
        extraction.degenerate
    );

    Ok(extraction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use navlink_common::Error;

    fn params() -> EdgeParameters {
        EdgeParameters {
            min_edge_length: 0.0,
            ..Default::default()
        }
    }

    /// Flat square of side `size` made of two triangles
    fn square(size: f32) -> Triangulation {
        Triangulation::from_positions(
            &[
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(size, 0.0, 0.0),
                Vec3::new(size, 0.0, size),
                Vec3::new(0.0, 0.0, size),
            ],
            &[[0, 2, 1], [0, 3, 2]],
        )
    }

    /// Closed axis-aligned cube, 12 triangles
    fn cube() -> Triangulation {
        let p = |x: f32, y: f32, z: f32| Vec3::new(x, y, z);
        Triangulation::from_positions(
            &[
                p(0.0, 0.0, 0.0),
                p(1.0, 0.0, 0.0),
                p(1.0, 1.0, 0.0),
                p(0.0, 1.0, 0.0),
                p(0.0, 0.0, 1.0),
                p(1.0, 0.0, 1.0),
                p(1.0, 1.0, 1.0),
                p(0.0, 1.0, 1.0),
            ],
            &[
                [0, 2, 1],
                [0, 3, 2],
                [4, 5, 6],
                [4, 6, 7],
                [0, 1, 5],
                [0, 5, 4],
                [3, 6, 2],
                [3, 7, 6],
                [0, 4, 7],
                [0, 7, 3],
                [1, 2, 6],
                [1, 6, 5],
            ],
        )
    }

    #[test]
    fn test_closed_mesh_has_no_boundary() -> Result<()> {
        let extraction = extract_boundary_edges(&cube(), &params())?;
        assert!(extraction.edges.is_empty());
        assert_eq!(extraction.degenerate, 0);
        Ok(())
    }

    #[test]
    fn test_square_boundary_loop() -> Result<()> {
        let extraction = extract_boundary_edges(&square(5.0), &params())?;
        assert_eq!(extraction.edges.len(), 4);
        for edge in &extraction.edges {
            assert!((edge.length - 5.0).abs() < 1e-5);
            assert!(edge.has_pivot_point);
            // Falloff must point out of the square
            let outward = edge.midpoint() + edge.falloff_direction;
            let inside = (0.0..=5.0).contains(&outward.x) && (0.0..=5.0).contains(&outward.z);
            assert!(!inside, "falloff of {:?} points inward", edge);
        }
        Ok(())
    }

    #[test]
    fn test_grid_boundary_count() -> Result<()> {
        // 3x3 grid of quads: the open loop has 12 unit edges
        let n = 3;
        let mut positions = Vec::new();
        for z in 0..=n {
            for x in 0..=n {
                positions.push(Vec3::new(x as f32, 0.0, z as f32));
            }
        }
        let idx = |x: i32, z: i32| z * (n + 1) + x;
        let mut triangles = Vec::new();
        for z in 0..n {
            for x in 0..n {
                triangles.push([idx(x, z), idx(x + 1, z + 1), idx(x + 1, z)]);
                triangles.push([idx(x, z), idx(x, z + 1), idx(x + 1, z + 1)]);
            }
        }
        let mesh = Triangulation::from_positions(&positions, &triangles);

        let extraction = extract_boundary_edges(&mesh, &params())?;
        assert_eq!(extraction.edges.len(), 12);
        Ok(())
    }

    #[test]
    fn test_coincident_vertices_merge() -> Result<()> {
        // Two triangles sharing an edge through duplicated vertices
        let mesh = Triangulation::from_positions(
            &[
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 1.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(0.0, 0.0, 1.0),
                Vec3::new(1.0, 0.0, 1.0),
            ],
            &[[0, 1, 2], [3, 4, 5]],
        );
        let extraction = extract_boundary_edges(&mesh, &params())?;
        assert_eq!(extraction.edges.len(), 4);
        Ok(())
    }

    #[test]
    fn test_negative_zero_matches_zero() -> Result<()> {
        let mesh = Triangulation::from_positions(
            &[
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 1.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(-0.0, 0.0, -0.0),
                Vec3::new(0.0, 0.0, 1.0),
            ],
            &[[0, 1, 2], [3, 4, 1]],
        );
        let extraction = extract_boundary_edges(&mesh, &params())?;
        assert_eq!(extraction.edges.len(), 4);
        Ok(())
    }

    #[test]
    fn test_degenerate_triangle_edges_are_dropped() -> Result<()> {
        let mesh = Triangulation::from_positions(
            &[
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(2.0, 0.0, 0.0),
            ],
            &[[0, 1, 2]],
        );
        let extraction = extract_boundary_edges(&mesh, &params())?;
        assert!(extraction.edges.is_empty());
        assert_eq!(extraction.degenerate, 3);
        Ok(())
    }

    #[test]
    fn test_malformed_triangulation_is_error() {
        let mesh = Triangulation::from_raw(vec![0.0; 9], vec![0, 1, 5]);
        assert!(matches!(
            extract_boundary_edges(&mesh, &params()),
            Err(Error::InvalidTriangulation(_))
        ));
    }
}
