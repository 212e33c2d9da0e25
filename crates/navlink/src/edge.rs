//! Boundary edge of a walkable surface and its link anchors

use glam::Vec3;
use navlink_common::{flatten, DIRECTION_EPSILON};

/// Upper bound on the anchors one edge is split into
pub const MAX_ANCHORS_PER_EDGE: usize = 256;

/// One boundary segment of the navigable surface
///
/// An edge carries the direction an agent would step off it and one or more
/// anchors along it. Edges longer than the configured maximum get one anchor
/// per sub-segment. An edge whose geometry cannot produce anchors has
/// `has_pivot_point == false` and is discarded by the pipeline.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Edge {
    pub start: Vec3,
    pub end: Vec3,
    /// Distance between `start` and `end`
    pub length: f32,
    /// Up-facing unit normal of the face the edge borders
    pub surface_normal: Vec3,
    /// Horizontal unit direction pointing off the walkable surface
    pub falloff_direction: Vec3,
    /// Anchors used for geometric and visibility tests
    pub falloff_points: Vec<Vec3>,
    /// Anchors used for link placement, parallel to `falloff_points`
    pub connection_points: Vec<Vec3>,
    /// False when the edge produced no anchors
    pub has_pivot_point: bool,
    /// Number of boundary edges this edge stands for (1 unless clustered)
    pub merged_count: usize,
}

impl Edge {
    /// Creates an edge from its endpoints and the raw (unnormalized) normal
    /// of the triangle it borders.
    ///
    /// The falloff direction is `(end - start) x face_normal`, which points
    /// away from the triangle for either winding as long as `face_normal`
    /// is the cross product taken in the same winding as `start -> end`.
    pub fn new(start: Vec3, end: Vec3, face_normal: Vec3, max_edge_length: f32) -> Self {
        let mut edge = Self {
            start,
            end,
            length: 0.0,
            surface_normal: Vec3::ZERO,
            falloff_direction: Vec3::ZERO,
            falloff_points: Vec::new(),
            connection_points: Vec::new(),
            has_pivot_point: false,
            merged_count: 1,
        };

        let normal = face_normal.normalize_or_zero();
        if normal != Vec3::ZERO {
            // Walkable faces are measured against an up-facing normal
            edge.surface_normal = if normal.y < 0.0 { -normal } else { normal };
            edge.falloff_direction = flatten((end - start).cross(face_normal)).normalize_or_zero();
        }

        edge.rebuild_anchors(max_edge_length);
        edge
    }

    /// Moves the endpoints and recomputes length and anchors
    pub fn set_endpoints(&mut self, start: Vec3, end: Vec3, max_edge_length: f32) {
        self.start = start;
        self.end = end;
        self.rebuild_anchors(max_edge_length);
    }

    /// Whether this edge was produced by merging a group of short edges
    pub fn is_representative(&self) -> bool {
        self.merged_count > 1
    }

    /// Number of anchor pairs on this edge
    pub fn anchor_count(&self) -> usize {
        self.falloff_points.len()
    }

    /// True when the edges touch at an exactly shared endpoint
    pub fn shares_endpoint(&self, other: &Edge) -> bool {
        self.start == other.start
            || self.start == other.end
            || self.end == other.start
            || self.end == other.end
    }

    /// Midpoint of the segment
    pub fn midpoint(&self) -> Vec3 {
        (self.start + self.end) * 0.5
    }

    fn rebuild_anchors(&mut self, max_edge_length: f32) {
        self.length = self.start.distance(self.end);
        self.falloff_points.clear();
        self.connection_points.clear();

        let usable = self.length > DIRECTION_EPSILON
            && self.surface_normal != Vec3::ZERO
            && self.falloff_direction != Vec3::ZERO;
        self.has_pivot_point = usable;
        if !usable {
            return;
        }

        let segments = if max_edge_length > 0.0 {
            let wanted = (self.length / max_edge_length).ceil();
            (wanted.min(MAX_ANCHORS_PER_EDGE as f32) as usize).max(1)
        } else {
            1
        };

        for k in 0..segments {
            let t = (k as f32 + 0.5) / segments as f32;
            let anchor = self.start.lerp(self.end, t);
            self.connection_points.push(anchor);
            self.falloff_points.push(anchor);
        }
    }
}
