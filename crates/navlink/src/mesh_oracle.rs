//! Visibility oracle over a static obstacle triangulation

use glam::Vec3;
use navlink_common::{is_finite_vec, Error, Result, Triangulation};

use crate::oracle::{RayHit, VisibilityOracle};

/// Hits closer than this to either end of the ray are ignored, so rays
/// leaving a surface or arriving on one do not hit that surface
const MIN_HIT_DISTANCE: f32 = 1e-4;

const PARALLEL_EPSILON: f32 = 1e-8;

/// Answers ray and box sweep queries by brute force against a triangle list.
///
/// Triangles are two-sided. Box sweeps are approximated by casting rays from
/// the box centre and its eight corners.
#[derive(Debug, Clone, Default)]
pub struct TriMeshOracle {
    triangles: Vec<[Vec3; 3]>,
}

impl TriMeshOracle {
    pub fn new(triangulation: &Triangulation) -> Result<Self> {
        let mut oracle = Self::default();
        oracle.extend(triangulation)?;
        Ok(oracle)
    }

    /// Adds every triangle of `triangulation` to the scene
    pub fn extend(&mut self, triangulation: &Triangulation) -> Result<()> {
        triangulation.validate()?;
        for t in 0..triangulation.triangle_count() {
            self.triangles.push(triangulation.triangle(t)?);
        }
        Ok(())
    }

    /// An oracle with nothing to hit
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    fn nearest_hit(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RayHit> {
        let mut nearest: Option<RayHit> = None;
        for tri in &self.triangles {
            let Some(t) = intersect_triangle(origin, direction, tri) else {
                continue;
            };
            if t < MIN_HIT_DISTANCE || t > max_distance - MIN_HIT_DISTANCE {
                continue;
            }
            if nearest.map_or(true, |hit| t < hit.distance) {
                let mut normal = (tri[1] - tri[0]).cross(tri[2] - tri[0]).normalize_or_zero();
                if normal.dot(direction) > 0.0 {
                    normal = -normal;
                }
                nearest = Some(RayHit {
                    point: origin + direction * t,
                    distance: t,
                    normal,
                });
            }
        }
        nearest
    }
}

/// Normalizes a query direction and rejects unusable input
fn query_direction(origin: Vec3, direction: Vec3, max_distance: f32) -> Result<Vec3> {
    if !is_finite_vec(origin) || !is_finite_vec(direction) || !max_distance.is_finite() {
        return Err(Error::Oracle(format!(
            "non-finite query: origin {}, direction {}, distance {}",
            origin, direction, max_distance
        )));
    }
    let unit = direction.normalize_or_zero();
    if unit == Vec3::ZERO {
        return Err(Error::Oracle("zero query direction".to_string()));
    }
    Ok(unit)
}

/// Moller-Trumbore intersection; returns the ray parameter of the hit
fn intersect_triangle(origin: Vec3, direction: Vec3, tri: &[Vec3; 3]) -> Option<f32> {
    let e1 = tri[1] - tri[0];
    let e2 = tri[2] - tri[0];
    let p = direction.cross(e2);
    let det = e1.dot(p);
    if det.abs() < PARALLEL_EPSILON {
        return None;
    }
    let inv_det = 1.0 / det;

    let s = origin - tri[0];
    let u = s.dot(p) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(e1);
    let v = direction.dot(q) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    Some(e2.dot(q) * inv_det)
}

impl VisibilityOracle for TriMeshOracle {
    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Result<Option<RayHit>> {
        let direction = query_direction(origin, direction, max_distance)?;
        Ok(self.nearest_hit(origin, direction, max_distance))
    }

    fn boxcast(
        &self,
        center: Vec3,
        half_extents: Vec3,
        direction: Vec3,
        max_distance: f32,
    ) -> Result<bool> {
        let direction = query_direction(center, direction, max_distance)?;
        if !is_finite_vec(half_extents) {
            return Err(Error::Oracle(format!("non-finite box extents {}", half_extents)));
        }
        let h = half_extents.abs();

        let mut origins = vec![center];
        for sx in [-1.0, 1.0] {
            for sy in [-1.0, 1.0] {
                for sz in [-1.0, 1.0] {
                    origins.push(center + h * Vec3::new(sx, sy, sz));
                }
            }
        }

        Ok(origins
            .into_iter()
            .any(|origin| self.nearest_hit(origin, direction, max_distance).is_some()))
    }
}
