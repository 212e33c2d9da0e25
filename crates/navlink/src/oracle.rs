//! Physical visibility queries consumed by the link search
//!
//! The pipeline never inspects scene geometry directly; it asks a
//! [`VisibilityOracle`]. An `Err` from the oracle means "no information" and
//! is handled by the caller as an inconclusive answer, never as a clear path.

use glam::Vec3;
use navlink_common::Result;

/// Nearest intersection of a ray with scene geometry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// World position of the hit
    pub point: Vec3,
    /// Distance from the ray origin
    pub distance: f32,
    /// Surface normal at the hit
    pub normal: Vec3,
}

/// Ray and box sweep queries against the scene
pub trait VisibilityOracle {
    /// Casts a ray; `direction` need not be normalized.
    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Result<Option<RayHit>>;

    /// Sweeps an axis-aligned box centred at `center`; returns whether
    /// anything is hit within `max_distance`.
    fn boxcast(
        &self,
        center: Vec3,
        half_extents: Vec3,
        direction: Vec3,
        max_distance: f32,
    ) -> Result<bool>;
}

impl<T: VisibilityOracle + ?Sized> VisibilityOracle for &T {
    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Result<Option<RayHit>> {
        (**self).raycast(origin, direction, max_distance)
    }

    fn boxcast(
        &self,
        center: Vec3,
        half_extents: Vec3,
        direction: Vec3,
        max_distance: f32,
    ) -> Result<bool> {
        (**self).boxcast(center, half_extents, direction, max_distance)
    }
}
