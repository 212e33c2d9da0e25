//! Shared fixtures for the pipeline unit tests

use std::cell::Cell;

use glam::Vec3;
use navlink_common::{Error, Result};

use crate::edge::Edge;
use crate::oracle::{RayHit, VisibilityOracle};

type RayFn = Box<dyn Fn(Vec3, Vec3, f32) -> Result<Option<RayHit>>>;
type BoxFn = Box<dyn Fn(Vec3, Vec3, Vec3, f32) -> Result<bool>>;

/// Oracle whose answers are supplied by closures, counting every query
pub struct ScriptedOracle {
    ray: RayFn,
    sweep: BoxFn,
    pub raycasts: Cell<usize>,
    pub boxcasts: Cell<usize>,
}

impl ScriptedOracle {
    /// Nothing is ever hit
    pub fn open() -> Self {
        Self::new(|_, _, _| Ok(None), |_, _, _, _| Ok(false))
    }

    /// Every ray and sweep hits something
    pub fn blocked() -> Self {
        Self::new(
            |origin, direction, _| Ok(Some(hit_at(origin + direction.normalize() * 0.5))),
            |_, _, _, _| Ok(true),
        )
    }

    /// Every query fails
    pub fn failing() -> Self {
        Self::new(
            |_, _, _| Err(Error::Oracle("outside supported range".to_string())),
            |_, _, _, _| Err(Error::Oracle("outside supported range".to_string())),
        )
    }

    pub fn new(
        ray: impl Fn(Vec3, Vec3, f32) -> Result<Option<RayHit>> + 'static,
        sweep: impl Fn(Vec3, Vec3, Vec3, f32) -> Result<bool> + 'static,
    ) -> Self {
        Self {
            ray: Box::new(ray),
            sweep: Box::new(sweep),
            raycasts: Cell::new(0),
            boxcasts: Cell::new(0),
        }
    }
}

impl VisibilityOracle for ScriptedOracle {
    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Result<Option<RayHit>> {
        self.raycasts.set(self.raycasts.get() + 1);
        (self.ray)(origin, direction, max_distance)
    }

    fn boxcast(
        &self,
        center: Vec3,
        half_extents: Vec3,
        direction: Vec3,
        max_distance: f32,
    ) -> Result<bool> {
        self.boxcasts.set(self.boxcasts.get() + 1);
        (self.sweep)(center, half_extents, direction, max_distance)
    }
}

/// A hit with an up-facing normal
pub fn hit_at(point: Vec3) -> RayHit {
    RayHit {
        point,
        distance: 0.0,
        normal: Vec3::Y,
    }
}

/// Edge from `from` to `to` whose walkable surface lies toward `inside`
pub fn edge_with_surface_toward(from: Vec3, to: Vec3, inside: Vec3, max_edge_length: f32) -> Edge {
    Edge::new(from, to, (to - from).cross(inside - from), max_edge_length)
}

/// Two parallel edges along Z, `gap` apart on X, facing each other
pub fn facing_edges(gap: f32, length: f32) -> (Edge, Edge) {
    let left = edge_with_surface_toward(
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, length),
        Vec3::new(-1.0, 0.0, 0.0),
        8.0,
    );
    let right = edge_with_surface_toward(
        Vec3::new(gap, 0.0, 0.0),
        Vec3::new(gap, 0.0, length),
        Vec3::new(gap + 1.0, 0.0, 0.0),
        8.0,
    );
    (left, right)
}
