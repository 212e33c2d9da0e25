//! Drop-down search from a single edge to ground below it

use glam::Vec3;
use navlink_common::rotate_about_up;

use crate::config::{LinkGeneratorConfig, MAX_DROP_DOWN_ANGLES};
use crate::edge::Edge;
use crate::oracle::VisibilityOracle;
use crate::registry::LinkRegistry;

/// Outcome of a drop-down search for one edge
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DropDownSearch {
    /// Ground found; link from the edge's first connection point to `end`
    Found { start: Vec3, end: Vec3, angle: f32 },
    /// Ground found, but a link to that point already exists
    AlreadyLinked { end: Vec3 },
    /// No tried direction hit anything; `inconclusive` rays failed
    NoGround { inconclusive: usize },
    /// The edge has no anchors to search from
    NoAnchor,
}

/// Casts the configured drop-down rays for an edge
pub struct DropDownSearcher<'a, O: ?Sized> {
    config: &'a LinkGeneratorConfig,
    oracle: &'a O,
}

impl<'a, O: VisibilityOracle + ?Sized> DropDownSearcher<'a, O> {
    pub fn new(config: &'a LinkGeneratorConfig, oracle: &'a O) -> Self {
        Self { config, oracle }
    }

    /// Search direction for one configured angle
    pub fn search_direction(&self, edge: &Edge, angle: f32) -> Vec3 {
        rotate_about_up(edge.falloff_direction.normalize_or_zero(), angle)
            + Vec3::NEG_Y * self.config.drop_down_steepness
    }

    /// Tries up to three angles in order; the first hit ends the search.
    ///
    /// Produces at most one drop-down per edge. A failed ray is skipped and
    /// the next angle is tried.
    pub fn search<R: LinkRegistry + ?Sized>(&self, edge: &Edge, registry: &R) -> DropDownSearch {
        let (Some(&origin), Some(&start)) = (
            edge.falloff_points.first(),
            edge.connection_points.first(),
        ) else {
            return DropDownSearch::NoAnchor;
        };

        let mut inconclusive = 0;
        for &angle in self.config.drop_down_angles.iter().take(MAX_DROP_DOWN_ANGLES) {
            let direction = self.search_direction(edge, angle);
            let hit = match self
                .oracle
                .raycast(origin, direction, self.config.max_drop_down_distance)
            {
                Ok(hit) => hit,
                Err(e) => {
                    log::debug!("Drop-down ray at {} degrees inconclusive: {}", angle, e);
                    inconclusive += 1;
                    continue;
                }
            };

            if let Some(hit) = hit {
                if registry.exists(start, hit.point) {
                    return DropDownSearch::AlreadyLinked { end: hit.point };
                }
                return DropDownSearch::Found {
                    start,
                    end: hit.point,
                    angle,
                };
            }
        }

        DropDownSearch::NoGround { inconclusive }
    }
}
