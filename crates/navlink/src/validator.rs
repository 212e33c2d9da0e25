//! Edge-to-edge connection search
//!
//! For a source and target edge every anchor pair is tried in index order and
//! the first pair that passes the distance, angle, jump-arc and line-of-sight
//! tests wins. The search reports the first valid pair, not the best one.

use glam::Vec3;
use navlink_common::{angle_between_deg, project_on_plane, Result, DIRECTION_EPSILON};

use crate::config::{AngleRestriction, ArcObstructionPolicy, LinkGeneratorConfig};
use crate::edge::Edge;
use crate::oracle::VisibilityOracle;
use crate::registry::LinkRegistry;

/// Share of the anchor-to-anchor segment skipped at each end by arc sweeps
const ARC_SWEEP_MARGIN: f32 = 0.1;

/// Outcome of searching one ordered edge pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionSearch {
    /// Anchors `source_anchor` and `target_anchor` can be linked
    Found {
        source_anchor: usize,
        target_anchor: usize,
    },
    /// No anchor pair passed; `inconclusive` pairs could not be tested
    NotFound { inconclusive: usize },
    /// The jump arc between these anchors was obstructed and the policy
    /// stops the search for the whole edge pair
    Abandoned {
        source_anchor: usize,
        target_anchor: usize,
    },
}

impl ConnectionSearch {
    /// The accepted anchor pair, if any
    pub fn anchors(&self) -> Option<(usize, usize)> {
        match *self {
            ConnectionSearch::Found {
                source_anchor,
                target_anchor,
            } => Some((source_anchor, target_anchor)),
            _ => None,
        }
    }
}

/// Whether a connection leaving `edge` along `direction` is acceptable.
///
/// Either criterion is enough: steep connections close to the surface normal
/// and shallow ones close to the flattened falloff direction both pass.
pub fn within_angle_restriction(
    direction: Vec3,
    edge: &Edge,
    restriction: &AngleRestriction,
) -> bool {
    let upward = angle_between_deg(direction, edge.surface_normal);
    if upward <= restriction.upward {
        return true;
    }
    let forward = angle_between_deg(direction, project_on_plane(edge.falloff_direction, Vec3::Y));
    forward <= restriction.forward
}

/// Clearance height swept above a connection when jump-arc checks are on.
///
/// Grows linearly with distance up to `agent.height + max_jump_arc_height`
/// at the maximum link distance, and shrinks to nothing as the connection
/// turns vertical. An unbounded link distance uses the full arc.
pub fn jump_arc_height(config: &LinkGeneratorConfig, direction: Vec3, distance: f32) -> f32 {
    let ratio = if config.max_link_distance > 0.0 {
        distance / config.max_link_distance
    } else {
        1.0
    };
    let height = config.agent.height + config.max_jump_arc_height * ratio;
    let steepness = 1.0 - direction.y.abs().min(1.0);
    height * steepness
}

/// Searches anchor pairs of two edges for a valid direct connection
pub struct ConnectionValidator<'a, O: ?Sized> {
    config: &'a LinkGeneratorConfig,
    oracle: &'a O,
}

impl<'a, O: VisibilityOracle + ?Sized> ConnectionValidator<'a, O> {
    pub fn new(config: &'a LinkGeneratorConfig, oracle: &'a O) -> Self {
        Self { config, oracle }
    }

    /// Finds the first anchor pair of `source` and `target` that can be linked.
    ///
    /// Pairs already joined in `registry` are skipped. Oracle failures make a
    /// pair inconclusive; the search moves on to the next pair.
    pub fn find_connection<R: LinkRegistry + ?Sized>(
        &self,
        source: &Edge,
        target: &Edge,
        registry: &R,
    ) -> ConnectionSearch {
        let mut inconclusive = 0;

        for i in 0..source.anchor_count() {
            for j in 0..target.anchor_count() {
                if registry.exists(source.connection_points[i], target.connection_points[j]) {
                    continue;
                }

                let from = source.falloff_points[i];
                let to = target.falloff_points[j];
                let distance = from.distance(to);
                if distance <= DIRECTION_EPSILON {
                    continue;
                }
                let direction = (to - from) / distance;

                if self.config.max_link_distance > 0.0 && distance > self.config.max_link_distance {
                    continue;
                }

                let restriction = self.config.angles_for_distance(distance);
                if !within_angle_restriction(direction, source, restriction)
                    || !within_angle_restriction(-direction, target, restriction)
                {
                    continue;
                }

                if self.config.enable_jump_arc_checks {
                    match self.jump_arc_obstructed(from, to, direction, distance) {
                        Ok(false) => {}
                        Ok(true) => match self.config.arc_obstruction_policy {
                            ArcObstructionPolicy::SkipAnchorPair => continue,
                            ArcObstructionPolicy::AbandonEdgePair => {
                                return ConnectionSearch::Abandoned {
                                    source_anchor: i,
                                    target_anchor: j,
                                };
                            }
                        },
                        Err(e) => {
                            log::debug!(
                                "Jump arc sweep inconclusive for anchors ({}, {}): {}",
                                i,
                                j,
                                e
                            );
                            inconclusive += 1;
                            continue;
                        }
                    }
                }

                match self.line_of_sight_clear(from, to, direction, distance) {
                    Ok(true) => {
                        return ConnectionSearch::Found {
                            source_anchor: i,
                            target_anchor: j,
                        };
                    }
                    Ok(false) => {}
                    Err(e) => {
                        log::debug!("Line of sight inconclusive for anchors ({}, {}): {}", i, j, e);
                        inconclusive += 1;
                    }
                }
            }
        }

        ConnectionSearch::NotFound { inconclusive }
    }

    /// Both sweeps, one from each anchor toward the other, must hit
    fn jump_arc_obstructed(
        &self,
        from: Vec3,
        to: Vec3,
        direction: Vec3,
        distance: f32,
    ) -> Result<bool> {
        let arc = jump_arc_height(self.config, direction, distance);
        let half_extents = Vec3::new(self.config.agent.radius, arc * 0.5, self.config.agent.radius);
        let lift = Vec3::Y * (arc * 0.5);
        let margin = direction * (distance * ARC_SWEEP_MARGIN);
        let sweep = distance * (1.0 - 2.0 * ARC_SWEEP_MARGIN);

        if !self.oracle.boxcast(from + margin + lift, half_extents, direction, sweep)? {
            return Ok(false);
        }
        self.oracle.boxcast(to - margin + lift, half_extents, -direction, sweep)
    }

    fn line_of_sight_clear(
        &self,
        from: Vec3,
        to: Vec3,
        direction: Vec3,
        distance: f32,
    ) -> Result<bool> {
        if self.oracle.raycast(from, direction, distance)?.is_some() {
            return Ok(false);
        }
        Ok(self.oracle.raycast(to, -direction, distance)?.is_none())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{InMemoryLinkRegistry, LinkHandle, LinkRecord};
    use crate::test_helpers::{edge_with_surface_toward, facing_edges, hit_at, ScriptedOracle};

    fn config() -> LinkGeneratorConfig {
        LinkGeneratorConfig::default()
    }

    #[test]
    fn test_clear_path_within_tolerance_is_accepted() {
        let (left, right) = facing_edges(3.0, 2.0);
        let config = config();
        let oracle = ScriptedOracle::open();
        let validator = ConnectionValidator::new(&config, &oracle);

        let result = validator.find_connection(&left, &right, &InMemoryLinkRegistry::new());
        assert_eq!(result.anchors(), Some((0, 0)));
        assert_eq!(oracle.raycasts.get(), 2);
        assert_eq!(oracle.boxcasts.get(), 0);
    }

    #[test]
    fn test_forward_criterion_accepts_when_upward_fails() {
        let (left, right) = facing_edges(3.0, 2.0);
        let direction = (right.falloff_points[0] - left.falloff_points[0]).normalize();
        let restriction = AngleRestriction::new(30.0, 65.0);

        // Horizontal connection is 90 degrees off the surface normal
        assert!(angle_between_deg(direction, left.surface_normal) > restriction.upward);
        assert!(within_angle_restriction(direction, &left, &restriction));
        assert!(within_angle_restriction(-direction, &right, &restriction));
    }

    #[test]
    fn test_upward_criterion_accepts_steep_connection() {
        let (left, _) = facing_edges(3.0, 2.0);
        // Nearly straight up, far off the falloff direction
        let direction = Vec3::new(-0.2, 1.0, 0.0).normalize();
        let restriction = AngleRestriction::new(30.0, 65.0);
        assert!(within_angle_restriction(direction, &left, &restriction));
    }

    #[test]
    fn test_steep_and_oblique_connection_is_rejected() {
        let (left, _) = facing_edges(3.0, 2.0);
        // Backwards across the surface: far from both normal and falloff
        let direction = Vec3::NEG_X;
        let restriction = AngleRestriction::new(30.0, 65.0);
        assert!(!within_angle_restriction(direction, &left, &restriction));
    }

    #[test]
    fn test_back_to_back_edges_are_rejected() {
        // Both edges face away from each other
        let left = edge_with_surface_toward(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 2.0),
            Vec3::new(1.0, 0.0, 0.0),
            8.0,
        );
        let right = edge_with_surface_toward(
            Vec3::new(3.0, 0.0, 0.0),
            Vec3::new(3.0, 0.0, 2.0),
            Vec3::new(2.0, 0.0, 0.0),
            8.0,
        );
        let config = config();
        let oracle = ScriptedOracle::open();
        let validator = ConnectionValidator::new(&config, &oracle);
        let result = validator.find_connection(&left, &right, &InMemoryLinkRegistry::new());
        assert_eq!(result, ConnectionSearch::NotFound { inconclusive: 0 });
        assert_eq!(oracle.raycasts.get(), 0);
    }

    #[test]
    fn test_distance_limit() {
        let (left, right) = facing_edges(20.0, 2.0);
        let config = config().with_max_link_distance(16.0);
        let oracle = ScriptedOracle::open();
        let validator = ConnectionValidator::new(&config, &oracle);
        let result = validator.find_connection(&left, &right, &InMemoryLinkRegistry::new());
        assert_eq!(result.anchors(), None);

        // Zero disables the limit
        let config = config.with_max_link_distance(0.0);
        let validator = ConnectionValidator::new(&config, &oracle);
        let result = validator.find_connection(&left, &right, &InMemoryLinkRegistry::new());
        assert_eq!(result.anchors(), Some((0, 0)));
    }

    #[test]
    fn test_obstacle_between_anchors_rejects() {
        let (left, right) = facing_edges(3.0, 2.0);
        let config = config().with_standard_angles(180.0, 180.0);
        let oracle = ScriptedOracle::blocked();
        let validator = ConnectionValidator::new(&config, &oracle);
        let result = validator.find_connection(&left, &right, &InMemoryLinkRegistry::new());
        assert_eq!(result, ConnectionSearch::NotFound { inconclusive: 0 });
    }

    #[test]
    fn test_obstacle_seen_only_from_target_rejects() {
        let (left, right) = facing_edges(3.0, 2.0);
        let config = config();
        let oracle = ScriptedOracle::new(
            |origin, _, _| Ok((origin.x > 1.0).then(|| hit_at(Vec3::new(1.5, 0.0, 1.0)))),
            |_, _, _, _| Ok(false),
        );
        let validator = ConnectionValidator::new(&config, &oracle);
        let result = validator.find_connection(&left, &right, &InMemoryLinkRegistry::new());
        assert_eq!(result.anchors(), None);
    }

    #[test]
    fn test_existing_link_is_skipped() {
        let (left, right) = facing_edges(3.0, 2.0);
        let mut registry = InMemoryLinkRegistry::new();
        registry.register(LinkRecord {
            start: right.connection_points[0],
            end: left.connection_points[0],
            handle: LinkHandle(1),
            was_generated: true,
        });

        let config = config();
        let oracle = ScriptedOracle::open();
        let validator = ConnectionValidator::new(&config, &oracle);
        let result = validator.find_connection(&left, &right, &registry);
        assert_eq!(result, ConnectionSearch::NotFound { inconclusive: 0 });
        assert_eq!(oracle.raycasts.get(), 0);
    }

    #[test]
    fn test_first_passing_pair_in_index_order() {
        // Source has three anchors; only the last one can see the target
        let source = edge_with_surface_toward(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 12.0),
            Vec3::new(-1.0, 0.0, 0.0),
            4.0,
        );
        let target = edge_with_surface_toward(
            Vec3::new(3.0, 0.0, 8.0),
            Vec3::new(3.0, 0.0, 12.0),
            Vec3::new(4.0, 0.0, 8.0),
            8.0,
        );
        assert_eq!(source.anchor_count(), 3);

        let config = config().with_standard_angles(180.0, 180.0);
        let oracle = ScriptedOracle::new(
            |origin, _, _| Ok((origin.z < 8.0 && origin.x < 1.0).then(|| hit_at(origin))),
            |_, _, _, _| Ok(false),
        );
        let validator = ConnectionValidator::new(&config, &oracle);
        let result = validator.find_connection(&source, &target, &InMemoryLinkRegistry::new());
        assert_eq!(result.anchors(), Some((2, 0)));
    }

    #[test]
    fn test_oracle_failure_is_inconclusive() {
        let (left, right) = facing_edges(3.0, 2.0);
        let config = config();
        let oracle = ScriptedOracle::failing();
        let validator = ConnectionValidator::new(&config, &oracle);
        let result = validator.find_connection(&left, &right, &InMemoryLinkRegistry::new());
        assert_eq!(result, ConnectionSearch::NotFound { inconclusive: 1 });
    }

    #[test]
    fn test_arc_obstruction_skips_pair_by_default() {
        let source = edge_with_surface_toward(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 8.0),
            Vec3::new(-1.0, 0.0, 0.0),
            4.0,
        );
        let (_, target) = facing_edges(3.0, 8.0);
        assert_eq!(source.anchor_count(), 2);

        // Arc is obstructed only for sweeps starting near the first source anchor
        let oracle = ScriptedOracle::new(
            |_, _, _| Ok(None),
            |center, _, _, _| Ok(center.z < 4.0),
        );

        let config = config().with_jump_arc_checks(1.2, ArcObstructionPolicy::SkipAnchorPair);
        let validator = ConnectionValidator::new(&config, &oracle);
        let result = validator.find_connection(&source, &target, &InMemoryLinkRegistry::new());
        assert_eq!(result.anchors(), Some((1, 0)));

        let config = config.with_jump_arc_checks(1.2, ArcObstructionPolicy::AbandonEdgePair);
        let validator = ConnectionValidator::new(&config, &oracle);
        let result = validator.find_connection(&source, &target, &InMemoryLinkRegistry::new());
        assert_eq!(
            result,
            ConnectionSearch::Abandoned {
                source_anchor: 0,
                target_anchor: 0
            }
        );
    }

    #[test]
    fn test_arc_needs_both_sweeps_to_hit() {
        let (left, right) = facing_edges(3.0, 2.0);
        let oracle = ScriptedOracle::new(
            |_, _, _| Ok(None),
            |_, _, direction, _| Ok(direction.x > 0.0),
        );
        let config = config().with_jump_arc_checks(1.2, ArcObstructionPolicy::AbandonEdgePair);
        let validator = ConnectionValidator::new(&config, &oracle);
        let result = validator.find_connection(&left, &right, &InMemoryLinkRegistry::new());
        assert_eq!(result.anchors(), Some((0, 0)));
        assert_eq!(oracle.boxcasts.get(), 2);
    }

    #[test]
    fn test_jump_arc_height() {
        let config = config().with_max_link_distance(10.0);
        let horizontal = jump_arc_height(&config, Vec3::X, 5.0);
        assert!((horizontal - (2.0 + 1.2 * 0.5)).abs() < 1e-5);

        let vertical = jump_arc_height(&config, Vec3::NEG_Y, 5.0);
        assert!(vertical.abs() < 1e-6);

        let unbounded = config.with_max_link_distance(0.0);
        assert!((jump_arc_height(&unbounded, Vec3::X, 5.0) - 3.2).abs() < 1e-5);
    }
}
