//! Tunables for edge derivation and link generation

use navlink_common::{Error, Result};

/// Maximum number of drop-down directions tried per edge
pub const MAX_DROP_DOWN_ANGLES: usize = 3;

/// Smallest accepted non-zero `max_edge_length`
pub const MIN_SPLIT_EDGE_LENGTH: f32 = 0.01;

/// Snapshot of the tunables that shape edge derivation
///
/// Two snapshots compare equal exactly when edges derived under one are
/// still valid under the other.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct EdgeParameters {
    /// Edges longer than this are split into several anchors (0 disables splitting)
    pub max_edge_length: f32,
    /// Edges shorter than this are clustered with their neighbours (0 disables clustering)
    pub min_edge_length: f32,
    /// Upper bound on the number of short edges merged into one representative
    pub max_group_size: usize,
    /// Groups of short edges smaller than this are discarded
    pub min_group_size: usize,
}

impl Default for EdgeParameters {
    fn default() -> Self {
        Self {
            max_edge_length: 8.0,
            min_edge_length: 0.2,
            max_group_size: 6,
            min_group_size: 3,
        }
    }
}

impl EdgeParameters {
    /// Whether short-edge clustering runs at all
    pub fn clustering_enabled(&self) -> bool {
        self.min_edge_length > 0.0
    }

    pub fn validate(&self) -> Result<()> {
        check_non_negative("max_edge_length", self.max_edge_length)?;
        check_non_negative("min_edge_length", self.min_edge_length)?;

        if self.max_edge_length > 0.0 && self.max_edge_length < MIN_SPLIT_EDGE_LENGTH {
            return Err(Error::InvalidConfig(format!(
                "max_edge_length ({}) is below {}",
                self.max_edge_length, MIN_SPLIT_EDGE_LENGTH
            )));
        }

        if self.max_group_size == 0 {
            return Err(Error::InvalidConfig(
                "max_group_size must be at least 1".to_string(),
            ));
        }

        if self.min_group_size > self.max_group_size {
            return Err(Error::InvalidConfig(format!(
                "min_group_size ({}) exceeds max_group_size ({})",
                self.min_group_size, self.max_group_size
            )));
        }

        Ok(())
    }
}

/// Physical size of the agent the links are generated for
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct AgentProfile {
    /// Horizontal radius used for obstruction sweeps
    pub radius: f32,
    /// Standing height, the base of the jump arc
    pub height: f32,
}

impl Default for AgentProfile {
    fn default() -> Self {
        Self {
            radius: 0.5,
            height: 2.0,
        }
    }
}

/// Pair of angle tolerances (degrees) for one acceptance regime
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct AngleRestriction {
    /// Max angle between a connection and the edge's surface normal
    pub upward: f32,
    /// Max angle between a connection and the edge's flattened falloff direction
    pub forward: f32,
}

impl AngleRestriction {
    pub const fn new(upward: f32, forward: f32) -> Self {
        Self { upward, forward }
    }

    /// Tolerances for regular links
    pub const STANDARD: Self = Self::new(30.0, 65.0);

    /// Looser tolerances for links shorter than the short-link distance
    pub const PERMISSIVE: Self = Self::new(65.0, 89.0);

    fn validate(&self, name: &str) -> Result<()> {
        for (field, value) in [("upward", self.upward), ("forward", self.forward)] {
            if !value.is_finite() || !(0.0..=180.0).contains(&value) {
                return Err(Error::InvalidConfig(format!(
                    "{} {} angle must be within [0, 180], got {}",
                    name, field, value
                )));
            }
        }
        Ok(())
    }
}

/// What to do when the jump-arc sweep reports an obstruction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum ArcObstructionPolicy {
    /// Reject only the obstructed anchor pair and keep searching
    #[default]
    SkipAnchorPair,
    /// Stop searching the whole edge pair at the first obstructed anchor pair
    AbandonEdgePair,
}

/// Configuration for a link generation run
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct LinkGeneratorConfig {
    /// Edge derivation tunables, also the cache key
    pub edge: EdgeParameters,
    /// Agent dimensions
    pub agent: AgentProfile,
    /// Longest edge-to-edge link (0 disables the limit)
    pub max_link_distance: f32,
    /// Links shorter than this use the permissive angles (0 disables)
    pub short_link_distance: f32,
    /// Angle tolerances for regular links
    pub standard_angles: AngleRestriction,
    /// Angle tolerances for short links
    pub permissive_angles: AngleRestriction,
    /// Rotations (degrees, about the up axis) of the drop-down search directions
    pub drop_down_angles: Vec<f32>,
    /// Weight of the downward component in drop-down search directions
    pub drop_down_steepness: f32,
    /// Longest drop-down ray
    pub max_drop_down_distance: f32,
    /// Whether drop-down links are searched at all
    pub enable_drop_down_links: bool,
    /// Whether to sweep the jump arc for obstructions before the line-of-sight test
    pub enable_jump_arc_checks: bool,
    /// Extra arc height added at the maximum link distance
    pub max_jump_arc_height: f32,
    /// Reaction to an obstructed jump arc
    pub arc_obstruction_policy: ArcObstructionPolicy,
}

impl Default for LinkGeneratorConfig {
    fn default() -> Self {
        Self {
            edge: EdgeParameters::default(),
            agent: AgentProfile::default(),
            max_link_distance: 16.0,
            short_link_distance: 2.0,
            standard_angles: AngleRestriction::STANDARD,
            permissive_angles: AngleRestriction::PERMISSIVE,
            drop_down_angles: vec![0.0, -30.0, 30.0],
            drop_down_steepness: 3.0,
            max_drop_down_distance: 20.0,
            enable_drop_down_links: true,
            enable_jump_arc_checks: false,
            max_jump_arc_height: 1.2,
            arc_obstruction_policy: ArcObstructionPolicy::default(),
        }
    }
}

impl LinkGeneratorConfig {
    /// Creates a configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_edge_parameters(mut self, edge: EdgeParameters) -> Self {
        self.edge = edge;
        self
    }

    pub fn with_agent(mut self, radius: f32, height: f32) -> Self {
        self.agent = AgentProfile { radius, height };
        self
    }

    pub fn with_max_link_distance(mut self, distance: f32) -> Self {
        self.max_link_distance = distance;
        self
    }

    pub fn with_short_link_distance(mut self, distance: f32) -> Self {
        self.short_link_distance = distance;
        self
    }

    pub fn with_standard_angles(mut self, upward: f32, forward: f32) -> Self {
        self.standard_angles = AngleRestriction::new(upward, forward);
        self
    }

    pub fn with_permissive_angles(mut self, upward: f32, forward: f32) -> Self {
        self.permissive_angles = AngleRestriction::new(upward, forward);
        self
    }

    pub fn with_drop_down(mut self, angles: Vec<f32>, steepness: f32, max_distance: f32) -> Self {
        self.drop_down_angles = angles;
        self.drop_down_steepness = steepness;
        self.max_drop_down_distance = max_distance;
        self
    }

    pub fn with_drop_down_links(mut self, enabled: bool) -> Self {
        self.enable_drop_down_links = enabled;
        self
    }

    pub fn with_jump_arc_checks(
        mut self,
        max_arc_height: f32,
        policy: ArcObstructionPolicy,
    ) -> Self {
        self.enable_jump_arc_checks = true;
        self.max_jump_arc_height = max_arc_height;
        self.arc_obstruction_policy = policy;
        self
    }

    /// Angle regime for a link of the given length
    pub fn angles_for_distance(&self, distance: f32) -> &AngleRestriction {
        if self.short_link_distance > 0.0 && distance < self.short_link_distance {
            &self.permissive_angles
        } else {
            &self.standard_angles
        }
    }

    /// Validates the configuration parameters
    pub fn validate(&self) -> Result<()> {
        self.edge.validate()?;

        check_non_negative("agent.radius", self.agent.radius)?;
        check_non_negative("agent.height", self.agent.height)?;
        check_non_negative("max_link_distance", self.max_link_distance)?;
        check_non_negative("short_link_distance", self.short_link_distance)?;
        check_non_negative("max_drop_down_distance", self.max_drop_down_distance)?;
        check_non_negative("drop_down_steepness", self.drop_down_steepness)?;
        check_non_negative("max_jump_arc_height", self.max_jump_arc_height)?;

        self.standard_angles.validate("standard")?;
        self.permissive_angles.validate("permissive")?;

        if let Some(bad) = self.drop_down_angles.iter().find(|a| !a.is_finite()) {
            return Err(Error::InvalidConfig(format!(
                "drop-down angle must be finite, got {}",
                bad
            )));
        }

        Ok(())
    }
}

fn check_non_negative(name: &str, value: f32) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(Error::InvalidConfig(format!(
            "{} must be a finite non-negative number, got {}",
            name, value
        )));
    }
    Ok(())
}
