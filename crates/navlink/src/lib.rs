//! Navigation link generation
//!
//! Augments a baked navigation mesh with links the triangulation alone cannot
//! express: jumps and walk-across shortcuts between boundary edges, and
//! drop-downs from ledges to the ground below.
//!
//! The pipeline runs in four stages:
//!
//! 1. boundary edges are extracted from the triangulation ([`extract_boundary_edges`]),
//! 2. runs of short edges are merged into representatives ([`cluster_short_edges`]),
//! 3. every ordered edge pair is searched for a valid anchor pair ([`ConnectionValidator`]),
//! 4. every edge is searched for a drop-down ([`DropDownSearcher`]).
//!
//! [`LinkGenerator`] drives a whole run against caller-owned collaborators:
//! an [`EdgeCache`], a [`VisibilityOracle`], a [`LinkRegistry`] and a
//! [`LinkPlacementSink`].

mod boundary;
mod cache;
mod clustering;
mod config;
mod context;
mod debug;
mod drop_down;
mod edge;
mod generator;
mod mesh_oracle;
mod oracle;
mod registry;
mod validator;

#[cfg(test)]
mod test_helpers;

pub use boundary::{extract_boundary_edges, BoundaryExtraction};
pub use cache::{CacheDecision, CacheUpdate, EdgeCache, ExtractionReport, Invalidation};
pub use clustering::{
    cluster_short_edges, group_representative, group_short_edges, ClusterReport, ShortEdgeGroups,
};
pub use config::{
    AgentProfile, AngleRestriction, ArcObstructionPolicy, EdgeParameters, LinkGeneratorConfig,
    MAX_DROP_DOWN_ANGLES, MIN_SPLIT_EDGE_LENGTH,
};
pub use context::{GenerationContext, LogEntry, LogLevel, ProgressInfo, TimerCategory, TimerEntry};
pub use debug::{
    highlight_edge_directions, highlight_links, DROP_DOWN_LINK_COLOR, EDGE_DIRECTION_COLOR,
    REPRESENTATIVE_DIRECTION_COLOR, STANDARD_LINK_COLOR,
};
pub use drop_down::{DropDownSearch, DropDownSearcher};
pub use edge::{Edge, MAX_ANCHORS_PER_EDGE};
pub use generator::{GenerationOutcome, GenerationReport, LinkGenerator};
pub use mesh_oracle::TriMeshOracle;
pub use oracle::{RayHit, VisibilityOracle};
pub use registry::{
    CollectingSink, Connection, InMemoryLinkRegistry, LinkHandle, LinkKind, LinkPlacementSink,
    LinkRecord, LinkRegistry,
};
pub use validator::{
    jump_arc_height, within_angle_restriction, ConnectionSearch, ConnectionValidator,
};

pub use navlink_common::debug::{Color, DebugDraw, DebugVisualize};
pub use navlink_common::{Error, Result, Triangulation};
