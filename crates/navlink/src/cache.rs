//! Cached edge sets and their invalidation
//!
//! Extraction and clustering only depend on the triangulation and the four
//! edge tunables, so an [`EdgeCache`] remembers both and is reused until one
//! of them changes. The caller owns the cache; deciding whether it is stale
//! is a pure function of the cache and the current inputs.

use glam::Vec3;
use navlink_common::{Result, Triangulation};

use crate::boundary::extract_boundary_edges;
use crate::clustering::{cluster_short_edges, ClusterReport};
use crate::config::EdgeParameters;
use crate::edge::Edge;

/// Edges from the last extraction plus the inputs they were derived from
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct EdgeCache {
    edges: Vec<Edge>,
    parameters: Option<EdgeParameters>,
    vertices: Vec<Vec3>,
}

/// Why cached edges cannot be reused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum Invalidation {
    /// Nothing has been extracted yet, or the last extraction found nothing
    Empty,
    /// One of the edge tunables differs from the snapshot
    ParametersChanged,
    /// The triangulation's vertices differ from the snapshot
    VerticesChanged,
}

/// Verdict on a cache for the current inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheDecision {
    Reuse,
    Recompute(Invalidation),
}

/// Statistics of a fresh extraction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct ExtractionReport {
    /// Boundary edges found before clustering
    pub boundary_edges: usize,
    /// Boundary edges dropped as degenerate
    pub degenerate_edges: usize,
    pub clustering: ClusterReport,
}

/// Result of refreshing a cache
#[derive(Debug, Clone)]
pub enum CacheUpdate {
    /// The existing cache is still valid
    Reuse,
    /// A replacement cache built from scratch
    Recompute {
        cache: EdgeCache,
        reason: Invalidation,
        report: ExtractionReport,
    },
}

impl EdgeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached edges
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Tunables the edges were derived with
    pub fn parameters(&self) -> Option<&EdgeParameters> {
        self.parameters.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Drops everything, forcing the next run to re-extract
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Decides whether the cached edges are still valid for these inputs
    pub fn evaluate(
        &self,
        params: &EdgeParameters,
        triangulation: &Triangulation,
    ) -> CacheDecision {
        if self.edges.is_empty() {
            return CacheDecision::Recompute(Invalidation::Empty);
        }
        if self.parameters.as_ref() != Some(params) {
            return CacheDecision::Recompute(Invalidation::ParametersChanged);
        }
        if vertices_changed(&self.vertices, triangulation) {
            return CacheDecision::Recompute(Invalidation::VerticesChanged);
        }
        CacheDecision::Reuse
    }

    /// Runs extraction and clustering from scratch
    pub fn build(
        params: &EdgeParameters,
        triangulation: &Triangulation,
    ) -> Result<(Self, ExtractionReport)> {
        let extraction = extract_boundary_edges(triangulation, params)?;
        let boundary_edges = extraction.edges.len();
        let (edges, clustering) = cluster_short_edges(extraction.edges, params);

        let report = ExtractionReport {
            boundary_edges,
            degenerate_edges: extraction.degenerate,
            clustering,
        };
        let cache = Self {
            edges,
            parameters: Some(*params),
            vertices: triangulation.positions(),
        };
        Ok((cache, report))
    }

    /// Evaluates the cache and rebuilds it when stale
    pub fn refresh(
        &self,
        params: &EdgeParameters,
        triangulation: &Triangulation,
    ) -> Result<CacheUpdate> {
        match self.evaluate(params, triangulation) {
            CacheDecision::Reuse => Ok(CacheUpdate::Reuse),
            CacheDecision::Recompute(reason) => {
                let (cache, report) = Self::build(params, triangulation)?;
                Ok(CacheUpdate::Recompute {
                    cache,
                    reason,
                    report,
                })
            }
        }
    }
}

fn vertices_changed(snapshot: &[Vec3], triangulation: &Triangulation) -> bool {
    if snapshot.len() != triangulation.vertex_count() {
        return true;
    }
    snapshot
        .iter()
        .enumerate()
        .any(|(i, p)| triangulation.vertex(i) != Some(*p))
}
