//! Short-edge clustering
//!
//! Rounded or finely tessellated boundaries produce runs of very short edges
//! whose anchors are near-duplicates. Connected runs of short edges are
//! replaced by a single representative; runs too small to describe a feature
//! are dropped.

use glam::Vec3;
use navlink_common::angle_between_deg;

use crate::config::EdgeParameters;
use crate::edge::Edge;

/// Connected groups of short edges, as indices into the input slice
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShortEdgeGroups {
    /// Groups with at least `min_group_size` members
    pub retained: Vec<Vec<usize>>,
    /// Groups too small to be merged
    pub discarded: Vec<Vec<usize>>,
}

/// Summary of one clustering pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct ClusterReport {
    /// Representatives produced
    pub groups_merged: usize,
    /// Groups dropped for being smaller than `min_group_size`
    pub groups_discarded: usize,
    /// Input edges removed (merged or discarded)
    pub edges_removed: usize,
}

/// Finds connected components of short edges.
///
/// Two short edges are adjacent when they share an endpoint exactly. A
/// component stops growing once it holds `max_group_size` edges; neighbours
/// that were queued but not taken stay available to later groups.
/// Representatives are never regrouped.
pub fn group_short_edges(edges: &[Edge], params: &EdgeParameters) -> ShortEdgeGroups {
    let mut groups = ShortEdgeGroups::default();
    if !params.clustering_enabled() {
        return groups;
    }

    let short: Vec<usize> = edges
        .iter()
        .enumerate()
        .filter(|(_, e)| e.length < params.min_edge_length && !e.is_representative())
        .map(|(i, _)| i)
        .collect();

    let mut visited = vec![false; edges.len()];
    let mut stack = Vec::new();

    for &seed in &short {
        if visited[seed] {
            continue;
        }

        let mut group = Vec::new();
        stack.clear();
        stack.push(seed);

        while group.len() < params.max_group_size {
            let Some(current) = stack.pop() else { break };
            if visited[current] {
                continue;
            }
            visited[current] = true;
            group.push(current);

            stack.extend(
                short
                    .iter()
                    .copied()
                    .filter(|&n| !visited[n] && edges[current].shares_endpoint(&edges[n])),
            );
        }

        if group.len() >= params.min_group_size {
            groups.retained.push(group);
        } else {
            groups.discarded.push(group);
        }
    }

    groups
}

/// Builds the edge that stands in for a group.
///
/// The member whose falloff direction is closest to the group average is
/// cloned; its falloff direction is then blended halfway toward the average.
/// Endpoints, normal and anchors of that member are kept as they are.
pub fn group_representative(edges: &[Edge], group: &[usize]) -> Option<Edge> {
    let average = group
        .iter()
        .map(|&i| edges[i].falloff_direction)
        .sum::<Vec3>()
        .normalize_or_zero();

    let mut best: Option<(usize, f32)> = None;
    for &i in group {
        let angle = angle_between_deg(average, edges[i].falloff_direction);
        if best.map_or(true, |(_, smallest)| angle < smallest) {
            best = Some((i, angle));
        }
    }

    let (seed, _) = best?;
    let mut representative = edges[seed].clone();
    representative.falloff_direction =
        (representative.falloff_direction.normalize_or_zero() + average).normalize_or_zero();
    representative.merged_count = group.iter().map(|&i| edges[i].merged_count).sum();
    Some(representative)
}

/// Replaces each retained group of short edges by its representative and
/// removes the members of discarded groups.
///
/// Untouched edges keep their order; representatives are appended.
pub fn cluster_short_edges(
    edges: Vec<Edge>,
    params: &EdgeParameters,
) -> (Vec<Edge>, ClusterReport) {
    let groups = group_short_edges(&edges, params);
    let mut report = ClusterReport::default();
    if groups.retained.is_empty() && groups.discarded.is_empty() {
        return (edges, report);
    }

    let mut removed = vec![false; edges.len()];
    let mut representatives = Vec::with_capacity(groups.retained.len());

    for group in &groups.retained {
        if let Some(representative) = group_representative(&edges, group) {
            representatives.push(representative);
            report.groups_merged += 1;
        }
        for &i in group {
            removed[i] = true;
        }
    }

    for group in &groups.discarded {
        report.groups_discarded += 1;
        for &i in group {
            removed[i] = true;
        }
    }

    report.edges_removed = removed.iter().filter(|&&r| r).count();

    let mut clustered: Vec<Edge> = edges
        .into_iter()
        .zip(removed)
        .filter(|(_, gone)| !gone)
        .map(|(edge, _)| edge)
        .collect();
    clustered.extend(representatives);

    log::debug!(
        "Short-edge clustering: {} groups merged, {} discarded, {} edges removed",
        report.groups_merged,
        report.groups_discarded,
        report.edges_removed
    );

    (clustered, report)
}
