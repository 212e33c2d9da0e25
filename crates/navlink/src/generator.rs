//! Link generation run
//!
//! [`LinkGenerator`] ties the pipeline together: it refreshes the caller's
//! [`EdgeCache`], searches every ordered edge pair for a direct connection,
//! searches each edge for a drop-down and hands accepted connections to the
//! placement sink before registering them.

use navlink_common::{Error, Result, Triangulation};

use crate::cache::{CacheUpdate, EdgeCache, ExtractionReport, Invalidation};
use crate::config::LinkGeneratorConfig;
use crate::context::{GenerationContext, TimerCategory};
use crate::drop_down::{DropDownSearch, DropDownSearcher};
use crate::edge::Edge;
use crate::oracle::VisibilityOracle;
use crate::registry::{Connection, LinkKind, LinkPlacementSink, LinkRecord, LinkRegistry};
use crate::validator::{ConnectionSearch, ConnectionValidator};

/// Statistics of a completed generation run
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct GenerationReport {
    /// Edges the run searched
    pub edges: usize,
    /// Whether the cached edges were reused
    pub reused_cache: bool,
    /// Why the cache was rebuilt, if it was
    pub invalidation: Option<Invalidation>,
    /// Extraction statistics when the cache was rebuilt
    pub extraction: Option<ExtractionReport>,
    /// Ordered edge pairs handed to the validator
    pub edge_pairs_searched: usize,
    /// Ordered edge pairs skipped because a link already joins them
    pub edge_pairs_already_linked: usize,
    /// Edge pairs given up on because of an obstructed jump arc
    pub edge_pairs_abandoned: usize,
    pub standard_links: usize,
    pub drop_down_links: usize,
    /// Drop-down hits that were already linked
    pub drop_downs_already_linked: usize,
    /// Anchor pairs or drop-down rays the oracle could not answer
    pub inconclusive_checks: usize,
    /// Accepted connections the sink failed to place
    pub placement_failures: usize,
}

impl GenerationReport {
    /// Links placed during the run
    pub fn links_created(&self) -> usize {
        self.standard_links + self.drop_down_links
    }
}

/// Outcome of a generation run
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutcome {
    Completed(GenerationReport),
    /// The triangulation has no usable boundary edges
    NothingToDo,
}

impl GenerationOutcome {
    pub fn report(&self) -> Option<&GenerationReport> {
        match self {
            GenerationOutcome::Completed(report) => Some(report),
            GenerationOutcome::NothingToDo => None,
        }
    }
}

/// Builder-style driver for link generation
#[derive(Debug, Clone, Default)]
pub struct LinkGenerator {
    config: LinkGeneratorConfig,
}

impl LinkGenerator {
    pub fn new(config: LinkGeneratorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LinkGeneratorConfig {
        &self.config
    }

    /// Runs the full pipeline over `triangulation`.
    ///
    /// Configuration problems and a malformed triangulation are returned as
    /// errors before the cache, registry or sink is touched. Failures local
    /// to one anchor pair or one placement are counted in the report and the
    /// run carries on.
    pub fn generate<O, R, S>(
        &self,
        cache: &mut EdgeCache,
        triangulation: &Triangulation,
        oracle: &O,
        registry: &mut R,
        sink: &mut S,
        ctx: &mut GenerationContext,
    ) -> Result<GenerationOutcome>
    where
        O: VisibilityOracle + ?Sized,
        R: LinkRegistry + ?Sized,
        S: LinkPlacementSink + ?Sized,
    {
        self.config.validate()?;
        triangulation.validate()?;
        self.check_sink(sink)?;

        ctx.start_timer(TimerCategory::Total);
        let outcome = self.run(cache, triangulation, oracle, registry, sink, ctx);
        ctx.stop_timer(TimerCategory::Total);
        ctx.clear_progress();
        outcome
    }

    fn check_sink<S: LinkPlacementSink + ?Sized>(&self, sink: &S) -> Result<()> {
        if !sink.supports(LinkKind::Standard) {
            return Err(Error::MissingConfiguration(
                "placement sink cannot place standard links".to_string(),
            ));
        }
        if self.config.enable_drop_down_links && !sink.supports(LinkKind::DropDown) {
            return Err(Error::MissingConfiguration(
                "drop-down links are enabled but the placement sink cannot place them".to_string(),
            ));
        }
        Ok(())
    }

    fn run<O, R, S>(
        &self,
        cache: &mut EdgeCache,
        triangulation: &Triangulation,
        oracle: &O,
        registry: &mut R,
        sink: &mut S,
        ctx: &mut GenerationContext,
    ) -> Result<GenerationOutcome>
    where
        O: VisibilityOracle + ?Sized,
        R: LinkRegistry + ?Sized,
        S: LinkPlacementSink + ?Sized,
    {
        let mut report = GenerationReport::default();

        let update = ctx.timed(TimerCategory::Extraction, |_| {
            cache.refresh(&self.config.edge, triangulation)
        })?;
        match update {
            CacheUpdate::Reuse => {
                report.reused_cache = true;
                ctx.log_debug(format!("Reusing {} cached edges", cache.edges().len()));
            }
            CacheUpdate::Recompute {
                cache: fresh,
                reason,
                report: extraction,
            } => {
                ctx.log_info(format!(
                    "Extracted {} edges ({:?}): {} boundary, {} degenerate, {} groups merged",
                    fresh.edges().len(),
                    reason,
                    extraction.boundary_edges,
                    extraction.degenerate_edges,
                    extraction.clustering.groups_merged
                ));
                *cache = fresh;
                report.invalidation = Some(reason);
                report.extraction = Some(extraction);
            }
        }

        let edges = cache.edges();
        if edges.is_empty() {
            ctx.log_info("No boundary edges found, nothing to do");
            return Ok(GenerationOutcome::NothingToDo);
        }
        report.edges = edges.len();

        let validator = ConnectionValidator::new(&self.config, oracle);
        let searcher = DropDownSearcher::new(&self.config, oracle);

        for (source_index, source) in edges.iter().enumerate() {
            ctx.set_progress(
                source_index,
                edges.len(),
                format!("Edge {} of {}", source_index + 1, edges.len()),
            );

            ctx.start_timer(TimerCategory::ConnectionSearch);
            for (target_index, target) in edges.iter().enumerate() {
                if target_index == source_index {
                    continue;
                }
                self.connect_pair(
                    (source_index, source),
                    (target_index, target),
                    &validator,
                    registry,
                    sink,
                    &mut report,
                );
            }
            ctx.stop_timer(TimerCategory::ConnectionSearch);

            if self.config.enable_drop_down_links {
                ctx.start_timer(TimerCategory::DropDownSearch);
                self.drop_down(source_index, source, &searcher, registry, sink, &mut report);
                ctx.stop_timer(TimerCategory::DropDownSearch);
            }
        }

        if report.placement_failures > 0 {
            ctx.log_warning(format!("{} links could not be placed", report.placement_failures));
        }
        ctx.log_info(format!(
            "Generated {} standard and {} drop-down links from {} edges",
            report.standard_links, report.drop_down_links, report.edges
        ));

        Ok(GenerationOutcome::Completed(report))
    }

    fn connect_pair<O, R, S>(
        &self,
        (source_index, source): (usize, &Edge),
        (target_index, target): (usize, &Edge),
        validator: &ConnectionValidator<'_, O>,
        registry: &mut R,
        sink: &mut S,
        report: &mut GenerationReport,
    ) where
        O: VisibilityOracle + ?Sized,
        R: LinkRegistry + ?Sized,
        S: LinkPlacementSink + ?Sized,
    {
        let (Some(&a), Some(&b)) = (
            source.connection_points.first(),
            target.connection_points.first(),
        ) else {
            return;
        };
        if registry.exists(a, b) {
            report.edge_pairs_already_linked += 1;
            return;
        }

        report.edge_pairs_searched += 1;
        match validator.find_connection(source, target, &*registry) {
            ConnectionSearch::Found {
                source_anchor,
                target_anchor,
            } => {
                let connection = Connection {
                    start: source.connection_points[source_anchor],
                    end: target.connection_points[target_anchor],
                    kind: LinkKind::Standard,
                    source_edge: source_index,
                    target_edge: Some(target_index),
                };
                if place_and_register(&connection, registry, sink) {
                    report.standard_links += 1;
                } else {
                    report.placement_failures += 1;
                }
            }
            ConnectionSearch::NotFound { inconclusive } => {
                report.inconclusive_checks += inconclusive;
            }
            ConnectionSearch::Abandoned { .. } => {
                report.edge_pairs_abandoned += 1;
            }
        }
    }

    fn drop_down<O, R, S>(
        &self,
        source_index: usize,
        source: &Edge,
        searcher: &DropDownSearcher<'_, O>,
        registry: &mut R,
        sink: &mut S,
        report: &mut GenerationReport,
    ) where
        O: VisibilityOracle + ?Sized,
        R: LinkRegistry + ?Sized,
        S: LinkPlacementSink + ?Sized,
    {
        match searcher.search(source, &*registry) {
            DropDownSearch::Found { start, end, angle } => {
                log::debug!("Drop-down from edge {} at {} degrees", source_index, angle);
                let connection = Connection {
                    start,
                    end,
                    kind: LinkKind::DropDown,
                    source_edge: source_index,
                    target_edge: None,
                };
                if place_and_register(&connection, registry, sink) {
                    report.drop_down_links += 1;
                } else {
                    report.placement_failures += 1;
                }
            }
            DropDownSearch::AlreadyLinked { .. } => report.drop_downs_already_linked += 1,
            DropDownSearch::NoGround { inconclusive } => report.inconclusive_checks += inconclusive,
            DropDownSearch::NoAnchor => {}
        }
    }
}

fn place_and_register<R, S>(connection: &Connection, registry: &mut R, sink: &mut S) -> bool
where
    R: LinkRegistry + ?Sized,
    S: LinkPlacementSink + ?Sized,
{
    match sink.place(connection) {
        Ok(handle) => {
            registry.register(LinkRecord {
                start: connection.start,
                end: connection.end,
                handle,
                was_generated: true,
            });
            true
        }
        Err(e) => {
            log::warn!(
                "Failed to place {:?} link from edge {}: {}",
                connection.kind,
                connection.source_edge,
                e
            );
            false
        }
    }
}
