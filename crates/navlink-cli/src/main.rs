//! CLI utility for navigation link generation

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use navlink::{
    highlight_edge_directions, highlight_links, CollectingSink, Connection, DebugDraw, EdgeCache,
    EdgeParameters, GenerationContext, GenerationOutcome, InMemoryLinkRegistry, LinkGenerator,
    LinkGeneratorConfig, LinkKind, TriMeshOracle,
};
use navlink_common::Triangulation;

/// Extracts navigation mesh boundary edges and generates jump and drop-down links
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Log filter, e.g. "info" or "navlink=debug" (overrides RUST_LOG)
    #[clap(long, global = true)]
    log: Option<String>,

    #[clap(subcommand)]
    command: Commands,
}

/// Overrides for the edge tunables
#[derive(clap::Args, Debug, Clone, Copy)]
struct EdgeOverrides {
    /// Edges longer than this get several anchors
    #[clap(long)]
    max_edge_length: Option<f32>,

    /// Edges shorter than this are clustered (0 disables clustering)
    #[clap(long)]
    min_edge_length: Option<f32>,

    /// Largest number of short edges merged into one
    #[clap(long)]
    max_group_size: Option<usize>,

    /// Smallest group of short edges that is kept
    #[clap(long)]
    min_group_size: Option<usize>,
}

impl EdgeOverrides {
    fn apply(&self, params: &mut EdgeParameters) {
        if let Some(v) = self.max_edge_length {
            params.max_edge_length = v;
        }
        if let Some(v) = self.min_edge_length {
            params.min_edge_length = v;
        }
        if let Some(v) = self.max_group_size {
            params.max_group_size = v;
        }
        if let Some(v) = self.min_group_size {
            params.min_group_size = v;
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Extract and print the boundary edges of a mesh
    Edges {
        /// Input mesh file (OBJ format)
        #[clap(long, value_parser)]
        input: PathBuf,

        #[clap(flatten)]
        edge: EdgeOverrides,

        /// Write the edges as JSON instead of printing them
        #[clap(long, value_parser)]
        output: Option<PathBuf>,
    },

    /// Generate links for a walkable mesh
    Generate {
        /// Walkable mesh file (OBJ format)
        #[clap(long, value_parser)]
        input: PathBuf,

        /// Additional obstacle geometry (OBJ format)
        #[clap(long, value_parser)]
        obstacles: Option<PathBuf>,

        /// Generator configuration (JSON); missing fields use defaults
        #[clap(long, value_parser)]
        config: Option<PathBuf>,

        #[clap(flatten)]
        edge: EdgeOverrides,

        /// Maximum link distance (0 disables the limit)
        #[clap(long)]
        max_link_distance: Option<f32>,

        /// Skip the drop-down search
        #[clap(long)]
        no_drop_downs: bool,

        /// Output file for the links (.json or .csv)
        #[clap(long, value_parser)]
        output: Option<PathBuf>,

        /// Output file for debug lines and arrows (JSON)
        #[clap(long, value_parser)]
        debug_draw: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log.as_deref());

    match args.command {
        Commands::Edges {
            input,
            edge,
            output,
        } => print_edges(&input, edge, output.as_deref()),
        Commands::Generate {
            input,
            obstacles,
            config,
            edge,
            max_link_distance,
            no_drop_downs,
            output,
            debug_draw,
        } => {
            let mut config = load_config(config.as_deref())?;
            edge.apply(&mut config.edge);
            if let Some(distance) = max_link_distance {
                config.max_link_distance = distance;
            }
            if no_drop_downs {
                config.enable_drop_down_links = false;
            }
            generate(
                &input,
                obstacles.as_deref(),
                config,
                output.as_deref(),
                debug_draw.as_deref(),
            )
        }
    }
}

fn init_logging(filter: Option<&str>) {
    let filter = match filter {
        Some(f) => EnvFilter::new(f),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_mesh(path: &Path) -> Result<Triangulation> {
    let mesh = Triangulation::from_obj(path)
        .map_err(|e| anyhow!("Failed to load mesh {}: {}", path.display(), e))?;
    println!(
        "Loaded {}: {} vertices, {} triangles",
        path.display(),
        mesh.vertex_count(),
        mesh.triangle_count()
    );
    Ok(mesh)
}

fn load_config(path: Option<&Path>) -> Result<LinkGeneratorConfig> {
    let Some(path) = path else {
        return Ok(LinkGeneratorConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid config file: {}", path.display()))
}

fn print_edges(input: &Path, overrides: EdgeOverrides, output: Option<&Path>) -> Result<()> {
    let mesh = load_mesh(input)?;
    let mut params = EdgeParameters::default();
    overrides.apply(&mut params);
    params.validate()?;

    let (cache, report) = EdgeCache::build(&params, &mesh)?;
    println!(
        "{} boundary edges, {} degenerate, {} short-edge groups merged, {} discarded",
        report.boundary_edges,
        report.degenerate_edges,
        report.clustering.groups_merged,
        report.clustering.groups_discarded
    );

    if let Some(path) = output {
        let file = File::create(path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), cache.edges())?;
        println!("Saved {} edges to {}", cache.edges().len(), path.display());
        return Ok(());
    }

    for (i, edge) in cache.edges().iter().enumerate() {
        let falloff = edge.falloff_direction;
        println!(
            "{}: ({:.3},{:.3},{:.3}) -> ({:.3},{:.3},{:.3}) len={:.3} anchors={} \
             falloff=({:.3},{:.3},{:.3}){}",
            i,
            edge.start.x,
            edge.start.y,
            edge.start.z,
            edge.end.x,
            edge.end.y,
            edge.end.z,
            edge.length,
            edge.anchor_count(),
            falloff.x,
            falloff.y,
            falloff.z,
            if edge.is_representative() { " merged" } else { "" }
        );
    }
    Ok(())
}

fn generate(
    input: &Path,
    obstacles: Option<&Path>,
    config: LinkGeneratorConfig,
    output: Option<&Path>,
    debug_draw: Option<&Path>,
) -> Result<()> {
    let mesh = load_mesh(input)?;

    // The walkable mesh itself blocks rays too, so drop-downs can land on it
    let mut oracle = TriMeshOracle::new(&mesh)?;
    if let Some(path) = obstacles {
        oracle.extend(&load_mesh(path)?)?;
    }

    let generator = LinkGenerator::new(config);
    let mut cache = EdgeCache::new();
    let mut registry = InMemoryLinkRegistry::new();
    let mut sink = CollectingSink::new();
    let mut ctx = GenerationContext::new();

    let outcome = generator.generate(
        &mut cache,
        &mesh,
        &oracle,
        &mut registry,
        &mut sink,
        &mut ctx,
    )?;
    let report = match outcome {
        GenerationOutcome::NothingToDo => {
            println!("No boundary edges found, nothing to do");
            return Ok(());
        }
        GenerationOutcome::Completed(report) => report,
    };

    println!(
        "{} edges: {} standard links, {} drop-down links \
         ({} inconclusive checks, {} placement failures)",
        report.edges,
        report.standard_links,
        report.drop_down_links,
        report.inconclusive_checks,
        report.placement_failures
    );
    print!("{}", ctx.timer_summary());

    if let Some(path) = debug_draw {
        let mut draw = DebugDraw::new();
        highlight_edge_directions(cache.edges(), 1.0, &mut draw);
        highlight_links(sink.connections(), &mut draw);
        let file = File::create(path)
            .with_context(|| format!("Failed to create debug draw file: {}", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &draw)?;
        println!("Saved {} debug primitives to {}", draw.primitive_count(), path.display());
    }

    let connections = sink.into_connections();
    match output {
        Some(path) => save_connections(path, &connections)?,
        None => {
            for connection in &connections {
                println!("{}", csv_row(connection));
            }
        }
    }

    Ok(())
}

fn save_connections(path: &Path, connections: &[Connection]) -> Result<()> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase());

    let file = File::create(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    match extension.as_deref() {
        Some("json") => serde_json::to_writer_pretty(&mut writer, connections)?,
        Some("csv") => {
            writeln!(writer, "{}", CSV_HEADER)?;
            for connection in connections {
                writeln!(writer, "{}", csv_row(connection))?;
            }
        }
        _ => bail!("Unsupported output format for {} (use .json or .csv)", path.display()),
    }
    writer.flush()?;

    println!("Saved {} links to {}", connections.len(), path.display());
    Ok(())
}

const CSV_HEADER: &str = "kind,start_x,start_y,start_z,end_x,end_y,end_z,source_edge,target_edge";

fn csv_row(connection: &Connection) -> String {
    let kind = match connection.kind {
        LinkKind::Standard => "standard",
        LinkKind::DropDown => "drop_down",
    };
    let target = connection
        .target_edge
        .map(|t| t.to_string())
        .unwrap_or_default();
    format!(
        "{},{},{},{},{},{},{},{},{}",
        kind,
        connection.start.x,
        connection.start.y,
        connection.start.z,
        connection.end.x,
        connection.end.y,
        connection.end.z,
        connection.source_edge,
        target
    )
}
