use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lattice_core::{PrecomputeRequest, WaypointsRequest};
use std::path::PathBuf;

mod progress;

use progress::TracingProgressSink;

#[derive(Parser)]
#[command(name = "lattice-cli")]
#[command(about = "State-lattice planner kernel: precompute a lattice, then optimize a tour over it", long_about = None)]
struct Cli {
    /// Log format: "text" or "json"
    #[arg(long, global = true, default_value = "text")]
    log_format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the state-lattice graph from an occupancy map and cache it.
    Precompute {
        /// JSON file holding a `PrecomputeRequest`
        request: PathBuf,
        /// Output lattice container file
        output: PathBuf,
    },
    /// Solve an open tour over waypoints against a precomputed lattice.
    Optimize {
        /// JSON file holding a `PrecomputeRequest` (map, for the occupancy grid)
        map_request: PathBuf,
        /// Lattice container produced by `precompute`
        lattice: PathBuf,
        /// JSON file holding a `WaypointsRequest`
        waypoints_request: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_format);

    match cli.command {
        Commands::Precompute { request, output } => run_precompute(&request, &output),
        Commands::Optimize {
            map_request,
            lattice,
            waypoints_request,
        } => run_optimize(&map_request, &lattice, &waypoints_request),
    }
}

fn run_precompute(request_path: &PathBuf, output_path: &PathBuf) -> Result<()> {
    let request: PrecomputeRequest = read_json(request_path)?;
    let sink = TracingProgressSink;

    let (_grid, graph) = lattice_core::precompute(&request, &sink).context("building lattice")?;

    lattice_core::persist::write_lattice(output_path, &graph)
        .with_context(|| format!("writing lattice to {}", output_path.display()))?;

    tracing::info!(
        vertices = graph.n_vertices(),
        edges = graph.edges.len(),
        output = %output_path.display(),
        "lattice written"
    );
    Ok(())
}

fn run_optimize(map_request_path: &PathBuf, lattice_path: &PathBuf, waypoints_request_path: &PathBuf) -> Result<()> {
    let map_request: PrecomputeRequest = read_json(map_request_path)?;
    let waypoints_request: WaypointsRequest = read_json(waypoints_request_path)?;
    let params = map_request.params.unwrap_or_default();

    let grid = lattice_core::OccupancyGrid::from_flat(
        &map_request.map,
        map_request.info.width,
        map_request.info.height,
    )
    .context("loading occupancy grid")?;

    let lattice = lattice_core::persist::read_lattice(lattice_path)
        .with_context(|| format!("reading lattice from {}", lattice_path.display()))?;

    let sink = TracingProgressSink;
    let result = lattice_core::optimize(&grid, &lattice, &waypoints_request, &params, &sink)
        .context("solving tour")?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &PathBuf) -> Result<T> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {} as JSON", path.display()))
}

/// Initialize structured logging with tracing.
///
/// `log_format`: "text" for human-readable, "json" for structured JSON
/// lines. Respects `RUST_LOG` (default: `info`).
fn init_tracing(log_format: &str) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match log_format {
        "json" => {
            fmt().json().with_env_filter(filter).with_target(true).init();
        }
        _ => {
            fmt().with_env_filter(filter).with_target(false).init();
        }
    }
}
