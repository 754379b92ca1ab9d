//! C5 — public API surface: the two pure operations the kernel exposes,
//! mirroring the reference's `precompute_graph` / `optimize_waypoints`
//! request/response shapes (`PrecomputeRequest`, `WaypointsRequest`).

use crate::config::LatticeParams;
use crate::cost_matrix::compute_cost_matrix;
use crate::error::Result;
use crate::grid::OccupancyGrid;
use crate::heading::{heading_set, nearest_heading_index};
use crate::lattice::{build_lattice, LatticeGraph};
use crate::progress::{ProcessType, ProgressSink};
use crate::tour::{assemble_path, solve_tour};
use serde::{Deserialize, Serialize};

/// Occupancy-grid metadata, matching the reference's `info` sub-object.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MapMetaData {
    pub width: usize,
    pub height: usize,
    pub resolution: f64,
    pub origin: Point,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrecomputeRequest {
    pub info: MapMetaData,
    pub map: Vec<i64>,
    #[serde(default)]
    pub params: Option<LatticeParams>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaypointsRequest {
    pub info: MapMetaData,
    pub start_heading: f64,
    pub waypoints: Vec<Point>,
}

/// One chosen `(position, heading)` visit in the solved tour.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SolutionState {
    pub x: f64,
    pub y: f64,
    pub theta: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TourResult {
    pub distance: f64,
    pub waypoint_order: Vec<usize>,
    pub solution_array: Vec<SolutionState>,
    pub path_points: Vec<Point>,
}

/// Load the occupancy grid and build the state lattice over it.
pub fn precompute(request: &PrecomputeRequest, progress: &dyn ProgressSink) -> Result<(OccupancyGrid, LatticeGraph)> {
    let grid = OccupancyGrid::from_flat(&request.map, request.info.width, request.info.height)?;
    progress.update(
        ProcessType::Precomputation,
        25,
        &format!("Loaded map ({}x{})", request.info.height, request.info.width),
        None,
    );

    let params = request.params.unwrap_or_default();
    let lattice = build_lattice(&grid, &params, progress);

    progress.update(ProcessType::Precomputation, 100, "Lattice ready", None);

    Ok((grid, lattice))
}

/// Solve an open tour over `request.waypoints` (element 0 is the depot) and
/// reconstruct the path.
pub fn optimize(
    _grid: &OccupancyGrid,
    lattice: &LatticeGraph,
    request: &WaypointsRequest,
    params: &LatticeParams,
    progress: &dyn ProgressSink,
) -> Result<TourResult> {
    let headings = heading_set(params.n_headings);
    let start_heading_idx = nearest_heading_index(&headings, request.start_heading.rem_euclid(std::f64::consts::TAU));

    let waypoints: Vec<(f64, f64)> = request.waypoints.iter().map(|p| (p.x, p.y)).collect();

    progress.update(ProcessType::Optimization, 10, "Computing cost matrix...", None);
    let cost = compute_cost_matrix(lattice, &waypoints, &headings, Some(start_heading_idx), params)?;

    progress.update(ProcessType::Optimization, 50, "Solving tour...", None);
    let solution = solve_tour(&cost)?;

    progress.update(ProcessType::Optimization, 75, "Assembling path...", None);
    let assembled = assemble_path(lattice, &waypoints, &headings, &cost.state_list, &solution.state_order)?;

    let solution_array = solution
        .state_order
        .iter()
        .map(|&s| {
            let (w, h) = cost.state_list[s];
            let (x, y) = waypoints[w];
            SolutionState { x, y, theta: headings[h] }
        })
        .collect();

    let distance = assembled.total_cost * request.info.resolution;

    progress.update(ProcessType::Optimization, 100, "Done", None);

    Ok(TourResult {
        distance,
        waypoint_order: solution.waypoint_order,
        solution_array,
        path_points: assembled.path_points.into_iter().map(|(x, y)| Point { x, y }).collect(),
    })
}
