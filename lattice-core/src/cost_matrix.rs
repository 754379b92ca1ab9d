//! C3 — Cost Matrix Builder.
//!
//! Runs one single-source Dijkstra per enumerated `(waypoint, heading)`
//! state and fills a dense `M x M` scaled-integer matrix, reusing the
//! Dijkstra scratch buffers across all `M` origins per §5's resource-bound
//! guidance.

use crate::config::LatticeParams;
use crate::dijkstra::Solver;
use crate::error::{PlanError, Result};
use crate::lattice::LatticeGraph;

/// One enumerated `(waypoint_index, heading_index)` state.
pub type StateKey = (usize, usize);

/// The dense cost matrix plus the enumeration that indexes it.
pub struct CostMatrix {
    pub matrix: Vec<i64>,
    pub m: usize,
    pub state_list: Vec<StateKey>,
}

impl CostMatrix {
    pub fn get(&self, from: usize, to: usize) -> i64 {
        self.matrix[from * self.m + to]
    }

    pub fn set(&mut self, from: usize, to: usize, value: i64) {
        self.matrix[from * self.m + to] = value;
    }
}

/// Build the list `S` of `(waypoint_index, heading_index)` states in the
/// canonical order: waypoint 0 contributes either just `start_heading_idx`
/// or every heading, every later waypoint contributes every heading.
pub fn build_state_list(n_waypoints: usize, n_headings: usize, start_heading_idx: Option<usize>) -> Vec<StateKey> {
    let mut states = Vec::new();
    match start_heading_idx {
        Some(h) => states.push((0, h)),
        None => {
            for h in 0..n_headings {
                states.push((0, h));
            }
        }
    }
    for w in 1..n_waypoints {
        for h in 0..n_headings {
            states.push((w, h));
        }
    }
    states
}

/// Compute the cost matrix over `waypoints` (grid-coordinate positions,
/// element 0 is the depot) and `headings` (radians, indexed by heading bin).
///
/// Each origin state's lattice vertex must already exist in `graph` —
/// waypoints are assumed pre-snapped to lattice positions; callers that
/// accept free-form coordinates must round them onto the lattice's
/// `node_spacing` stride before calling this.
pub fn compute_cost_matrix(
    graph: &LatticeGraph,
    waypoints: &[(f64, f64)],
    headings: &[f64],
    start_heading_idx: Option<usize>,
    params: &LatticeParams,
) -> Result<CostMatrix> {
    let state_list = build_state_list(waypoints.len(), headings.len(), start_heading_idx);
    let m = state_list.len();
    tracing::debug!(n_waypoints = waypoints.len(), m, "computing cost matrix");
    let mut matrix = vec![LatticeParams::UNREACHABLE; m * m];

    let mut solver = Solver::new(graph);

    for (k, &(wk, hk)) in state_list.iter().enumerate() {
        tracing::trace!(k, waypoint = wk, heading = hk, "running single-source dijkstra");
        let (x0, y0) = waypoints[wk];
        let theta0 = headings[hk];
        let heading_bin = crate::heading::nearest_heading_index(headings, theta0);
        let origin = graph
            .vertex_id(x0.round() as i64, y0.round() as i64, heading_bin as u16)
            .ok_or_else(|| PlanError::StartStateMissing {
                waypoint: wk,
                reason: format!("no lattice vertex at ({x0}, {y0}) heading bin {heading_bin}"),
            })?;

        let dists = solver.shortest_paths_from(graph, origin);

        for (j, &(wj, hj)) in state_list.iter().enumerate() {
            if wk == wj {
                matrix[k * m + j] = LatticeParams::UNREACHABLE;
                continue;
            }
            let (x1, y1) = waypoints[wj];
            let target_heading_bin = crate::heading::nearest_heading_index(headings, headings[hj]);
            let target = graph.vertex_id(x1.round() as i64, y1.round() as i64, target_heading_bin as u16);

            let cost = match target {
                Some(t) if dists[t as usize].is_finite() => {
                    (dists[t as usize] * params.scale).round() as i64
                }
                _ => LatticeParams::UNREACHABLE,
            };
            matrix[k * m + j] = cost;
        }
    }

    tracing::debug!(m, "cost matrix complete");

    Ok(CostMatrix { matrix, m, state_list })
}
