//! C4 — Tour Solver & Path Assembler.
//!
//! Generalizes `butterfly-route`'s flat-matrix nearest-neighbor + 2-opt
//! solver (`step9::trip::solve_tsp`) to the state-lattice's per-waypoint
//! heading disjunction: each waypoint is a *cluster* of candidate states,
//! exactly one of which the tour must visit. Where the original OR-Tools
//! model expresses this with `RoutingModel::AddDisjunction`, here cluster
//! membership is enforced structurally (the greedy construction and 2-opt
//! both move whole clusters) and a per-position "state reoptimization" pass
//! plays the role of the disjunction — picking, for each waypoint's fixed
//! neighbors in the tour, the cheapest heading-state.

use crate::config::LatticeParams;
use crate::cost_matrix::CostMatrix;
use crate::dijkstra::Solver;
use crate::error::{PlanError, Result};
use crate::lattice::LatticeGraph;

/// The tour as a sequence of state indices (positions in the cost matrix's
/// enumeration), the corresponding waypoint visit order, and the raw
/// (unmodified-matrix) total cost.
#[derive(Debug, Clone)]
pub struct TourSolution {
    pub state_order: Vec<usize>,
    pub waypoint_order: Vec<usize>,
    pub raw_cost: i64,
}

const MAX_ITERATIONS: usize = 200;

/// Solve the open-tour problem rooted at waypoint 0 (the depot).
///
/// There is no "return to depot" transform to apply here — unlike a
/// single-vehicle OR-Tools model, this solver builds an open path directly,
/// so the zeroed-return-column trick the reference uses to fake an open
/// tour inside a cycle-based solver has no counterpart: an open path is
/// just never given a final arc back to the depot.
pub fn solve_tour(cost: &CostMatrix) -> Result<TourSolution> {
    let clusters = cluster_by_waypoint(cost);
    let n = clusters.len();
    tracing::debug!(n_waypoints = n, m = cost.m, "solving open tour");

    if n == 0 {
        return Err(PlanError::NoSolution);
    }
    if n == 1 {
        return Ok(TourSolution {
            state_order: vec![clusters[0][0]],
            waypoint_order: vec![0],
            raw_cost: 0,
        });
    }

    let greedy = build_greedy(cost, &clusters);
    if greedy.len() < n {
        return Err(PlanError::NoSolution);
    }

    let mut order = greedy;
    let mut best_cost = tour_cost(cost, &order);

    for iteration in 0..MAX_ITERATIONS {
        let (improved_order, improved_cost, changed_2opt) = two_opt_pass(cost, &order, best_cost);
        let (reopt_order, reopt_cost, changed_reopt) =
            reoptimize_states_pass(cost, &clusters, &improved_order, improved_cost);

        order = reopt_order;
        best_cost = reopt_cost;

        if !changed_2opt && !changed_reopt {
            tracing::trace!(iteration, cost = best_cost, "tour local search converged");
            break;
        }
    }

    if best_cost >= LatticeParams::UNREACHABLE {
        tracing::debug!("tour solver found no feasible tour");
        return Err(PlanError::NoSolution);
    }

    tracing::debug!(cost = best_cost, "tour solved");

    let waypoint_order = order.iter().map(|&s| cost.state_list[s].0).collect();

    Ok(TourSolution {
        state_order: order,
        waypoint_order,
        raw_cost: best_cost,
    })
}

fn cluster_by_waypoint(cost: &CostMatrix) -> Vec<Vec<usize>> {
    let n_waypoints = cost.state_list.iter().map(|(w, _)| *w).max().map(|m| m + 1).unwrap_or(0);
    let mut clusters = vec![Vec::new(); n_waypoints];
    for (idx, &(w, _)) in cost.state_list.iter().enumerate() {
        clusters[w].push(idx);
    }
    clusters
}

/// Nearest-neighbor greedy construction over clusters: always advance to
/// the cheapest reachable state belonging to any unvisited waypoint.
fn build_greedy(cost: &CostMatrix, clusters: &[Vec<usize>]) -> Vec<usize> {
    let n = clusters.len();
    let mut visited = vec![false; n];
    let mut order = Vec::with_capacity(n);

    let mut current = clusters[0][0];
    order.push(current);
    visited[0] = true;

    for _ in 1..n {
        let mut best: Option<(usize, usize, i64)> = None;
        for (ci, cluster) in clusters.iter().enumerate() {
            if visited[ci] {
                continue;
            }
            for &s in cluster {
                let c = cost.get(current, s);
                if c >= LatticeParams::UNREACHABLE {
                    continue;
                }
                if best.map(|(_, _, bc)| c < bc).unwrap_or(true) {
                    best = Some((ci, s, c));
                }
            }
        }

        match best {
            Some((ci, s, _)) => {
                visited[ci] = true;
                order.push(s);
                current = s;
            }
            None => {
                // Nothing reachable from `current`; append remaining clusters
                // in index order as an unreachable fallback so the caller can
                // still report which waypoints failed to connect.
                for (ci, cluster) in clusters.iter().enumerate() {
                    if !visited[ci] {
                        visited[ci] = true;
                        order.push(cluster[0]);
                    }
                }
                break;
            }
        }
    }

    order
}

fn tour_cost(cost: &CostMatrix, order: &[usize]) -> i64 {
    order
        .windows(2)
        .map(|w| cost.get(w[0], w[1]))
        .fold(0i64, |acc, c| {
            if acc >= LatticeParams::UNREACHABLE || c >= LatticeParams::UNREACHABLE {
                LatticeParams::UNREACHABLE
            } else {
                acc + c
            }
        })
}

/// Segment-reversal 2-opt over cluster positions (waypoint 0 stays fixed
/// at position 0, since it is the depot).
fn two_opt_pass(cost: &CostMatrix, order: &[usize], current_cost: i64) -> (Vec<usize>, i64, bool) {
    let n = order.len();
    let mut best_order = order.to_vec();
    let mut best_cost = current_cost;
    let mut changed = false;

    for i in 1..n.saturating_sub(1) {
        for j in (i + 1)..n {
            let mut candidate = best_order.clone();
            candidate[i..=j].reverse();
            let candidate_cost = tour_cost(cost, &candidate);
            if candidate_cost < best_cost {
                best_order = candidate;
                best_cost = candidate_cost;
                changed = true;
            }
        }
    }

    (best_order, best_cost, changed)
}

/// For each non-depot waypoint, fix its neighbors in the current order and
/// pick the cheapest state in its cluster — the local-search stand-in for
/// the reference's `AddDisjunction` over heading-indexed states.
fn reoptimize_states_pass(
    cost: &CostMatrix,
    clusters: &[Vec<usize>],
    order: &[usize],
    current_cost: i64,
) -> (Vec<usize>, i64, bool) {
    let mut order = order.to_vec();
    let mut changed = false;

    for pos in 1..order.len() {
        let waypoint = cost.state_list[order[pos]].0;
        let cluster = &clusters[waypoint];
        if cluster.len() <= 1 {
            continue;
        }

        let prev = order[pos - 1];
        let next = order.get(pos + 1).copied();

        let mut best_state = order[pos];
        let mut best_local_cost = edge_pair_cost(cost, prev, order[pos], next);

        for &candidate in cluster {
            let c = edge_pair_cost(cost, prev, candidate, next);
            if c < best_local_cost {
                best_local_cost = c;
                best_state = candidate;
            }
        }

        if best_state != order[pos] {
            order[pos] = best_state;
            changed = true;
        }
    }

    let new_cost = if changed { tour_cost(cost, &order) } else { current_cost };
    (order, new_cost, changed)
}

fn edge_pair_cost(cost: &CostMatrix, prev: usize, state: usize, next: Option<usize>) -> i64 {
    let in_cost = cost.get(prev, state);
    let out_cost = next.map(|n| cost.get(state, n)).unwrap_or(0);
    if in_cost >= LatticeParams::UNREACHABLE || out_cost >= LatticeParams::UNREACHABLE {
        LatticeParams::UNREACHABLE
    } else {
        in_cost + out_cost
    }
}

/// A single reconstructed path segment between two consecutive tour states.
#[derive(Debug, Clone)]
pub struct PathSegment {
    pub points: Vec<(f64, f64)>,
    pub cost: f64,
}

/// The full assembled path: per-segment detail plus the concatenated
/// polyline and summed cost.
#[derive(Debug, Clone)]
pub struct AssembledPath {
    pub segments: Vec<PathSegment>,
    pub path_points: Vec<(f64, f64)>,
    pub total_cost: f64,
}

/// Re-run shortest path between every consecutive pair of tour states and
/// concatenate the resulting polyline.
pub fn assemble_path(
    graph: &LatticeGraph,
    waypoints: &[(f64, f64)],
    headings: &[f64],
    state_list: &[(usize, usize)],
    tour: &[usize],
) -> Result<AssembledPath> {
    let mut solver = Solver::new(graph);
    let mut segments = Vec::with_capacity(tour.len().saturating_sub(1));
    let mut path_points = Vec::new();
    let mut total_cost = 0.0;

    for pair in tour.windows(2) {
        let (w_from, h_from) = state_list[pair[0]];
        let (w_to, h_to) = state_list[pair[1]];

        let (fx, fy) = waypoints[w_from];
        let from_bin = crate::heading::nearest_heading_index(headings, headings[h_from]);
        let from_vertex = graph
            .vertex_id(fx.round() as i64, fy.round() as i64, from_bin as u16)
            .ok_or(PlanError::NoPath { from: pair[0], to: pair[1] })?;

        let (tx, ty) = waypoints[w_to];
        let to_bin = crate::heading::nearest_heading_index(headings, headings[h_to]);
        let to_vertex = graph
            .vertex_id(tx.round() as i64, ty.round() as i64, to_bin as u16)
            .ok_or(PlanError::NoPath { from: pair[0], to: pair[1] })?;

        let dists = solver.shortest_paths_from(graph, from_vertex);
        if !dists[to_vertex as usize].is_finite() {
            return Err(PlanError::NoPath { from: pair[0], to: pair[1] });
        }
        let vertex_path = solver
            .path_to(from_vertex, to_vertex)
            .ok_or(PlanError::NoPath { from: pair[0], to: pair[1] })?;

        let points: Vec<(f64, f64)> = vertex_path
            .iter()
            .map(|&v| {
                let key = graph.vertices[v as usize];
                (key.ix as f64, key.iy as f64)
            })
            .collect();

        let seg_cost = dists[to_vertex as usize];
        total_cost += seg_cost;

        if path_points.last() == points.first() {
            path_points.extend(points.iter().skip(1));
        } else {
            path_points.extend(points.iter());
        }

        segments.push(PathSegment { points, cost: seg_cost });
    }

    Ok(AssembledPath {
        segments,
        path_points,
        total_cost,
    })
}
