//! C3 helper — single-source Dijkstra over a [`LatticeGraph`].
//!
//! The cost matrix needs one run per origin state, so the scratch arrays
//! are owned by a reusable [`Solver`] instead of being allocated per call,
//! following the repeated-query pattern in `butterfly-route`'s
//! `step9::query` module.

use crate::lattice::LatticeGraph;
use priority_queue::PriorityQueue;
use std::cmp::Reverse;

/// Fixed-point cost unit used internally; costs are floats in the lattice
/// but Dijkstra wants a total order unaffected by NaN, so distances are
/// scaled and rounded to `u64` millicost before insertion into the heap.
const SCALE: f64 = 1_000.0;

pub struct Solver {
    dist: Vec<u64>,
    parent: Vec<u32>,
    visited: Vec<bool>,
    queue: PriorityQueue<u32, Reverse<u64>>,
}

const NO_PARENT: u32 = u32::MAX;

impl Solver {
    pub fn new(graph: &LatticeGraph) -> Self {
        let n = graph.n_vertices();
        Self {
            dist: vec![u64::MAX; n],
            parent: vec![NO_PARENT; n],
            visited: vec![false; n],
            queue: PriorityQueue::new(),
        }
    }

    /// Run Dijkstra from `source`, returning per-vertex float distances
    /// (`f64::INFINITY` for unreached vertices). Reuses this solver's
    /// scratch buffers across calls. Parent pointers from this run are
    /// retained for [`Solver::path_to`] until the next call.
    pub fn shortest_paths_from(&mut self, graph: &LatticeGraph, source: u32) -> Vec<f64> {
        let n = graph.n_vertices();
        self.dist.clear();
        self.dist.resize(n, u64::MAX);
        self.parent.clear();
        self.parent.resize(n, NO_PARENT);
        self.visited.clear();
        self.visited.resize(n, false);
        self.queue.clear();

        self.dist[source as usize] = 0;
        self.queue.push(source, Reverse(0));

        while let Some((u, Reverse(du))) = self.queue.pop() {
            if self.visited[u as usize] {
                continue;
            }
            self.visited[u as usize] = true;

            for edge in graph.out_edges(u) {
                let v = edge.target;
                if self.visited[v as usize] {
                    continue;
                }
                let weight = (edge.cost * SCALE).round() as u64;
                let candidate = du.saturating_add(weight);
                if candidate < self.dist[v as usize] {
                    self.dist[v as usize] = candidate;
                    self.parent[v as usize] = u;
                    self.queue.push(v, Reverse(candidate));
                }
            }
        }

        self.dist
            .iter()
            .map(|&d| if d == u64::MAX { f64::INFINITY } else { d as f64 / SCALE })
            .collect()
    }

    /// Reconstruct the vertex path to `target` from the most recent
    /// [`Solver::shortest_paths_from`] call, including both endpoints.
    /// Returns `None` if `target` was unreached (or is the source with no
    /// recorded parent and zero distance is itself the whole path, handled
    /// by returning the single-vertex path).
    pub fn path_to(&self, source: u32, target: u32) -> Option<Vec<u32>> {
        if self.dist[target as usize] == u64::MAX {
            return None;
        }
        let mut path = vec![target];
        let mut cur = target;
        while cur != source {
            let p = self.parent[cur as usize];
            if p == NO_PARENT {
                return None;
            }
            path.push(p);
            cur = p;
        }
        path.reverse();
        Some(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LatticeParams;
    use crate::grid::OccupancyGrid;
    use crate::lattice::build_lattice;
    use crate::progress::NoopProgressSink;

    #[test]
    fn source_distance_is_zero() {
        let grid = OccupancyGrid::from_flat(&vec![0i64; 64], 8, 8).unwrap();
        let params = LatticeParams {
            node_spacing: 2,
            n_headings: 4,
            ..LatticeParams::default()
        };
        let graph = build_lattice(&grid, &params, &NoopProgressSink);
        let mut solver = Solver::new(&graph);
        let dists = solver.shortest_paths_from(&graph, 0);
        assert_eq!(dists[0], 0.0);
    }

    #[test]
    fn reachable_vertices_have_finite_cost() {
        let grid = OccupancyGrid::from_flat(&vec![0i64; 64], 8, 8).unwrap();
        let params = LatticeParams {
            node_spacing: 2,
            n_headings: 4,
            ..LatticeParams::default()
        };
        let graph = build_lattice(&grid, &params, &NoopProgressSink);
        let mut solver = Solver::new(&graph);
        let dists = solver.shortest_paths_from(&graph, 0);
        let reachable = dists.iter().filter(|d| d.is_finite()).count();
        assert!(reachable > 1, "expected more than the source vertex reachable");
    }

    #[test]
    fn solver_is_reusable_across_multiple_sources() {
        let grid = OccupancyGrid::from_flat(&vec![0i64; 64], 8, 8).unwrap();
        let params = LatticeParams {
            node_spacing: 2,
            n_headings: 4,
            ..LatticeParams::default()
        };
        let graph = build_lattice(&grid, &params, &NoopProgressSink);
        let mut solver = Solver::new(&graph);
        let first = solver.shortest_paths_from(&graph, 0);
        let second = solver.shortest_paths_from(&graph, 1);
        assert_eq!(first[0], 0.0);
        assert_eq!(second[1], 0.0);
    }
}
