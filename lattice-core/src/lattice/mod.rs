//! C2 — Lattice Builder.
//!
//! Builds the state-lattice graph: one vertex per `(free cell on the
//! node_spacing stride, heading bin)`, edges from the six motion primitives
//! applied at every vertex and snapped onto the nearest existing vertex.
//!
//! Stored as CSR (`offsets`/`edges`) for cache-friendly Dijkstra traversal —
//! see `butterfly-route`'s `hybrid::state_graph::HybridStateGraph`, which
//! this layout is modeled on.

mod primitives;

use crate::config::LatticeParams;
use crate::grid::OccupancyGrid;
use crate::heading::{angular_distance, heading_set};
use crate::progress::{ProcessType, ProgressSink};
use primitives::{build_templates, path_length, Template};
pub use primitives::PrimitiveKind;
use rustc_hash::FxHashMap;

/// A lattice vertex: a free grid cell on the node-spacing stride, at one of
/// `n_headings` discretized headings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexKey {
    pub ix: i64,
    pub iy: i64,
    pub heading_bin: u16,
}

/// One outgoing edge, already costed (including the reverse penalty).
#[derive(Debug, Clone, Copy)]
pub struct Edge {
    pub target: u32,
    pub cost: f64,
    pub kind: PrimitiveKind,
}

/// The state-lattice graph, stored as CSR: `edges[offsets[v]..offsets[v+1]]`
/// are vertex `v`'s outgoing edges.
#[derive(Debug, Clone)]
pub struct LatticeGraph {
    pub node_spacing: u32,
    pub headings: Vec<f64>,
    pub vertices: Vec<VertexKey>,
    pub offsets: Vec<u32>,
    pub edges: Vec<Edge>,
    index: FxHashMap<(i64, i64, u16), u32>,
}

impl LatticeGraph {
    /// Reassemble a graph from its raw parts, rebuilding the position index.
    /// Used by the persistence layer when loading a serialized lattice.
    pub fn from_parts(
        node_spacing: u32,
        headings: Vec<f64>,
        vertices: Vec<VertexKey>,
        offsets: Vec<u32>,
        edges: Vec<Edge>,
        index: FxHashMap<(i64, i64, u16), u32>,
    ) -> Self {
        Self {
            node_spacing,
            headings,
            vertices,
            offsets,
            edges,
            index,
        }
    }

    pub fn n_headings(&self) -> usize {
        self.headings.len()
    }

    pub fn n_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn out_edges(&self, v: u32) -> &[Edge] {
        let start = self.offsets[v as usize] as usize;
        let end = self.offsets[v as usize + 1] as usize;
        &self.edges[start..end]
    }

    /// Vertex id for an exact `(ix, iy, heading_bin)` key, if it exists.
    pub fn vertex_id(&self, ix: i64, iy: i64, heading_bin: u16) -> Option<u32> {
        self.index.get(&(ix, iy, heading_bin)).copied()
    }
}

/// Build the state-lattice graph over `grid`.
///
/// Vertices are enumerated in row-major `(iy, ix)` order over the
/// `node_spacing` stride, then heading-bin order; this fixes a deterministic
/// vertex numbering independent of edge construction order.
pub fn build_lattice(
    grid: &OccupancyGrid,
    params: &LatticeParams,
    progress: &dyn ProgressSink,
) -> LatticeGraph {
    tracing::debug!(
        width = grid.width(),
        height = grid.height(),
        node_spacing = params.node_spacing,
        n_headings = params.n_headings,
        "building lattice"
    );

    let headings = heading_set(params.n_headings);
    let spacing = params.node_spacing as i64;

    let mut vertices = Vec::new();
    let mut index = FxHashMap::default();

    let mut iy = 0i64;
    while iy < grid.height() as i64 {
        let mut ix = 0i64;
        while ix < grid.width() as i64 {
            if grid.is_free_cell(ix, iy) {
                for (bin, _) in headings.iter().enumerate() {
                    let id = vertices.len() as u32;
                    let key = VertexKey {
                        ix,
                        iy,
                        heading_bin: bin as u16,
                    };
                    index.insert((ix, iy, bin as u16), id);
                    vertices.push(key);
                }
            }
            ix += spacing;
        }
        iy += spacing;
    }

    // Templates depend only on the starting heading, so compute each once
    // and reuse across every vertex that shares that heading bin.
    let templates_by_heading: Vec<Vec<Template>> = headings
        .iter()
        .map(|&theta0| {
            build_templates(
                theta0,
                params.turning_radius,
                params.primitive_length,
                params.samples_per_primitive,
            )
            .templates
        })
        .collect();

    progress.update(
        ProcessType::Precomputation,
        50,
        "Applying primitives...",
        None,
    );

    let tolerance = params.snap_tolerance();
    let mut offsets = Vec::with_capacity(vertices.len() + 1);
    let mut edges = Vec::new();
    offsets.push(0u32);

    for v in &vertices {
        let base_x = v.ix as f64;
        let base_y = v.iy as f64;

        for tmpl in &templates_by_heading[v.heading_bin as usize] {
            if !path_collision_free(grid, base_x, base_y, &tmpl.path) {
                tracing::trace!(ix = v.ix, iy = v.iy, kind = ?tmpl.kind, "primitive blocked by collision");
                continue;
            }

            let end_x = base_x + tmpl.end.dx;
            let end_y = base_y + tmpl.end.dy;
            let end_heading_idx = crate::heading::nearest_heading_index(&headings, tmpl.end.theta);

            let Some(target) = find_snap_target(&index, end_x, end_y, end_heading_idx, spacing, tolerance) else {
                continue;
            };

            let mut cost = path_length(&tmpl.path);
            if tmpl.kind.is_reverse() {
                cost *= params.reverse_penalty_factor;
            }

            edges.push(Edge {
                target,
                cost,
                kind: tmpl.kind,
            });
        }
        offsets.push(edges.len() as u32);
    }

    tracing::debug!(n_vertices = vertices.len(), n_edges = edges.len(), "lattice built");

    LatticeGraph {
        node_spacing: params.node_spacing,
        headings,
        vertices,
        offsets,
        edges,
        index,
    }
}

/// A collision-free exact-vertex lookup for an edge endpoint: round to the
/// nearest stride position and nearest heading bin, accept only if within
/// `tolerance` of that exact grid position. No neighborhood fallback — a
/// miss simply drops the edge, per the single-nearest-position snap rule.
fn find_snap_target(
    index: &FxHashMap<(i64, i64, u16), u32>,
    x: f64,
    y: f64,
    heading_idx: usize,
    spacing: i64,
    tolerance: f64,
) -> Option<u32> {
    let ix = (x / spacing as f64).round() as i64;
    let iy = (y / spacing as f64).round() as i64;
    let vx = (ix * spacing) as f64;
    let vy = (iy * spacing) as f64;
    let dist = (vx - x).hypot(vy - y);
    if dist > tolerance {
        return None;
    }
    index.get(&(ix, iy, heading_idx as u16)).copied()
}

/// Walk a relative path, anchored at `(base_x, base_y)`, checking a stride
/// of sample points (plus always the final point) against the grid.
fn path_collision_free(grid: &OccupancyGrid, base_x: f64, base_y: f64, path: &[(f64, f64)]) -> bool {
    if path.is_empty() {
        return true;
    }
    let stride = (path.len() / 5).max(1);
    let mut i = 0;
    while i < path.len() {
        let (dx, dy) = path[i];
        if !grid.is_free_point(base_x + dx, base_y + dy) {
            return false;
        }
        i += stride;
    }
    let (dx, dy) = *path.last().unwrap();
    grid.is_free_point(base_x + dx, base_y + dy)
}
