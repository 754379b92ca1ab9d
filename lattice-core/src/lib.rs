//! State-lattice planner kernel.
//!
//! Loads an occupancy grid, builds a state-lattice directed graph from
//! Dubins-style motion primitives, computes an all-states cost matrix via
//! repeated single-source Dijkstra, and solves an open-tour visiting order
//! over a set of waypoints with a heading choice per waypoint.
//!
//! The kernel is synchronous and has no I/O beyond the caller-supplied
//! [`progress::ProgressSink`]; callers own map loading, request
//! (de)serialization, and persistence policy.

pub mod api;
pub mod config;
pub mod cost_matrix;
mod crc;
pub mod dijkstra;
pub mod error;
pub mod grid;
pub mod heading;
pub mod lattice;
pub mod persist;
pub mod progress;
pub mod tour;

pub use api::{optimize, precompute, MapMetaData, Point, PrecomputeRequest, SolutionState, TourResult, WaypointsRequest};
pub use config::LatticeParams;
pub use error::{PlanError, Result};
pub use grid::OccupancyGrid;
pub use lattice::LatticeGraph;
pub use progress::{NoopProgressSink, ProcessType, ProgressSink};
