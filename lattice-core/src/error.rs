//! Error types for the lattice planner kernel.

use thiserror::Error;

/// Errors produced by the planner kernel.
///
/// Each variant corresponds to one of the four error kinds the kernel is
/// allowed to surface; none of them are retried internally.
#[derive(Error, Debug)]
pub enum PlanError {
    /// The occupancy map array did not match its declared dimensions.
    #[error("invalid map: {0}")]
    InvalidMap(String),

    /// A waypoint's `(x, y, theta)` state is not a vertex of the lattice.
    #[error("start state missing for waypoint {waypoint}: {reason}")]
    StartStateMissing { waypoint: usize, reason: String },

    /// The tour solver could not produce a feasible tour.
    #[error("no solution found")]
    NoSolution,

    /// Two consecutive chosen states in the tour have no path in the lattice.
    #[error("no path between tour states {from} and {to}")]
    NoPath { from: usize, to: usize },
}

/// Convenience result alias for kernel operations.
pub type Result<T> = std::result::Result<T, PlanError>;
