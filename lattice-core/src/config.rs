//! Tunable lattice parameters.
//!
//! These are part of the kernel's ABI (§6): callers may load them from a
//! TOML file or override individual fields from a CLI, but the defaults
//! below must match exactly what a caller gets if it supplies none.

use serde::{Deserialize, Serialize};

/// Parameters controlling lattice construction and cost scaling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LatticeParams {
    /// Grid cells between lattice vertices on each axis.
    pub node_spacing: u32,
    /// Heading discretization (`n_headings` / `theta_bins`).
    pub n_headings: u32,
    /// Arc radius for L/R primitives, in cells.
    pub turning_radius: f64,
    /// Sampled length of each primitive, in cells.
    pub primitive_length: f64,
    /// Points sampled per primitive path.
    pub samples_per_primitive: u32,
    /// Multiplier applied to reverse-primitive edge cost.
    pub reverse_penalty_factor: f64,
    /// Float-to-integer cost scaling factor for the cost matrix.
    pub scale: f64,
    /// Snap tolerance as a fraction of `node_spacing`.
    pub snap_tolerance_ratio: f64,
}

impl Default for LatticeParams {
    fn default() -> Self {
        Self {
            node_spacing: 2,
            n_headings: 16,
            turning_radius: 12.0,
            primitive_length: 4.0,
            samples_per_primitive: 20,
            reverse_penalty_factor: 1.9,
            scale: 1000.0,
            snap_tolerance_ratio: 0.6,
        }
    }
}

impl LatticeParams {
    /// Load parameters from a TOML file, falling back to [`Default`] for any
    /// field the file omits.
    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// Snap tolerance in grid units (`snap_tolerance_ratio * node_spacing`).
    pub fn snap_tolerance(&self) -> f64 {
        self.snap_tolerance_ratio * self.node_spacing as f64
    }

    /// The sentinel value used for unreachable cost-matrix entries.
    pub const UNREACHABLE: i64 = 1_000_000_000;

    /// The penalty applied to disjunction violations in the tour solver.
    pub const DISJUNCTION_PENALTY: i64 = 100_000_000;
}
