//! Per-step statistics.

use serde::{Deserialize, Serialize};

/// Result of a completed simulation step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepResult {
    /// Index of the step (0 for the first).
    pub step: u64,
    /// Timestep used.
    pub dt: f64,
    /// Rows of the linear system (`3·|points|`).
    pub dimension: usize,
    /// Stored entries of the assembled matrix.
    pub nnz: usize,
    /// Wall-clock time spent assembling (seconds).
    pub assembly_time: f64,
    /// Wall-clock time spent factorizing and solving (seconds).
    pub solve_time: f64,
    /// Wall-clock time for the whole step (seconds).
    pub wall_time: f64,
    /// Largest per-point velocity change `|Δv|`.
    pub max_velocity_delta: f64,
}
