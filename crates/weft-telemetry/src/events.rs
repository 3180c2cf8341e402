//! Simulation event types.
//!
//! Structured events emitted around each implicit step. Events are plain
//! values carrying just enough data for monitoring and debugging.

use serde::{Deserialize, Serialize};

/// A simulation event tagged with the step it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationEvent {
    /// Step index (0-indexed).
    pub step: u64,
    /// Event payload.
    pub kind: EventKind,
}

/// Event payload variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventKind {
    /// Step started.
    StepBegin {
        /// Timestep (seconds).
        dt: f64,
    },

    /// Linear system assembled.
    Assembly {
        /// Stored entries of the sparse matrix.
        nnz: usize,
        /// Rows of the system (`3·|points|`).
        dimension: usize,
        /// Wall-clock assembly time (seconds).
        wall_time: f64,
    },

    /// Factorization and back-substitution finished.
    Solve {
        /// Wall-clock time (seconds).
        wall_time: f64,
    },

    /// Step completed and state advanced.
    StepEnd {
        /// Wall-clock time for the whole step (seconds).
        wall_time: f64,
        /// Largest per-point `|Δv|`.
        max_velocity_delta: f64,
    },

    /// Energy snapshot after a step.
    Energy {
        /// Kinetic energy `½ Σ m|v|²`.
        kinetic: f64,
        /// Stretching, bending and handle energy.
        elastic: f64,
    },

    /// Step rejected; the state is unchanged.
    StepFailed {
        /// Human-readable cause.
        reason: String,
    },
}

impl SimulationEvent {
    /// Creates a new event for the given step.
    pub fn new(step: u64, kind: EventKind) -> Self {
        Self { step, kind }
    }

    /// Whether this event reports a failure.
    pub fn is_failure(&self) -> bool {
        matches!(self.kind, EventKind::StepFailed { .. })
    }
}
