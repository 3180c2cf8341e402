//! Error types for the weft engine.
//!
//! All crates return `WeftResult<T>` from fallible operations.

use thiserror::Error;

/// Unified error type for the weft engine.
#[derive(Debug, Error)]
pub enum WeftError {
    /// Mesh data is malformed or inconsistent.
    #[error("Invalid mesh: {0}")]
    InvalidMesh(String),

    /// Material parameter is out of valid range.
    #[error("Invalid material parameter: {0}")]
    InvalidMaterial(String),

    /// Configuration value is invalid.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The assembled system could not be factorized as symmetric positive-definite.
    #[error("System is not positive-definite at step {step} (dt = {dt:e}): {detail}")]
    NotPositiveDefinite {
        /// Index of the step that failed.
        step: u64,
        /// Timestep the system was assembled with.
        dt: f64,
        /// What the check or the factorization reported.
        detail: String,
    },

    /// The assembled system contains NaN or infinite entries.
    #[error("Non-finite system at step {step} (dt = {dt:e}): {detail}")]
    NonFinite {
        /// Index of the step that failed.
        step: u64,
        /// Timestep the system was assembled with.
        dt: f64,
        /// Location of the first bad entry.
        detail: String,
    },

    /// Linear solver misuse or internal failure.
    #[error("Solver error: {0}")]
    Solver(String),
}

impl WeftError {
    /// Returns true if this error aborted a simulation step before the mesh
    /// state was touched.
    ///
    /// Callers may retry such a step, for example with a smaller `dt`.
    pub fn is_step_failure(&self) -> bool {
        matches!(self, Self::NotPositiveDefinite { .. } | Self::NonFinite { .. })
    }

    /// Timestep of the failed step, if this is a step failure.
    pub fn failed_dt(&self) -> Option<f64> {
        match self {
            Self::NotPositiveDefinite { dt, .. } | Self::NonFinite { dt, .. } => Some(*dt),
            _ => None,
        }
    }
}

/// Convenience alias for `Result<T, WeftError>`.
pub type WeftResult<T> = Result<T, WeftError>;
