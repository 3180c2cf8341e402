//! Solver configuration.

use glam::DVec3;
use serde::{Deserialize, Serialize};
use weft_types::constants::{DEFAULT_HANDLE_STIFFNESS, GRAVITY};
use weft_types::{WeftError, WeftResult};

/// Configuration for the implicit cloth solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Gravity vector [gx, gy, gz] in m/s².
    pub gravity: [f64; 3],

    /// Stiffness (N/m) given to handles created with `Cloth::add_handle`.
    pub handle_stiffness: f64,

    /// Run the finite/positive-diagonal check on the assembled system
    /// before factorizing it.
    pub check_diagonal: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            gravity: [0.0, -GRAVITY, 0.0],
            handle_stiffness: DEFAULT_HANDLE_STIFFNESS,
            check_diagonal: true,
        }
    }
}

impl SolverConfig {
    /// Gravity as a vector.
    pub fn gravity(&self) -> DVec3 {
        DVec3::from_array(self.gravity)
    }

    /// Configuration without gravity.
    pub fn weightless() -> Self {
        Self {
            gravity: [0.0; 3],
            ..Default::default()
        }
    }

    /// Checks value ranges.
    pub fn validate(&self) -> WeftResult<()> {
        if self.gravity.iter().any(|g| !g.is_finite()) {
            return Err(WeftError::InvalidConfig(format!(
                "gravity must be finite, got {:?}",
                self.gravity
            )));
        }
        if !(self.handle_stiffness.is_finite() && self.handle_stiffness > 0.0) {
            return Err(WeftError::InvalidConfig(format!(
                "handle stiffness must be positive, got {}",
                self.handle_stiffness
            )));
        }
        Ok(())
    }
}
