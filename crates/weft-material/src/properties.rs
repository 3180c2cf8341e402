//! Physical fabric properties.
//!
//! All values are in SI units and feed the force models directly.

use serde::{Deserialize, Serialize};
use weft_types::{WeftError, WeftResult};

use crate::stiffness::StretchingStiffness;

/// Physical properties of a fabric material.
///
/// | Property | Field | Unit |
/// |---|---|---|
/// | Areal density | `density` | kg/m² |
/// | Membrane stiffness | `stretching` | N/m |
/// | Bending rigidity | `bending_stiffness` | N·m |
/// | Stiffness-proportional damping | `damping` | s |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FabricProperties {
    /// Preset key (e.g., "cotton_twill").
    pub name: String,

    /// Areal density in kg/m². Sets the lumped point masses.
    pub density: f64,

    /// In-plane stretching stiffness.
    pub stretching: StretchingStiffness,

    /// Bending rigidity. Low = flowing, high = stiff folds.
    pub bending_stiffness: f64,

    /// Rayleigh stiffness damping coefficient. Elastic forces are damped as
    /// `damping · J · v`.
    #[serde(default)]
    pub damping: f64,
}

impl FabricProperties {
    /// Checks that every parameter is in range.
    pub fn validate(&self) -> WeftResult<()> {
        if !(self.density.is_finite() && self.density > 0.0) {
            return Err(WeftError::InvalidMaterial(format!(
                "{}: density must be positive, got {}",
                self.name, self.density
            )));
        }
        if !(self.bending_stiffness.is_finite() && self.bending_stiffness >= 0.0) {
            return Err(WeftError::InvalidMaterial(format!(
                "{}: bending stiffness must be non-negative, got {}",
                self.name, self.bending_stiffness
            )));
        }
        if !(self.damping.is_finite() && self.damping >= 0.0) {
            return Err(WeftError::InvalidMaterial(format!(
                "{}: damping must be non-negative, got {}",
                self.name, self.damping
            )));
        }
        self.stretching.validate().map_err(|e| match e {
            WeftError::InvalidMaterial(msg) => WeftError::InvalidMaterial(format!("{}: {msg}", self.name)),
            other => other,
        })
    }
}
