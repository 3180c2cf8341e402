//! Membrane stretching stiffness.
//!
//! The in-plane response of a fabric is described by four coefficients
//! acting on the Green strain `G` of a face, in material axes:
//!
//! ```text
//! W = ½ k_warp G00² + ½ k_weft G11² + k_coupling G00 G11 + k_shear G01²
//! ```
//!
//! Coefficients are in N/m (already integrated over the fabric thickness).

use serde::{Deserialize, Serialize};
use weft_types::{WeftError, WeftResult};

/// Four-coefficient stretching stiffness `[warp, coupling, weft, shear]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StretchingStiffness {
    /// `[k_warp, k_coupling, k_weft, k_shear]`.
    pub k: [f64; 4],
}

impl StretchingStiffness {
    /// Orthotropic stiffness from its four coefficients.
    pub fn orthotropic(warp: f64, weft: f64, coupling: f64, shear: f64) -> Self {
        Self {
            k: [warp, coupling, weft, shear],
        }
    }

    /// Isotropic plane-stress stiffness from a membrane Young's modulus
    /// (N/m) and Poisson ratio.
    ///
    /// `k_warp = k_weft = E/(1−ν²)`, `k_coupling = νE/(1−ν²)`,
    /// `k_shear = E/(1+ν)`.
    pub fn isotropic(young: f64, poisson: f64) -> Self {
        let d = young / (1.0 - poisson * poisson);
        Self::orthotropic(d, d, poisson * d, young / (1.0 + poisson))
    }

    /// Stiffness along the warp (u) axis.
    #[inline]
    pub fn warp(&self) -> f64 {
        self.k[0]
    }

    /// Warp/weft coupling.
    #[inline]
    pub fn coupling(&self) -> f64 {
        self.k[1]
    }

    /// Stiffness along the weft (v) axis.
    #[inline]
    pub fn weft(&self) -> f64 {
        self.k[2]
    }

    /// Shear stiffness.
    #[inline]
    pub fn shear(&self) -> f64 {
        self.k[3]
    }

    /// True if the energy density is convex in the strain,
    /// i.e. `k_warp, k_weft, k_shear ≥ 0` and `k_warp·k_weft ≥ k_coupling²`.
    pub fn is_positive_semidefinite(&self) -> bool {
        let [k0, k1, k2, k3] = self.k;
        k0 >= 0.0 && k2 >= 0.0 && k3 >= 0.0 && k0 * k2 >= k1 * k1
    }

    /// Ratio of warp to weft stiffness; 1.0 when weft is zero.
    pub fn warp_weft_ratio(&self) -> f64 {
        if self.weft() > 1e-12 {
            self.warp() / self.weft()
        } else {
            1.0
        }
    }

    /// Returns true if warp and weft differ by more than 5%.
    pub fn is_anisotropic(&self) -> bool {
        (self.warp_weft_ratio() - 1.0).abs() > 0.05
    }

    /// Checks that every coefficient is finite and the tensor is
    /// semidefinite.
    pub fn validate(&self) -> WeftResult<()> {
        if self.k.iter().any(|k| !k.is_finite()) {
            return Err(WeftError::InvalidMaterial(format!(
                "stretching stiffness must be finite, got {:?}",
                self.k
            )));
        }
        if !self.is_positive_semidefinite() {
            return Err(WeftError::InvalidMaterial(format!(
                "stretching stiffness {:?} is not positive semidefinite",
                self.k
            )));
        }
        Ok(())
    }
}
