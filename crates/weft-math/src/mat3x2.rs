//! 3×2 matrix type for deformation gradients of shell elements.
//!
//! A cloth triangle is a 2D manifold embedded in 3D. Its deformation
//! gradient F maps the 2D material-space configuration to the deformed 3D
//! configuration.

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// A 3×2 column-major matrix.
///
/// Columns are the deformed material axes `x_u` and `x_v`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Mat3x2 {
    /// First column (derivative along material u).
    pub col0: DVec3,
    /// Second column (derivative along material v).
    pub col1: DVec3,
}

impl Mat3x2 {
    /// Creates a new 3×2 matrix from two column vectors.
    #[inline]
    pub fn from_cols(col0: DVec3, col1: DVec3) -> Self {
        Self { col0, col1 }
    }

    /// The zero matrix.
    pub const ZERO: Self = Self {
        col0: DVec3::ZERO,
        col1: DVec3::ZERO,
    };

    /// Identity-like matrix (first two columns of 3×3 identity).
    pub const IDENTITY: Self = Self {
        col0: DVec3::X,
        col1: DVec3::Y,
    };

    /// Compute Fᵀ F (a 2×2 matrix), returned as [a, b; b, d].
    ///
    /// This is the right Cauchy-Green tensor C, which measures strain
    /// independent of rotation.
    #[inline]
    pub fn ftf(&self) -> [f64; 4] {
        let a = self.col0.dot(self.col0);
        let b = self.col0.dot(self.col1);
        let d = self.col1.dot(self.col1);
        [a, b, b, d]
    }

    /// Green-Lagrange strain G = (Fᵀ F − I) / 2, returned as `[g00, g01, g11]`.
    #[inline]
    pub fn green_strain(&self) -> [f64; 3] {
        let c = self.ftf();
        [0.5 * (c[0] - 1.0), 0.5 * c[1], 0.5 * (c[3] - 1.0)]
    }

    /// Multiply by a 2×2 matrix (column-major [a, b, c, d]):
    /// result = self * [[a, c], [b, d]]
    #[inline]
    pub fn mul_mat2(&self, m: [f64; 4]) -> Self {
        Self {
            col0: self.col0 * m[0] + self.col1 * m[1],
            col1: self.col0 * m[2] + self.col1 * m[3],
        }
    }
}

/// Compute the deformation gradient F for a triangle.
///
/// F = Ds · Dm⁻¹, where Ds = [x1 − x0, x2 − x0] and `dm_inv` is the
/// precomputed inverse of the material-space edge matrix (column-major).
pub fn deformation_gradient(x0: DVec3, x1: DVec3, x2: DVec3, dm_inv: [f64; 4]) -> Mat3x2 {
    Mat3x2::from_cols(x1 - x0, x2 - x0).mul_mat2(dm_inv)
}

/// Per-corner weights of the material-axis derivatives.
///
/// Returns `(d_u, d_v)` such that `F.col0 = Σ d_u[i]·x_i` and
/// `F.col1 = Σ d_v[i]·x_i`.
pub fn gradient_weights(dm_inv: [f64; 4]) -> ([f64; 3], [f64; 3]) {
    let [a, b, c, d] = dm_inv;
    ([-(a + b), a, b], [-(c + d), c, d])
}
