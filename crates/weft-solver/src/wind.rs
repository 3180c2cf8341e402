//! Aerodynamic force of a uniform wind on a face.
//!
//! The relative air velocity `v_rel = w − v̄` (wind minus mean face
//! velocity) is split into its normal part `v_n = n·v_rel` and tangential
//! part `v_t`. Each corner receives a third of
//!
//! ```text
//! f = a · (ρ |v_n| v_n n + c_d v_t)
//! ```
//!
//! i.e. quadratic pressure drag along the normal and linear skin friction
//! in the plane.

use glam::{DMat3, DVec3};
use serde::{Deserialize, Serialize};
use weft_math::dense::{add_to_block, from_segments};
use weft_math::{Mat9, Vec9};

/// Uniform ambient wind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wind {
    /// Air density (kg/m³).
    #[serde(default)]
    pub density: f64,
    /// Wind velocity (m/s).
    #[serde(default)]
    pub velocity: DVec3,
    /// Tangential drag coefficient (kg/(m²·s)).
    #[serde(default)]
    pub drag: f64,
}

impl Default for Wind {
    fn default() -> Self {
        Self::calm()
    }
}

impl Wind {
    /// No air at all: zero force and zero Jacobian everywhere.
    pub const fn calm() -> Self {
        Self {
            density: 0.0,
            velocity: DVec3::ZERO,
            drag: 0.0,
        }
    }

    /// Returns true if the wind cannot exert any force.
    pub fn is_calm(&self) -> bool {
        self.density == 0.0 && self.drag == 0.0
    }

    /// Force on each corner of a face and its Jacobian with respect to the
    /// corner velocities.
    ///
    /// `normal` is the current unit normal, `area` the current area and
    /// `face_velocity` the mean corner velocity. The Jacobian is symmetric
    /// and negative semidefinite.
    pub fn face_force(&self, normal: DVec3, area: f64, face_velocity: DVec3) -> (Vec9, Mat9) {
        let v_rel = self.velocity - face_velocity;
        let v_n = normal.dot(v_rel);
        let v_t = v_rel - v_n * normal;

        let per_corner = area / 3.0 * (self.density * v_n.abs() * v_n * normal + self.drag * v_t);

        // ∂f_i/∂v_j, identical for every corner pair
        let nn = DMat3::from_cols(normal * normal.x, normal * normal.y, normal * normal.z);
        let block = (nn * (2.0 * self.density * v_n.abs()) + (DMat3::IDENTITY - nn) * self.drag)
            * (-area / 9.0);

        let mut jacobian = Mat9::zeros();
        for i in 0..3 {
            for j in 0..3 {
                add_to_block(&mut jacobian, i, j, block);
            }
        }
        let force: Vec9 = from_segments(&[per_corner; 3]);
        (force, jacobian)
    }
}
