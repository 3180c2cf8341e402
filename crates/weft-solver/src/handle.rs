//! Penalty handles pinning points to targets.

use glam::DVec3;
use serde::{Deserialize, Serialize};
use weft_mesh::SimMesh;
use weft_types::{PointId, WeftError, WeftResult};

/// A point held at `target` by a spring of the given stiffness.
///
/// Energy `k/2 · |x − target|²`. Handles are soft: the solve stays an
/// unconstrained symmetric system.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Handle {
    /// Pinned point.
    pub point: PointId,
    /// Spring stiffness (N/m).
    pub stiffness: f64,
    /// Position the point is pulled toward.
    pub target: DVec3,
}

impl Handle {
    /// Pins a point where it currently is.
    pub fn pin(mesh: &SimMesh, point: PointId, stiffness: f64) -> Self {
        Self {
            point,
            stiffness,
            target: mesh.position(point),
        }
    }

    /// Spring force at position `x`.
    #[inline]
    pub fn force(&self, x: DVec3) -> DVec3 {
        self.stiffness * (self.target - x)
    }

    /// Spring energy at position `x`.
    pub fn energy(&self, x: DVec3) -> f64 {
        0.5 * self.stiffness * (x - self.target).length_squared()
    }

    /// Checks the handle against a mesh.
    pub fn validate(&self, mesh: &SimMesh) -> WeftResult<()> {
        if self.point.index() >= mesh.point_count() {
            return Err(WeftError::InvalidConfig(format!(
                "handle point {} out of range (point count: {})",
                self.point.0,
                mesh.point_count()
            )));
        }
        if !(self.stiffness.is_finite() && self.stiffness > 0.0) {
            return Err(WeftError::InvalidConfig(format!(
                "handle stiffness must be positive, got {}",
                self.stiffness
            )));
        }
        if !self.target.is_finite() {
            return Err(WeftError::InvalidConfig("handle target is not finite".into()));
        }
        Ok(())
    }
}
