//! Discrete-shell bending across an interior edge.
//!
//! ## Energy
//!
//! ```text
//! E = k_b · (l̄² / 2ā) · (θ − θ̄)² / 4
//! ```
//!
//! - `θ` = current signed dihedral angle of the hinge
//! - `θ̄` = rest dihedral angle
//! - `l̄` = rest edge length, `ā` = combined rest area of both faces
//!
//! The `l̄²/ā` factor keeps the bending response independent of mesh
//! resolution.
//!
//! ## Geometry
//!
//! ```text
//!        x2
//!       /  \
//!     x0 ── x1
//!       \  /
//!        x3
//! ```
//!
//! The gradient of `θ` is closed form: the wings move along their face
//! normals scaled by the inverse height over the edge, and the edge
//! endpoints take the opposite, split by where each wing projects onto the
//! edge. The Jacobian is the Gauss-Newton term `∇θ ∇θᵀ`, which is always
//! semidefinite.

use std::f64::consts::{PI, TAU};

use glam::DVec3;

use weft_math::dense::from_segments;
use weft_math::geometry::{barycentric_weights, dihedral_angle, distance, hinge_normals};
use weft_math::{Mat12, Vec12};
use weft_mesh::Edge;
use weft_types::constants::{DEGENERATE_AREA_THRESHOLD, DEGENERATE_LENGTH_THRESHOLD};

/// Resolution-independent stiffness scale `l̄² / (2ā)` of an edge, or
/// `None` if the edge has no usable rest shape.
fn shape_factor(edge: &Edge) -> Option<f64> {
    if edge.rest_area < DEGENERATE_AREA_THRESHOLD || edge.rest_length < DEGENERATE_LENGTH_THRESHOLD {
        return None;
    }
    Some(edge.rest_length * edge.rest_length / (2.0 * edge.rest_area))
}

/// Deviation of the hinge angle from rest, wrapped into `[−π, π)` so a hinge
/// folded past `±π` is pulled back the short way.
fn angle_deviation(edge: &Edge, x: [DVec3; 4]) -> f64 {
    let theta = dihedral_angle(x[0], x[1], x[2], x[3]);
    (theta - edge.rest_angle + PI).rem_euclid(TAU) - PI
}

/// Gradient of the dihedral angle with respect to the stencil positions.
///
/// Returns `None` when either wing has collapsed onto the edge.
pub fn dihedral_gradient(x: [DVec3; 4]) -> Option<Vec12> {
    let [x0, x1, x2, x3] = x;
    let (n_a, n_b) = hinge_normals(x0, x1, x2, x3);
    let h_a = distance(x2, x0, x1);
    let h_b = distance(x3, x0, x1);
    if n_a == DVec3::ZERO
        || n_b == DVec3::ZERO
        || h_a < DEGENERATE_LENGTH_THRESHOLD
        || h_b < DEGENERATE_LENGTH_THRESHOLD
    {
        return None;
    }

    let w_a = barycentric_weights(x2, x0, x1);
    let w_b = barycentric_weights(x3, x0, x1);
    let da = n_a / h_a;
    let db = n_b / h_b;

    Some(from_segments(&[
        -(w_a.x * da + w_b.x * db),
        -(w_a.y * da + w_b.y * db),
        da,
        db,
    ]))
}

/// Bending energy of a hinge at stencil positions `x`.
pub fn bending_energy(edge: &Edge, x: [DVec3; 4], bending_stiffness: f64) -> f64 {
    let Some(shape) = shape_factor(edge) else {
        return 0.0;
    };
    let d = angle_deviation(edge, x);
    bending_stiffness * shape * d * d / 4.0
}

/// Bending force on the four stencil points `[x0, x1, x2, x3]` and its
/// position Jacobian.
///
/// Callers pass only interior edges. Degenerate hinges return zeros.
pub fn bending_force(edge: &Edge, x: [DVec3; 4], bending_stiffness: f64) -> (Vec12, Mat12) {
    let (Some(shape), Some(grad)) = (shape_factor(edge), dihedral_gradient(x)) else {
        return (Vec12::zeros(), Mat12::zeros());
    };
    let c = bending_stiffness * shape / 2.0;

    let force = grad * (-c * angle_deviation(edge, x));
    let jacobian = grad * grad.transpose() * -c;
    (force, jacobian)
}
