//! Geometric helpers for triangles and four-point hinge stencils.
//!
//! Hinge convention used throughout weft:
//! ```text
//!        x2
//!       /  \      face A = (x0, x1, x2)
//!     x0 ── x1
//!       \  /      face B = (x1, x0, x3)
//!        x3
//! ```
//! Face normals are computed from the stencil itself, not from the face
//! winding, so the signed dihedral angle does not depend on how the
//! adjacent faces were ordered in the input mesh.

use glam::{DVec2, DVec3};

use weft_types::constants::DEGENERATE_LENGTH_THRESHOLD;

/// Area of triangle (a, b, c).
#[inline]
pub fn triangle_area(a: DVec3, b: DVec3, c: DVec3) -> f64 {
    0.5 * (b - a).cross(c - a).length()
}

/// Unit normal of triangle (a, b, c), or zero for a degenerate triangle.
#[inline]
pub fn face_normal(a: DVec3, b: DVec3, c: DVec3) -> DVec3 {
    (b - a).cross(c - a).normalize_or_zero()
}

/// Distance from `x` to the infinite line through `a` and `b`.
///
/// Falls back to `|x − a|` when `a` and `b` coincide.
pub fn distance(x: DVec3, a: DVec3, b: DVec3) -> f64 {
    let e = b - a;
    let len2 = e.length_squared();
    if len2 < DEGENERATE_LENGTH_THRESHOLD * DEGENERATE_LENGTH_THRESHOLD {
        return (x - a).length();
    }
    let t = (x - a).dot(e) / len2;
    (x - (a + e * t)).length()
}

/// Barycentric weights `(1 − t, t)` of the projection of `x` onto the line
/// through `a` and `b`.
pub fn barycentric_weights(x: DVec3, a: DVec3, b: DVec3) -> DVec2 {
    let e = b - a;
    let len2 = e.length_squared();
    if len2 < DEGENERATE_LENGTH_THRESHOLD * DEGENERATE_LENGTH_THRESHOLD {
        return DVec2::new(0.5, 0.5);
    }
    let t = (x - a).dot(e) / len2;
    DVec2::new(1.0 - t, t)
}

/// Unit normals `(n_a, n_b)` of the two wings of a hinge.
///
/// Both are zero-safe: a degenerate wing yields a zero normal.
pub fn hinge_normals(x0: DVec3, x1: DVec3, x2: DVec3, x3: DVec3) -> (DVec3, DVec3) {
    let e = x1 - x0;
    let n_a = e.cross(x2 - x0).normalize_or_zero();
    let n_b = (x3 - x0).cross(e).normalize_or_zero();
    (n_a, n_b)
}

/// Signed dihedral angle of the hinge (x0, x1; x2, x3), in `(-π, π]`.
///
/// Zero for a flat hinge. Returns zero for degenerate stencils.
pub fn dihedral_angle(x0: DVec3, x1: DVec3, x2: DVec3, x3: DVec3) -> f64 {
    let e = (x0 - x1).normalize_or_zero();
    let (n_a, n_b) = hinge_normals(x0, x1, x2, x3);
    if e == DVec3::ZERO || n_a == DVec3::ZERO || n_b == DVec3::ZERO {
        return 0.0;
    }
    let cosine = n_a.dot(n_b);
    let sine = e.dot(n_a.cross(n_b));
    sine.atan2(cosine)
}

/// Projects the 3D triangle (a, b, c) into its own plane.
///
/// Returns the 2D coordinates of `b − a` and `c − a` in an orthonormal frame
/// whose first axis is along `b − a`, or `None` if the triangle is degenerate.
pub fn planar_edges(a: DVec3, b: DVec3, c: DVec3) -> Option<(DVec2, DVec2)> {
    let e1 = b - a;
    let e2 = c - a;
    let len_e1 = e1.length();
    let n = e1.cross(e2);
    if len_e1 < DEGENERATE_LENGTH_THRESHOLD || n.length() < DEGENERATE_LENGTH_THRESHOLD {
        return None;
    }
    let u = e1 / len_e1;
    let v = n.cross(u).normalize();
    Some((DVec2::new(e1.dot(u), e1.dot(v)), DVec2::new(e2.dot(u), e2.dot(v))))
}

/// Inverse of the 2×2 edge matrix `[e1 e2]`, column-major `[a, b, c, d]`.
///
/// Returns `None` when the edges are (nearly) parallel.
pub fn inverse_edge_matrix(e1: DVec2, e2: DVec2) -> Option<[f64; 4]> {
    let det = e1.x * e2.y - e2.x * e1.y;
    if det.abs() < DEGENERATE_LENGTH_THRESHOLD * DEGENERATE_LENGTH_THRESHOLD {
        return None;
    }
    let inv_det = 1.0 / det;
    Some([e2.y * inv_det, -e1.y * inv_det, -e2.x * inv_det, e1.x * inv_det])
}
