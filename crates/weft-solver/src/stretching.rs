//! Membrane stretching of a single face.
//!
//! Strain is the Green-Lagrange tensor of the face's deformation gradient
//! `F = [x_u x_v]` (3×2), measured against the material-space rest shape:
//!
//! ```text
//! G = (FᵀF − I) / 2
//! W = ½ k0 G00² + ½ k2 G11² + k1 G00 G11 + k3 G01²
//! E = a · W
//! ```
//!
//! where `a` is the rest area and `k` the orthotropic stiffness.
//!
//! The returned Jacobian keeps the full first-order part of the Hessian and
//! the curvature part only where the material is in tension (stress along an
//! axis clamped at zero). The shear curvature term is dropped. This keeps
//! every face block negative semidefinite for a semidefinite `k`, which is
//! what the implicit solve needs.

use glam::DVec3;

use weft_material::StretchingStiffness;
use weft_math::dense::{kron_identity3, set_segment};
use weft_math::mat3x2::{deformation_gradient, gradient_weights};
use weft_math::{Mat9, Vec9};
use weft_mesh::Face;

/// Per-corner strain derivatives of a face.
struct StrainBasis {
    g: [f64; 3],
    du: [f64; 3],
    dv: [f64; 3],
    fuu: Vec9,
    fvv: Vec9,
    fuv: Vec9,
}

fn strain_basis(face: &Face, x: [DVec3; 3]) -> StrainBasis {
    let f = deformation_gradient(x[0], x[1], x[2], face.dm_inv);
    let (du, dv) = gradient_weights(face.dm_inv);
    let (xu, xv) = (f.col0, f.col1);

    let mut fuu = Vec9::zeros();
    let mut fvv = Vec9::zeros();
    let mut fuv = Vec9::zeros();
    for i in 0..3 {
        set_segment(&mut fuu, i, du[i] * xu);
        set_segment(&mut fvv, i, dv[i] * xv);
        set_segment(&mut fuv, i, 0.5 * (du[i] * xv + dv[i] * xu));
    }

    StrainBasis {
        g: f.green_strain(),
        du,
        dv,
        fuu,
        fvv,
        fuv,
    }
}

/// Elastic stretching energy of a face at corner positions `x`.
pub fn stretching_energy(face: &Face, x: [DVec3; 3], stiffness: &StretchingStiffness) -> f64 {
    if face.is_degenerate() {
        return 0.0;
    }
    let f = deformation_gradient(x[0], x[1], x[2], face.dm_inv);
    let [g00, g01, g11] = f.green_strain();
    let [k0, k1, k2, k3] = stiffness.k;
    face.rest_area
        * (0.5 * k0 * g00 * g00 + 0.5 * k2 * g11 * g11 + k1 * g00 * g11 + k3 * g01 * g01)
}

/// Stretching force on the three corners of a face and its position
/// Jacobian.
///
/// Entries are point-major in the face's corner order. Degenerate faces
/// return zeros.
pub fn stretching_force(
    face: &Face,
    x: [DVec3; 3],
    stiffness: &StretchingStiffness,
) -> (Vec9, Mat9) {
    if face.is_degenerate() {
        return (Vec9::zeros(), Mat9::zeros());
    }

    let StrainBasis {
        g: [g00, g01, g11],
        du,
        dv,
        fuu,
        fvv,
        fuv,
    } = strain_basis(face, x);
    let [k0, k1, k2, k3] = stiffness.k;

    // Second Piola-Kirchhoff stress in material axes.
    let s00 = k0 * g00 + k1 * g11;
    let s11 = k2 * g11 + k1 * g00;
    let s01 = 2.0 * k3 * g01;

    let grad = fuu * s00 + fvv * s11 + fuv * s01;

    let mut hess: Mat9 = fuu * fuu.transpose() * k0
        + fvv * fvv.transpose() * k2
        + (fuu * fvv.transpose() + fvv * fuu.transpose()) * k1
        + fuv * fuv.transpose() * (2.0 * k3);
    if s00 > 0.0 {
        hess += kron_identity3::<9>(|i, j| du[i] * du[j]) * s00;
    }
    if s11 > 0.0 {
        hess += kron_identity3::<9>(|i, j| dv[i] * dv[j]) * s11;
    }

    let a = face.rest_area;
    (grad * -a, hess * -a)
}
