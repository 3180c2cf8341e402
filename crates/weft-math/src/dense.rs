//! Fixed-size dense blocks for per-element forces and Jacobians.
//!
//! A face contributes a 9-entry force and a 9×9 Jacobian (three points ×
//! three components), a bending hinge a 12-entry force and a 12×12
//! Jacobian. Entries are ordered point-major: entry `3·i + k` is component
//! `k` of local point `i`.
//!
//! The blocks are plain `nalgebra` statics; the helpers here only bridge
//! between their 3-row segments and `glam` vectors.

use glam::{DMat3, DVec3};
use nalgebra::{Matrix3, SMatrix, SVector, Vector3};

/// Generalized force over three points.
pub type Vec9 = SVector<f64, 9>;
/// Jacobian block over three points.
pub type Mat9 = SMatrix<f64, 9, 9>;
/// Generalized force over a four-point hinge.
pub type Vec12 = SVector<f64, 12>;
/// Jacobian block over a four-point hinge.
pub type Mat12 = SMatrix<f64, 12, 12>;

fn to_vector3(v: DVec3) -> Vector3<f64> {
    Vector3::new(v.x, v.y, v.z)
}

/// Builds a vector from per-point 3D segments.
///
/// # Panics
/// Panics if `3 · segments.len() != N`.
pub fn from_segments<const N: usize>(segments: &[DVec3]) -> SVector<f64, N> {
    assert_eq!(3 * segments.len(), N, "segment count does not match vector length");
    let mut out = SVector::<f64, N>::zeros();
    for (i, s) in segments.iter().enumerate() {
        set_segment(&mut out, i, *s);
    }
    out
}

/// The 3D segment of local point `i`.
#[inline]
pub fn segment<const N: usize>(v: &SVector<f64, N>, i: usize) -> DVec3 {
    let s = v.fixed_rows::<3>(3 * i);
    DVec3::new(s[0], s[1], s[2])
}

/// Overwrites the 3D segment of local point `i`.
#[inline]
pub fn set_segment<const N: usize>(v: &mut SVector<f64, N>, i: usize, value: DVec3) {
    v.fixed_rows_mut::<3>(3 * i).copy_from(&to_vector3(value));
}

/// Block matrix whose 3×3 block `(i, j)` is `coeff(i, j) · I₃`, i.e. the
/// Kronecker product `C ⊗ I₃` of a per-point coefficient matrix.
///
/// # Panics
/// Panics if `N` is not a multiple of 3.
pub fn kron_identity3<const N: usize>(coeff: impl Fn(usize, usize) -> f64) -> SMatrix<f64, N, N> {
    assert_eq!(N % 3, 0, "block size must be a multiple of 3");
    let mut m = SMatrix::<f64, N, N>::zeros();
    for i in 0..N / 3 {
        for j in 0..N / 3 {
            m.fixed_view_mut::<3, 3>(3 * i, 3 * j)
                .copy_from(&(Matrix3::<f64>::identity() * coeff(i, j)));
        }
    }
    m
}

/// The 3×3 block coupling local points `i` and `j`.
pub fn block<const N: usize>(m: &SMatrix<f64, N, N>, i: usize, j: usize) -> DMat3 {
    let b = m.fixed_view::<3, 3>(3 * i, 3 * j);
    let col = |c: usize| DVec3::new(b[(0, c)], b[(1, c)], b[(2, c)]);
    DMat3::from_cols(col(0), col(1), col(2))
}

/// Adds `value` to the 3×3 block coupling local points `i` and `j`.
pub fn add_to_block<const N: usize>(m: &mut SMatrix<f64, N, N>, i: usize, j: usize, value: DMat3) {
    // glam and nalgebra are both column-major
    let value = Matrix3::from_column_slice(&value.to_cols_array());
    let mut b = m.fixed_view_mut::<3, 3>(3 * i, 3 * j);
    b += value;
}

/// True if `|A − Aᵀ|` is below `tol` entrywise.
pub fn is_symmetric<const N: usize>(m: &SMatrix<f64, N, N>, tol: f64) -> bool {
    (m - m.transpose()).amax() <= tol
}
