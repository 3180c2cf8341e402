//! Global linear system for one implicit step.
//!
//! Builds `A·Δv = b` over the flattened state (3 rows per point) by
//! scattering small dense blocks:
//!
//! ```text
//! A = M − dt·(dt + c)·J − dt·J_v + dt²·K_h
//! b = dt·(F + (dt + c)·J·v) + dt·F_ext + dt·(f_h − dt·K_h·v)
//! ```
//!
//! where `J` is the elastic force Jacobian, `c` the material damping,
//! `J_v` the velocity Jacobian of the wind, and `K_h` the handle springs.
//! Scatters accumulate; nothing is ever overwritten.
//!
//! The system is rebuilt from scratch every step.

use glam::DVec3;
use nalgebra::{SMatrix, SVector, Vector3};

use weft_math::sparse::{CsrMatrix, TripletAccumulator};
use weft_mesh::SimMesh;
use weft_types::PointId;

/// Global row indices of a single point's block.
#[inline]
pub fn indices1(point: PointId) -> [usize; 3] {
    let d = point.dof();
    [d, d + 1, d + 2]
}

/// Global row indices of a face's three points, point-major.
pub fn indices3(points: [PointId; 3]) -> [usize; 9] {
    let mut out = [0; 9];
    for (i, p) in points.iter().enumerate() {
        out[3 * i..3 * i + 3].copy_from_slice(&indices1(*p));
    }
    out
}

/// Global row indices of a bending stencil's four points, point-major.
pub fn indices4(points: [PointId; 4]) -> [usize; 12] {
    let mut out = [0; 12];
    for (i, p) in points.iter().enumerate() {
        out[3 * i..3 * i + 3].copy_from_slice(&indices1(*p));
    }
    out
}

/// Sparse matrix and right-hand side under assembly.
#[derive(Debug, Clone)]
pub struct LinearSystem {
    matrix: TripletAccumulator,
    rhs: Vec<f64>,
}

impl LinearSystem {
    /// Starts a system for `mesh` with the point masses on the diagonal and
    /// a zero right-hand side.
    pub fn init(mesh: &SimMesh) -> Self {
        let n = mesh.dof_count();
        // Mass diagonal + one 9×9 block per face + one 12×12 block per edge
        let capacity = n + 81 * mesh.faces().len() + 144 * mesh.edges().len();
        let mut matrix = TripletAccumulator::with_capacity(n, n, capacity);
        for p in mesh.points() {
            for row in indices1(p.index) {
                matrix.push(row, row, p.mass);
            }
        }
        Self {
            matrix,
            rhs: vec![0.0; n],
        }
    }

    /// Number of rows (and columns).
    pub fn dimension(&self) -> usize {
        self.rhs.len()
    }

    /// Adds `block` into the rows and columns listed in `indices`.
    ///
    /// Entry `(i, j)` of the block lands at `(indices[i], indices[j])`, so a
    /// symmetric block keeps the global matrix symmetric.
    ///
    /// # Panics
    /// Panics if an index is outside the system.
    pub fn add_sub_matrix<const N: usize>(&mut self, block: &SMatrix<f64, N, N>, indices: &[usize; N]) {
        let n = self.rhs.len();
        if let Some(&bad) = indices.iter().find(|&&i| i >= n) {
            panic!("row {bad} outside system of dimension {n}");
        }
        for (i, &row) in indices.iter().enumerate() {
            for (j, &col) in indices.iter().enumerate() {
                let value = block[(i, j)];
                if value != 0.0 {
                    self.matrix.push(row, col, value);
                }
            }
        }
    }

    /// Adds `v` into the right-hand side rows listed in `indices`.
    ///
    /// # Panics
    /// Panics if an index is outside the system.
    pub fn add_sub_vector<const N: usize>(&mut self, v: &SVector<f64, N>, indices: &[usize; N]) {
        let n = self.rhs.len();
        for (i, &row) in indices.iter().enumerate() {
            assert!(row < n, "row {row} outside system of dimension {n}");
            self.rhs[row] += v[i];
        }
    }

    /// Adds a 3D vector to one point's right-hand side rows.
    pub fn add_point_vector(&mut self, point: PointId, v: DVec3) {
        self.add_sub_vector(&Vector3::new(v.x, v.y, v.z), &indices1(point));
    }

    /// Number of contributions pushed into the matrix so far.
    pub fn contributions(&self) -> usize {
        self.matrix.len()
    }

    /// Right-hand side as assembled so far.
    pub fn rhs(&self) -> &[f64] {
        &self.rhs
    }

    /// Compresses the matrix, summing duplicates, and returns `(A, b)`.
    pub fn finish(self) -> (CsrMatrix, Vec<f64>) {
        (self.matrix.to_csr(), self.rhs)
    }
}

/// Defect found by [`check_system`].
#[derive(Debug, Clone, PartialEq)]
pub enum SystemDefect {
    /// A matrix or right-hand-side entry is NaN or infinite.
    NonFinite(String),
    /// A diagonal entry is zero or negative, so `A` cannot be
    /// positive-definite.
    NonPositiveDiagonal(String),
}

/// Cheap checks run before factorization.
///
/// A symmetric positive-definite matrix has a strictly positive diagonal;
/// failing that proves the factorization would break down.
pub fn check_system(matrix: &CsrMatrix, rhs: &[f64]) -> Result<(), SystemDefect> {
    if let Some((r, c, v)) = matrix.iter().find(|(_, _, v)| !v.is_finite()) {
        return Err(SystemDefect::NonFinite(format!("matrix entry ({r}, {c}) is {v}")));
    }
    if let Some(i) = rhs.iter().position(|v| !v.is_finite()) {
        return Err(SystemDefect::NonFinite(format!(
            "right-hand side row {i} (point {}) is {}",
            i / 3,
            rhs[i]
        )));
    }
    if let Some((i, d)) = matrix
        .diagonal()
        .into_iter()
        .enumerate()
        .find(|&(_, d)| d <= 0.0)
    {
        return Err(SystemDefect::NonPositiveDiagonal(format!(
            "diagonal entry {i} (point {}) is {d:e}",
            i / 3
        )));
    }
    Ok(())
}
