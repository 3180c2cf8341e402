//! Sparse Cholesky solver backed by `faer`.
//!
//! Implements the [`SparseSolver`] trait using faer's supernodal LLᵀ
//! factorization. The implicit system is rebuilt every step, so callers
//! factorize once per step and solve once.
//!
//! ## Workflow
//! 1. `factorize(matrix)` converts CSR→CSC, computes symbolic + numeric LLᵀ
//! 2. `solve(rhs, solution)` runs forward/backward substitution

use faer::Side;
use faer::linalg::solvers::Solve;
use faer::sparse::SparseColMat;
use faer::sparse::Triplet;
use faer::sparse::linalg::solvers::{Llt, SymbolicLlt};

use crate::sparse::{CsrMatrix, FactorizationError, SparseSolver};

/// Sparse Cholesky (LLᵀ) solver using `faer`.
pub struct FaerSolver {
    /// Cached LLᵀ factorization.
    factorization: Option<Llt<usize, f64>>,
    /// Matrix dimension (N×N).
    dimension: usize,
}

impl FaerSolver {
    /// Creates a new solver (unfactorized).
    pub fn new() -> Self {
        Self {
            factorization: None,
            dimension: 0,
        }
    }

    /// Matrix dimension of the current factorization, 0 if none.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Convert our CSR matrix to faer's CSC matrix.
    ///
    /// Only the upper triangle is forwarded; the factorization reads
    /// [`Side::Upper`].
    fn csr_to_csc_upper(matrix: &CsrMatrix) -> Result<SparseColMat<usize, f64>, FactorizationError> {
        let triplets: Vec<Triplet<usize, usize, f64>> = matrix
            .iter()
            .filter(|&(row, col, _)| row <= col)
            .map(|(row, col, val)| Triplet { row, col, val })
            .collect();

        SparseColMat::try_new_from_triplets(matrix.rows, matrix.cols, &triplets)
            .map_err(|e| FactorizationError::Invalid(format!("failed to build CSC matrix: {e:?}")))
    }
}

impl Default for FaerSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SparseSolver for FaerSolver {
    fn factorize(&mut self, matrix: &CsrMatrix) -> Result<(), FactorizationError> {
        self.factorization = None;
        self.dimension = 0;

        if matrix.rows != matrix.cols {
            return Err(FactorizationError::Invalid(format!(
                "matrix must be square, got {}×{}",
                matrix.rows, matrix.cols
            )));
        }
        if matrix.rows == 0 {
            return Err(FactorizationError::Invalid("cannot factorize empty matrix".into()));
        }

        let csc = Self::csr_to_csc_upper(matrix)?;

        let symbolic = SymbolicLlt::try_new(csc.symbolic().as_ref(), Side::Upper)
            .map_err(|e| FactorizationError::Invalid(format!("symbolic analysis failed: {e:?}")))?;

        let llt = Llt::try_new_with_symbolic(symbolic, csc.as_ref(), Side::Upper).map_err(|e| {
            FactorizationError::NotPositiveDefinite(format!("Cholesky factorization failed: {e:?}"))
        })?;

        self.dimension = matrix.rows;
        self.factorization = Some(llt);
        Ok(())
    }

    fn solve(&self, rhs: &[f64], solution: &mut [f64]) -> Result<(), String> {
        let llt = self
            .factorization
            .as_ref()
            .ok_or_else(|| "solver not factorized, call factorize() first".to_string())?;

        if rhs.len() != self.dimension {
            return Err(format!(
                "RHS length ({}) != matrix dimension ({})",
                rhs.len(),
                self.dimension
            ));
        }
        if solution.len() != self.dimension {
            return Err(format!(
                "solution length ({}) != matrix dimension ({})",
                solution.len(),
                self.dimension
            ));
        }

        let rhs_mat: faer::Mat<f64> = faer::Mat::from_fn(self.dimension, 1, |i, _| rhs[i]);
        let sol = llt.solve(&rhs_mat);

        for (i, out) in solution.iter_mut().enumerate() {
            *out = sol[(i, 0)];
        }

        if let Some(i) = solution.iter().position(|v| !v.is_finite()) {
            return Err(format!("solution entry {i} is not finite"));
        }
        Ok(())
    }

    fn is_factorized(&self) -> bool {
        self.factorization.is_some()
    }
}
