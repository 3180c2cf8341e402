//! Sparse matrix representation and solver interface.
//!
//! Provides a CSR (Compressed Sparse Row) matrix, a triplet accumulator
//! used to scatter per-element blocks into a global system, and a trait
//! for sparse Cholesky solvers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Compressed Sparse Row (CSR) matrix.
///
/// Stores a sparse matrix in row-major order with columns sorted within
/// each row and no duplicate entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsrMatrix {
    /// Number of rows.
    pub rows: usize,
    /// Number of columns.
    pub cols: usize,
    /// Row pointer array (length = rows + 1).
    /// `row_ptr[i]..row_ptr[i+1]` are the indices into `col_idx` and `values`
    /// for non-zeros in row `i`.
    pub row_ptr: Vec<usize>,
    /// Column indices of non-zero entries.
    pub col_idx: Vec<usize>,
    /// Non-zero values.
    pub values: Vec<f64>,
}

impl CsrMatrix {
    /// Creates an empty CSR matrix with the given dimensions.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            row_ptr: vec![0; rows + 1],
            col_idx: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Returns the number of stored entries.
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Creates a CSR matrix from triplets (row, col, value).
    ///
    /// Duplicate entries are summed. Entries sharing a position are added in
    /// the order they appear in `triplets`, so identical input produces a
    /// bit-identical matrix.
    ///
    /// # Panics
    /// Panics if a triplet lies outside `rows × cols`.
    pub fn from_triplets(rows: usize, cols: usize, triplets: &[(usize, usize, f64)]) -> Self {
        let mut per_row: Vec<Vec<(usize, f64)>> = vec![Vec::new(); rows];
        for &(r, c, v) in triplets {
            assert!(r < rows && c < cols, "triplet ({r}, {c}) outside {rows}×{cols}");
            per_row[r].push((c, v));
        }

        let mut row_ptr = Vec::with_capacity(rows + 1);
        let mut col_idx = Vec::with_capacity(triplets.len());
        let mut values = Vec::with_capacity(triplets.len());
        row_ptr.push(0);

        for entries in &mut per_row {
            // Stable: equal columns keep insertion order.
            entries.sort_by_key(|&(c, _)| c);
            let row_start = col_idx.len();
            for &(c, v) in entries.iter() {
                if col_idx.len() > row_start && col_idx[col_idx.len() - 1] == c {
                    let last = values.len() - 1;
                    values[last] += v;
                } else {
                    col_idx.push(c);
                    values.push(v);
                }
            }
            row_ptr.push(col_idx.len());
        }

        Self {
            rows,
            cols,
            row_ptr,
            col_idx,
            values,
        }
    }

    /// Returns entry `(row, col)`, or zero if it is not stored.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        let range = self.row_ptr[row]..self.row_ptr[row + 1];
        match self.col_idx[range.clone()].binary_search(&col) {
            Ok(k) => self.values[range.start + k],
            Err(_) => 0.0,
        }
    }

    /// Iterates over stored entries as `(row, col, value)`.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        (0..self.rows).flat_map(move |r| {
            (self.row_ptr[r]..self.row_ptr[r + 1]).map(move |k| (r, self.col_idx[k], self.values[k]))
        })
    }

    /// Returns the main diagonal.
    pub fn diagonal(&self) -> Vec<f64> {
        (0..self.rows.min(self.cols)).map(|i| self.get(i, i)).collect()
    }

    /// Computes `A · x`.
    ///
    /// # Panics
    /// Panics if `x.len() != cols`.
    pub fn mul_vec(&self, x: &[f64]) -> Vec<f64> {
        assert_eq!(x.len(), self.cols, "vector length does not match column count");
        (0..self.rows)
            .map(|r| {
                (self.row_ptr[r]..self.row_ptr[r + 1])
                    .map(|k| self.values[k] * x[self.col_idx[k]])
                    .sum()
            })
            .collect()
    }

    /// Returns true if the matrix is square and `|A − Aᵀ| ≤ tol` entrywise.
    pub fn is_symmetric(&self, tol: f64) -> bool {
        self.rows == self.cols && self.iter().all(|(r, c, v)| (v - self.get(c, r)).abs() <= tol)
    }

    /// Largest entrywise difference to `other`, or `None` if shapes differ.
    pub fn max_abs_diff(&self, other: &Self) -> Option<f64> {
        if self.rows != other.rows || self.cols != other.cols {
            return None;
        }
        let one_way = |a: &Self, b: &Self| {
            a.iter()
                .map(|(r, c, v)| (v - b.get(r, c)).abs())
                .fold(0.0_f64, f64::max)
        };
        Some(one_way(self, other).max(one_way(other, self)))
    }
}

/// Unordered list of `(row, col, value)` contributions to a sparse matrix.
///
/// Pushing is O(1); duplicates are summed when the accumulator is
/// compressed with [`TripletAccumulator::to_csr`].
#[derive(Debug, Clone)]
pub struct TripletAccumulator {
    rows: usize,
    cols: usize,
    triplets: Vec<(usize, usize, f64)>,
}

impl TripletAccumulator {
    /// Creates an empty accumulator for a `rows × cols` matrix.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self::with_capacity(rows, cols, 0)
    }

    /// Creates an empty accumulator with room for `capacity` contributions.
    pub fn with_capacity(rows: usize, cols: usize, capacity: usize) -> Self {
        Self {
            rows,
            cols,
            triplets: Vec::with_capacity(capacity),
        }
    }

    /// Adds `value` at `(row, col)`.
    ///
    /// # Panics
    /// Panics if the position lies outside the matrix.
    #[inline]
    pub fn push(&mut self, row: usize, col: usize, value: f64) {
        assert!(
            row < self.rows && col < self.cols,
            "entry ({row}, {col}) outside {}×{}",
            self.rows,
            self.cols
        );
        self.triplets.push((row, col, value));
    }

    /// Number of contributions pushed so far.
    pub fn len(&self) -> usize {
        self.triplets.len()
    }

    /// Returns true if nothing has been pushed.
    pub fn is_empty(&self) -> bool {
        self.triplets.is_empty()
    }

    /// Matrix dimensions `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Compresses the contributions into a CSR matrix, summing duplicates.
    pub fn to_csr(&self) -> CsrMatrix {
        CsrMatrix::from_triplets(self.rows, self.cols, &self.triplets)
    }
}

/// Failure of a sparse factorization.
#[derive(Debug, Clone, PartialEq)]
pub enum FactorizationError {
    /// The matrix cannot be factorized at all (wrong shape, empty, bad structure).
    Invalid(String),
    /// Numeric factorization met a non-positive pivot.
    NotPositiveDefinite(String),
}

impl fmt::Display for FactorizationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invalid(msg) => write!(f, "invalid matrix: {msg}"),
            Self::NotPositiveDefinite(msg) => write!(f, "not positive-definite: {msg}"),
        }
    }
}

impl std::error::Error for FactorizationError {}

/// Trait for sparse symmetric positive-definite solvers.
pub trait SparseSolver {
    /// Factorize the matrix.
    fn factorize(&mut self, matrix: &CsrMatrix) -> Result<(), FactorizationError>;

    /// Solve Ax = b using the pre-computed factorization.
    /// Returns x in the provided output buffer.
    fn solve(&self, rhs: &[f64], solution: &mut [f64]) -> Result<(), String>;

    /// Returns true if the solver holds a valid factorization.
    fn is_factorized(&self) -> bool;
}
