//! # weft-math
//!
//! Linear algebra primitives for the weft cloth simulator.
//!
//! Provides:
//! - Re-exports of `glam` double-precision types (`DVec3`, `DMat3`, ...)
//! - 3×2 deformation gradient type
//! - Fixed-size `nalgebra` blocks for per-element forces and Jacobians
//! - Geometric helpers for triangles and hinge stencils
//! - Sparse matrix representation (CSR) and a faer-backed Cholesky solver

pub mod dense;
pub mod faer_solver;
pub mod geometry;
pub mod mat3x2;
pub mod sparse;

// Re-export glam types as the canonical math types for weft.
pub use glam::{DMat2, DMat3, DVec2, DVec3};

pub use dense::{Mat12, Mat9, Vec12, Vec9};
