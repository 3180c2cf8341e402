//! # weft-solver
//!
//! Implicit (backward Euler) cloth dynamics.
//!
//! ## Key Types
//!
//! - [`Cloth`]: Owns the simulation mesh, material and handles; runs steps
//! - [`LinearSystem`]: Scatter-accumulate assembly of `A·Δv = b`
//! - [`Wind`]: Uniform wind with pressure and skin drag
//! - [`Handle`]: Penalty spring pinning a point to a target
//! - [`SolverConfig`]: Gravity, handle stiffness, pre-solve checks
//!
//! Force models live in [`stretching`] (Green strain membrane) and
//! [`bending`] (discrete-shell hinges).

pub mod assembly;
pub mod bending;
pub mod cloth;
pub mod config;
pub mod forces;
pub mod handle;
pub mod step;
pub mod stretching;
pub mod wind;

pub use assembly::LinearSystem;
pub use cloth::Cloth;
pub use config::SolverConfig;
pub use handle::Handle;
pub use step::StepResult;
pub use wind::Wind;
