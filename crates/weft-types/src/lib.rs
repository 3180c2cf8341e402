//! # weft-types
//!
//! Shared identifiers, error types and physical constants for the weft
//! cloth simulator.
//!
//! This crate has no domain logic. It is the vocabulary every other weft
//! crate shares.

pub mod constants;
pub mod error;
pub mod ids;

pub use error::{WeftError, WeftResult};
pub use ids::{EdgeId, FaceId, PointId};
