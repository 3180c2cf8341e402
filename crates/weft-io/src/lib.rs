//! # weft-io
//!
//! Scene files (TOML), frame recordings (JSON) and the step driver that
//! runs a scene.
//!
//! Defines the boundary types the CLI uses to describe a run and to hand
//! results to downstream tools.

pub mod contract;
pub mod runner;
pub mod validator;

pub use contract::{Frame, FrameOutput, GridSpec, MaterialSpec, Orientation, SceneConfig};
pub use runner::{advance, ClothStepper, Stepper};
pub use validator::validate_scene;
