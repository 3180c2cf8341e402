//! Physical constants and simulation defaults.

/// Gravitational acceleration (m/s²).
pub const GRAVITY: f64 = 9.8;

/// Default simulation timestep (seconds).
pub const DEFAULT_DT: f64 = 0.01;

/// Default penalty stiffness for handles (N/m).
pub const DEFAULT_HANDLE_STIFFNESS: f64 = 1.0e6;

/// Faces with a rest area below this (m²) contribute no elastic force.
pub const DEGENERATE_AREA_THRESHOLD: f64 = 1.0e-12;

/// Edges or altitudes shorter than this (m) are treated as degenerate.
pub const DEGENERATE_LENGTH_THRESHOLD: f64 = 1.0e-9;
