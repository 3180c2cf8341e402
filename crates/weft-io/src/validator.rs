//! Scene validation.
//!
//! Catches bad scene files before any mesh is built, with messages that
//! name the offending field.

use weft_material::MaterialDatabase;
use weft_types::{WeftError, WeftResult};

use crate::contract::SceneConfig;

/// Validates a scene against the material database.
///
/// Checks:
/// - Grid has at least one quad and a positive size
/// - Material resolves and has valid parameters
/// - Handle indices are in range
/// - `dt` is positive, `steps` non-zero
/// - Wind and solver parameters are finite and non-negative
pub fn validate_scene(scene: &SceneConfig, database: &MaterialDatabase) -> WeftResult<()> {
    let grid = &scene.grid;
    if grid.cols == 0 || grid.rows == 0 {
        return Err(WeftError::InvalidConfig(format!(
            "grid needs at least one quad, got {}×{}",
            grid.cols, grid.rows
        )));
    }
    if !(grid.width.is_finite() && grid.width > 0.0 && grid.height.is_finite() && grid.height > 0.0) {
        return Err(WeftError::InvalidConfig(format!(
            "grid size must be positive, got {} × {}",
            grid.width, grid.height
        )));
    }

    scene.material.resolve(database)?.validate()?;

    let points = grid.point_count();
    if let Some(&bad) = scene.handles.iter().find(|&&h| h >= points) {
        return Err(WeftError::InvalidConfig(format!(
            "handle point {bad} out of range (point count: {points})"
        )));
    }

    if !(scene.dt.is_finite() && scene.dt > 0.0) {
        return Err(WeftError::InvalidConfig(format!(
            "dt must be positive, got {}",
            scene.dt
        )));
    }
    if scene.dt > 1.0 {
        return Err(WeftError::InvalidConfig(format!(
            "dt = {} is unreasonably large",
            scene.dt
        )));
    }
    if scene.steps == 0 {
        return Err(WeftError::InvalidConfig("steps must be >= 1".into()));
    }

    let wind = &scene.wind;
    if !(wind.density.is_finite() && wind.density >= 0.0) {
        return Err(WeftError::InvalidConfig(format!(
            "wind density must be non-negative, got {}",
            wind.density
        )));
    }
    if !(wind.drag.is_finite() && wind.drag >= 0.0) {
        return Err(WeftError::InvalidConfig(format!(
            "wind drag must be non-negative, got {}",
            wind.drag
        )));
    }
    if !wind.velocity.is_finite() {
        return Err(WeftError::InvalidConfig("wind velocity is not finite".into()));
    }

    scene.solver.validate()
}
