//! Scene description and frame output.
//!
//! A scene file describes one simulation run: the cloth patch, its
//! material, which points are pinned, the wind, and how long to run.
//! Frames record the point state after each step and can be loaded back to
//! resume a run.
//!
//! ```toml
//! dt = 0.01
//! steps = 200
//! handles = [0, 10]
//!
//! [grid]
//! cols = 10
//! rows = 10
//! width = 1.0
//! height = 1.0
//!
//! [material]
//! preset = "cotton_twill"
//!
//! [wind]
//! density = 1.2
//! velocity = [0.0, 0.0, 4.0]
//! drag = 0.1
//! ```

use std::fs;
use std::path::Path;

use glam::DVec3;
use serde::{Deserialize, Serialize};
use tracing::debug;

use weft_material::{FabricProperties, MaterialDatabase};
use weft_mesh::generators::{horizontal_quad_grid, quad_grid};
use weft_mesh::{SimMesh, TriangleMesh};
use weft_solver::{Cloth, SolverConfig, Wind};
use weft_types::constants::DEFAULT_DT;
use weft_types::{WeftError, WeftResult};

/// How the generated patch is placed in the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Hanging in the XY plane.
    #[default]
    Vertical,
    /// Lying in the XZ plane.
    Horizontal,
}

/// Rectangular cloth patch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    /// Quads along the width.
    pub cols: usize,
    /// Quads along the height.
    pub rows: usize,
    /// Width in meters.
    pub width: f64,
    /// Height in meters.
    pub height: f64,
    /// Placement; vertical if absent.
    #[serde(default)]
    pub orientation: Orientation,
}

impl GridSpec {
    /// Generates the patch mesh.
    pub fn mesh(&self) -> TriangleMesh {
        match self.orientation {
            Orientation::Vertical => quad_grid(self.cols, self.rows, self.width, self.height),
            Orientation::Horizontal => {
                horizontal_quad_grid(self.cols, self.rows, self.width, self.height)
            }
        }
    }

    /// Number of generated points.
    pub fn point_count(&self) -> usize {
        (self.cols + 1) * (self.rows + 1)
    }
}

/// Material by preset name or spelled out in full.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MaterialSpec {
    /// A named entry of the material database.
    Preset {
        /// Preset name, e.g. `"cotton_twill"`.
        preset: String,
    },
    /// Inline parameters.
    Inline(FabricProperties),
}

impl MaterialSpec {
    /// Looks the material up in `database` if it is a preset.
    pub fn resolve(&self, database: &MaterialDatabase) -> WeftResult<FabricProperties> {
        match self {
            Self::Preset { preset } => database.get(preset).cloned().ok_or_else(|| {
                WeftError::InvalidMaterial(format!(
                    "unknown preset '{preset}' (available: {})",
                    database.names().join(", ")
                ))
            }),
            Self::Inline(props) => Ok(props.clone()),
        }
    }
}

/// One simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    /// Timestep (seconds).
    #[serde(default = "default_dt")]
    pub dt: f64,
    /// Number of steps to run.
    pub steps: u32,
    /// Points pinned where they start.
    #[serde(default)]
    pub handles: Vec<usize>,
    /// Cloth patch.
    pub grid: GridSpec,
    /// Fabric.
    pub material: MaterialSpec,
    /// Wind; calm if absent.
    #[serde(default)]
    pub wind: Wind,
    /// Solver settings; defaults if absent.
    #[serde(default)]
    pub solver: SolverConfig,
}

fn default_dt() -> f64 {
    DEFAULT_DT
}

impl SceneConfig {
    /// Parses a scene from TOML text.
    pub fn from_toml_str(text: &str) -> WeftResult<Self> {
        toml::from_str(text).map_err(|e| WeftError::Serialization(e.to_string()))
    }

    /// Reads a scene file.
    pub fn load(path: impl AsRef<Path>) -> WeftResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        debug!(path = %path.display(), "loaded scene");
        Self::from_toml_str(&text)
    }

    /// Serializes the scene to TOML.
    pub fn to_toml_string(&self) -> WeftResult<String> {
        toml::to_string(self).map_err(|e| WeftError::Serialization(e.to_string()))
    }

    /// Builds the cloth described by the scene, with its handles in place.
    pub fn build(&self, database: &MaterialDatabase) -> WeftResult<Cloth> {
        let material = self.material.resolve(database)?;
        let mut cloth = Cloth::new(&self.grid.mesh(), material, self.solver.clone())?;
        for &point in &self.handles {
            cloth.add_handle(point)?;
        }
        Ok(cloth)
    }
}

/// Point state after one step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Step that produced this frame.
    pub step: u64,
    /// Simulated time at the end of the step (seconds).
    pub time: f64,
    /// Position of every point.
    pub positions: Vec<[f64; 3]>,
    /// Velocity of every point; empty means at rest.
    #[serde(default)]
    pub velocities: Vec<[f64; 3]>,
}

impl Frame {
    /// Records the current state of `mesh`.
    pub fn capture(step: u64, time: f64, mesh: &SimMesh) -> Self {
        Self {
            step,
            time,
            positions: mesh.points().iter().map(|p| p.position.to_array()).collect(),
            velocities: mesh.points().iter().map(|p| p.velocity.to_array()).collect(),
        }
    }

    /// Puts `cloth` back into this frame's state. The cloth's next step
    /// follows the frame's.
    pub fn restore(&self, cloth: &mut Cloth) -> WeftResult<()> {
        let positions: Vec<DVec3> = self.positions.iter().copied().map(DVec3::from).collect();
        let velocities: Vec<DVec3> = self.velocities.iter().copied().map(DVec3::from).collect();
        cloth.restore_state(self.step + 1, &positions, &velocities)
    }
}

/// Frames of a run plus the triangle list they share.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameOutput {
    /// Triangle indices (3 per triangle).
    pub indices: Vec<u32>,
    /// Recorded frames in step order.
    pub frames: Vec<Frame>,
}

impl FrameOutput {
    /// Starts an empty recording for `mesh`.
    pub fn new(mesh: &SimMesh) -> Self {
        Self {
            indices: mesh
                .faces()
                .iter()
                .flat_map(|f| f.points.map(|p| p.0))
                .collect(),
            frames: Vec::new(),
        }
    }

    /// Appends a frame.
    pub fn push(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    /// Most recent frame, if any.
    pub fn last(&self) -> Option<&Frame> {
        self.frames.last()
    }

    /// Parses a recording from JSON text.
    pub fn from_json_str(text: &str) -> WeftResult<Self> {
        serde_json::from_str(text).map_err(|e| WeftError::Serialization(e.to_string()))
    }

    /// Reads a recording written by [`write`](Self::write).
    pub fn load(path: impl AsRef<Path>) -> WeftResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        debug!(path = %path.display(), "loaded frames");
        Self::from_json_str(&text)
    }

    /// Serializes to pretty-printed JSON.
    pub fn to_json_string(&self) -> WeftResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| WeftError::Serialization(e.to_string()))
    }

    /// Writes the recording as JSON.
    pub fn write(&self, path: impl AsRef<Path>) -> WeftResult<()> {
        fs::write(path, self.to_json_string()?)?;
        Ok(())
    }
}
