//! Input triangle mesh with SoA (Structure of Arrays) layout.
//!
//! The SoA layout stores each coordinate channel contiguously:
//! - `pos_x: [x0, x1, x2, ...]`
//! - `pos_y: [y0, y1, y2, ...]`
//! - `pos_z: [z0, z1, z2, ...]`
//!
//! `uv_u` / `uv_v` are material-space coordinates in metres. They define the
//! rest shape of every face, so a mesh whose positions are already deformed
//! can still carry the flat pattern it was cut from.

use glam::DVec3;
use serde::{Deserialize, Serialize};
use weft_types::{WeftError, WeftResult};

/// A triangle mesh stored in Structure-of-Arrays layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriangleMesh {
    // --- Vertex data (SoA) ---
    /// X coordinates of all vertices.
    pub pos_x: Vec<f64>,
    /// Y coordinates of all vertices.
    pub pos_y: Vec<f64>,
    /// Z coordinates of all vertices.
    pub pos_z: Vec<f64>,

    /// Material-space U coordinate (metres).
    pub uv_u: Vec<f64>,
    /// Material-space V coordinate (metres).
    pub uv_v: Vec<f64>,

    // --- Triangle data ---
    /// Triangle indices, each triangle is [v0, v1, v2].
    /// Stored flat: `[t0v0, t0v1, t0v2, t1v0, t1v1, t1v2, ...]`
    pub indices: Vec<u32>,
}

impl TriangleMesh {
    /// Returns the number of vertices.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.pos_x.len()
    }

    /// Returns the number of triangles.
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Returns the position of vertex `i`.
    #[inline]
    pub fn position(&self, i: usize) -> DVec3 {
        DVec3::new(self.pos_x[i], self.pos_y[i], self.pos_z[i])
    }

    /// Returns the material-space coordinate of vertex `i` as `[u, v]`.
    #[inline]
    pub fn uv(&self, i: usize) -> [f64; 2] {
        [self.uv_u[i], self.uv_v[i]]
    }

    /// Returns the three vertex indices of triangle `t`.
    #[inline]
    pub fn triangle(&self, t: usize) -> [u32; 3] {
        let base = t * 3;
        [self.indices[base], self.indices[base + 1], self.indices[base + 2]]
    }

    /// Sets the position of vertex `i`.
    #[inline]
    pub fn set_position(&mut self, i: usize, p: DVec3) {
        self.pos_x[i] = p.x;
        self.pos_y[i] = p.y;
        self.pos_z[i] = p.z;
    }

    /// Creates an empty mesh with pre-allocated capacity.
    pub fn with_capacity(vertex_capacity: usize, triangle_capacity: usize) -> Self {
        Self {
            pos_x: Vec::with_capacity(vertex_capacity),
            pos_y: Vec::with_capacity(vertex_capacity),
            pos_z: Vec::with_capacity(vertex_capacity),
            uv_u: Vec::with_capacity(vertex_capacity),
            uv_v: Vec::with_capacity(vertex_capacity),
            indices: Vec::with_capacity(triangle_capacity * 3),
        }
    }

    /// Appends a vertex and returns its index.
    pub fn push_vertex(&mut self, position: DVec3, uv: [f64; 2]) -> u32 {
        let index = self.pos_x.len() as u32;
        self.pos_x.push(position.x);
        self.pos_y.push(position.y);
        self.pos_z.push(position.z);
        self.uv_u.push(uv[0]);
        self.uv_v.push(uv[1]);
        index
    }

    /// Validates mesh integrity.
    ///
    /// Checks:
    /// - All SoA arrays have the same length
    /// - Triangle indices are within bounds
    /// - No triangle repeats a vertex
    /// - All coordinates are finite
    pub fn validate(&self) -> WeftResult<()> {
        let n = self.pos_x.len();

        if self.pos_y.len() != n || self.pos_z.len() != n {
            return Err(WeftError::InvalidMesh(
                "position arrays have inconsistent lengths".into(),
            ));
        }
        if self.uv_u.len() != n || self.uv_v.len() != n {
            return Err(WeftError::InvalidMesh(
                "material coordinate arrays have inconsistent lengths".into(),
            ));
        }

        if self.indices.len() % 3 != 0 {
            return Err(WeftError::InvalidMesh(
                "index count is not divisible by 3".into(),
            ));
        }

        for (i, &idx) in self.indices.iter().enumerate() {
            if idx as usize >= n {
                return Err(WeftError::InvalidMesh(format!(
                    "index {idx} at position {i} is out of range (vertex count: {n})"
                )));
            }
        }

        for t in 0..self.triangle_count() {
            let [a, b, c] = self.triangle(t);
            if a == b || b == c || a == c {
                return Err(WeftError::InvalidMesh(format!(
                    "triangle {t} has repeated vertex indices: [{a}, {b}, {c}]"
                )));
            }
        }

        let channels = [&self.pos_x, &self.pos_y, &self.pos_z, &self.uv_u, &self.uv_v];
        if let Some(i) = channels
            .iter()
            .find_map(|ch| ch.iter().position(|v| !v.is_finite()))
        {
            return Err(WeftError::InvalidMesh(format!(
                "vertex {i} has a non-finite coordinate"
            )));
        }

        Ok(())
    }

    /// Constructs a mesh from interleaved AoS data.
    ///
    /// `positions` is `[x0, y0, z0, x1, ...]`, `uvs` is `[u0, v0, u1, ...]`.
    /// When `uvs` is empty the XY coordinates of the positions are used as
    /// material coordinates, which is correct for a flat pattern in the XY
    /// plane.
    pub fn from_interleaved(positions: &[f64], indices: &[u32], uvs: &[f64]) -> WeftResult<Self> {
        if positions.len() % 3 != 0 {
            return Err(WeftError::InvalidMesh(
                "interleaved positions length not divisible by 3".into(),
            ));
        }

        let n = positions.len() / 3;
        if !uvs.is_empty() && uvs.len() != n * 2 {
            return Err(WeftError::InvalidMesh(format!(
                "expected {} material coordinates, got {}",
                n * 2,
                uvs.len()
            )));
        }

        let mut mesh = Self::with_capacity(n, indices.len() / 3);
        for i in 0..n {
            let p = DVec3::new(positions[i * 3], positions[i * 3 + 1], positions[i * 3 + 2]);
            let uv = if uvs.is_empty() {
                [p.x, p.y]
            } else {
                [uvs[i * 2], uvs[i * 2 + 1]]
            };
            mesh.push_vertex(p, uv);
        }
        mesh.indices = indices.to_vec();

        mesh.validate()?;
        Ok(mesh)
    }

    /// Positions flattened as `[x0, y0, z0, x1, ...]`.
    pub fn interleaved_positions(&self) -> Vec<f64> {
        (0..self.vertex_count())
            .flat_map(|i| [self.pos_x[i], self.pos_y[i], self.pos_z[i]])
            .collect()
    }
}
