//! # weft-mesh
//!
//! Mesh input and the simulation-side topology provider.
//!
//! ## Key Types
//!
//! - [`TriangleMesh`]: Input mesh in SoA buffers: positions, material-space
//!   coordinates and the triangle index buffer.
//! - [`Topology`]: Edge adjacency (boundary/interior edges, hinge wings).
//! - [`SimMesh`]: Index-based arena of points, faces and edges carrying
//!   the rest data and mutable state the solver works on.
//! - Procedural generators for rectangular cloth patches.

pub mod generators;
pub mod mesh;
pub mod sim_mesh;
pub mod topology;

pub use mesh::TriangleMesh;
pub use sim_mesh::{Edge, Face, Point, SimMesh};
pub use topology::Topology;
