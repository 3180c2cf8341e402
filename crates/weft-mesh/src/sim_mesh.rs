//! Simulation mesh: index-based arena of points, faces and edges.
//!
//! Built once from a [`TriangleMesh`]. Rest data (material-space inverse,
//! areas, edge lengths, rest dihedral angles) is fixed at construction;
//! afterwards only point positions and velocities change, and only through
//! [`SimMesh::apply_velocity_delta`].

use glam::{DVec2, DVec3};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use weft_math::geometry::{dihedral_angle, face_normal, inverse_edge_matrix, planar_edges, triangle_area};
use weft_types::constants::{DEGENERATE_AREA_THRESHOLD, DEGENERATE_LENGTH_THRESHOLD};
use weft_types::{EdgeId, FaceId, PointId, WeftError, WeftResult};

use crate::mesh::TriangleMesh;
use crate::topology::Topology;

/// A simulated point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Position of the point in the input mesh.
    pub rest_position: DVec3,
    /// Current position.
    pub position: DVec3,
    /// Current velocity.
    pub velocity: DVec3,
    /// Lumped mass (kg).
    pub mass: f64,
    /// Position in the flattened state vector (`3·index .. 3·index + 3`).
    pub index: PointId,
}

/// A triangle with its material-space rest data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Face {
    /// Corner points, in winding order.
    pub points: [PointId; 3],
    /// Inverse of the material-space edge matrix, column-major `[a, b, c, d]`.
    /// All zeros for a degenerate face.
    pub dm_inv: [f64; 4],
    /// Material-space area (m²).
    pub rest_area: f64,
}

impl Face {
    /// True if the face carries no usable rest shape.
    pub fn is_degenerate(&self) -> bool {
        self.rest_area < DEGENERATE_AREA_THRESHOLD
    }
}

/// An edge with its adjacent faces and hinge rest data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Endpoints, oriented along the winding of `faces[0]`.
    pub points: [PointId; 2],
    /// Adjacent faces; `faces[1]` is `None` on the boundary.
    pub faces: [Option<FaceId>; 2],
    /// Corner of each adjacent face opposite this edge.
    pub opposite: [Option<PointId>; 2],
    /// Material-space length (m).
    pub rest_length: f64,
    /// Sum of the rest areas of the adjacent faces (m²).
    pub rest_area: f64,
    /// Dihedral angle of the input mesh across this edge (rad).
    pub rest_angle: f64,
}

impl Edge {
    /// True if the edge has two adjacent faces.
    pub fn is_interior(&self) -> bool {
        self.faces[1].is_some()
    }

    /// Hinge stencil `[x0, x1, x2, x3]`: endpoints, then the opposite corners.
    pub fn stencil(&self) -> Option<[PointId; 4]> {
        match self.opposite {
            [Some(a), Some(b)] => Some([self.points[0], self.points[1], a, b]),
            _ => None,
        }
    }
}

/// Arena of simulated entities, referenced by index.
#[derive(Debug, Clone)]
pub struct SimMesh {
    points: Vec<Point>,
    faces: Vec<Face>,
    edges: Vec<Edge>,
    source: TriangleMesh,
}

impl SimMesh {
    /// Builds the simulation mesh from an input mesh and an area density
    /// (kg/m²).
    ///
    /// Each face spreads `density · rest_area` evenly over its corners.
    /// Faces whose material-space triangle is degenerate fall back to the
    /// planar projection of their 3D rest triangle; faces degenerate in both
    /// are kept with zero rest area and contribute nothing.
    pub fn from_triangle_mesh(mesh: &TriangleMesh, density: f64) -> WeftResult<Self> {
        mesh.validate()?;
        if !(density.is_finite() && density > 0.0) {
            return Err(WeftError::InvalidMesh(format!(
                "area density must be positive, got {density}"
            )));
        }
        if mesh.triangle_count() == 0 {
            return Err(WeftError::InvalidMesh("mesh has no triangles".into()));
        }

        let topology = Topology::build(mesh);
        if let Some(edge) = topology.first_non_manifold_edge() {
            return Err(WeftError::InvalidMesh(format!(
                "edge ({}, {}) is shared by {} triangles",
                edge.v0,
                edge.v1,
                edge.triangles.len()
            )));
        }
        if let Some(v) = topology.isolated_vertices().next() {
            return Err(WeftError::InvalidMesh(format!(
                "vertex {v} is not part of any triangle"
            )));
        }

        let faces: Vec<Face> = (0..mesh.triangle_count())
            .map(|t| build_face(mesh, t))
            .collect();

        let mut points: Vec<Point> = (0..mesh.vertex_count())
            .map(|i| {
                let p = mesh.position(i);
                Point {
                    rest_position: p,
                    position: p,
                    velocity: DVec3::ZERO,
                    mass: 0.0,
                    index: PointId(i as u32),
                }
            })
            .collect();

        for face in &faces {
            let share = density * face.rest_area / 3.0;
            for p in face.points {
                points[p.index()].mass += share;
            }
        }
        if let Some(p) = points.iter().find(|p| p.mass <= 0.0) {
            return Err(WeftError::InvalidMesh(format!(
                "vertex {} has no mass (all adjacent faces are degenerate)",
                p.index.0
            )));
        }

        let edges: Vec<Edge> = topology
            .edges
            .iter()
            .map(|adj| {
                let [p0, p1] = [PointId(adj.v0), PointId(adj.v1)];
                let face_a = FaceId(adj.triangles[0]);
                let face_b = adj.triangles.get(1).map(|&t| FaceId(t));
                let wing_a = PointId(adj.opposite[0]);
                let wing_b = adj.opposite.get(1).map(|&v| PointId(v));

                let rest_area = faces[face_a.index()].rest_area
                    + face_b.map_or(0.0, |f| faces[f.index()].rest_area);

                let uv_len = (DVec2::from(mesh.uv(p1.index())) - DVec2::from(mesh.uv(p0.index()))).length();
                let rest_length = if uv_len > DEGENERATE_LENGTH_THRESHOLD {
                    uv_len
                } else {
                    (mesh.position(p1.index()) - mesh.position(p0.index())).length()
                };

                let rest_angle = wing_b.map_or(0.0, |wing_b| {
                    dihedral_angle(
                        mesh.position(p0.index()),
                        mesh.position(p1.index()),
                        mesh.position(wing_a.index()),
                        mesh.position(wing_b.index()),
                    )
                });

                Edge {
                    points: [p0, p1],
                    faces: [Some(face_a), face_b],
                    opposite: [Some(wing_a), wing_b],
                    rest_length,
                    rest_area,
                    rest_angle,
                }
            })
            .collect();

        debug!(
            points = points.len(),
            faces = faces.len(),
            edges = edges.len(),
            boundary_edges = topology.boundary_edge_count(),
            "built simulation mesh"
        );

        Ok(Self {
            points,
            faces,
            edges,
            source: mesh.clone(),
        })
    }

    /// All points, ordered by index.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// All faces.
    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    /// All edges, sorted by endpoint pair.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Point by id.
    #[inline]
    pub fn point(&self, id: PointId) -> &Point {
        &self.points[id.index()]
    }

    /// Face by id.
    #[inline]
    pub fn face(&self, id: FaceId) -> &Face {
        &self.faces[id.index()]
    }

    /// Edge by id.
    #[inline]
    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id.index()]
    }

    /// Number of points.
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// Length of the flattened state vector, `3·|points|`.
    pub fn dof_count(&self) -> usize {
        3 * self.points.len()
    }

    /// Current position of a point.
    #[inline]
    pub fn position(&self, id: PointId) -> DVec3 {
        self.points[id.index()].position
    }

    /// Current velocity of a point.
    #[inline]
    pub fn velocity(&self, id: PointId) -> DVec3 {
        self.points[id.index()].velocity
    }

    /// Current corner positions of a face.
    pub fn face_positions(&self, face: &Face) -> [DVec3; 3] {
        face.points.map(|p| self.position(p))
    }

    /// Current unit normal of a face (zero if collapsed).
    pub fn face_normal(&self, face: &Face) -> DVec3 {
        let [a, b, c] = self.face_positions(face);
        face_normal(a, b, c)
    }

    /// Current area of a face.
    pub fn face_area(&self, face: &Face) -> f64 {
        let [a, b, c] = self.face_positions(face);
        triangle_area(a, b, c)
    }

    /// Mean velocity of the corners of a face.
    pub fn face_velocity(&self, face: &Face) -> DVec3 {
        face.points.iter().map(|&p| self.velocity(p)).sum::<DVec3>() / 3.0
    }

    /// Sets the velocity of a point. Intended for initial conditions.
    pub fn set_velocity(&mut self, id: PointId, velocity: DVec3) {
        self.points[id.index()].velocity = velocity;
    }

    /// Moves a point. Rest data is not touched.
    pub fn set_position(&mut self, id: PointId, position: DVec3) {
        self.points[id.index()].position = position;
    }

    /// Advances the state by a velocity delta over `dt`.
    ///
    /// `v ← v + Δv`, then `x ← x + dt·v` (semi-implicit Euler).
    ///
    /// # Panics
    /// Panics if `dv.len() != 3·|points|`.
    pub fn apply_velocity_delta(&mut self, dv: &[f64], dt: f64) {
        assert_eq!(
            dv.len(),
            self.dof_count(),
            "velocity delta has {} entries, expected {}",
            dv.len(),
            self.dof_count()
        );
        for (point, delta) in self.points.iter_mut().zip(dv.chunks_exact(3)) {
            point.velocity += DVec3::new(delta[0], delta[1], delta[2]);
            point.position += dt * point.velocity;
        }
    }

    /// Positions flattened as `[x0, y0, z0, x1, ...]`.
    pub fn positions_flat(&self) -> Vec<f64> {
        self.points.iter().flat_map(|p| p.position.to_array()).collect()
    }

    /// Velocities flattened as `[vx0, vy0, vz0, vx1, ...]`.
    pub fn velocities_flat(&self) -> Vec<f64> {
        self.points.iter().flat_map(|p| p.velocity.to_array()).collect()
    }

    /// Total kinetic energy `½ Σ m |v|²`.
    pub fn kinetic_energy(&self) -> f64 {
        self.points
            .iter()
            .map(|p| 0.5 * p.mass * p.velocity.length_squared())
            .sum()
    }

    /// Total mass.
    pub fn total_mass(&self) -> f64 {
        self.points.iter().map(|p| p.mass).sum()
    }

    /// Largest point speed.
    pub fn max_speed(&self) -> f64 {
        self.points
            .iter()
            .map(|p| p.velocity.length())
            .fold(0.0, f64::max)
    }

    /// Input mesh with positions replaced by the current state.
    pub fn to_triangle_mesh(&self) -> TriangleMesh {
        let mut mesh = self.source.clone();
        for p in &self.points {
            mesh.set_position(p.index.index(), p.position);
        }
        mesh
    }
}

fn build_face(mesh: &TriangleMesh, t: usize) -> Face {
    let [i0, i1, i2] = mesh.triangle(t);
    let points = [PointId(i0), PointId(i1), PointId(i2)];

    let uv = |i: u32| DVec2::from(mesh.uv(i as usize));
    let material_edges = (uv(i1) - uv(i0), uv(i2) - uv(i0));
    let rest_edges = inverse_edge_matrix(material_edges.0, material_edges.1)
        .map(|inv| (material_edges, inv))
        .or_else(|| {
            let (e1, e2) = planar_edges(
                mesh.position(i0 as usize),
                mesh.position(i1 as usize),
                mesh.position(i2 as usize),
            )?;
            warn!(face = t, "degenerate material coordinates, using 3D rest shape");
            inverse_edge_matrix(e1, e2).map(|inv| ((e1, e2), inv))
        });

    match rest_edges {
        Some(((e1, e2), dm_inv)) => {
            let rest_area = 0.5 * (e1.x * e2.y - e2.x * e1.y).abs();
            if rest_area < DEGENERATE_AREA_THRESHOLD {
                warn!(face = t, rest_area, "face rest area below threshold");
                return degenerate_face(points);
            }
            Face {
                points,
                dm_inv,
                rest_area,
            }
        }
        None => {
            warn!(face = t, "degenerate face, it will carry no elastic forces");
            degenerate_face(points)
        }
    }
}

fn degenerate_face(points: [PointId; 3]) -> Face {
    Face {
        points,
        dm_inv: [0.0; 4],
        rest_area: 0.0,
    }
}
