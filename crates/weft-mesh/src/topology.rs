//! Mesh topology queries.
//!
//! Builds edge adjacency from the triangle index buffer. Edges come out in
//! ascending `(v_min, v_max)` order so two builds of the same mesh produce
//! identical edge lists.

use std::collections::{BTreeMap, BTreeSet};

use crate::mesh::TriangleMesh;

/// Precomputed topology information for a triangle mesh.
#[derive(Debug, Clone)]
pub struct Topology {
    /// For each vertex, the list of triangles that contain it.
    pub vertex_triangles: Vec<Vec<u32>>,

    /// Unique edges, sorted by `(v_min, v_max)`.
    pub edges: Vec<EdgeAdjacency>,
}

/// A unique mesh edge with every triangle that uses it.
///
/// `v0 → v1` follows the winding of the first adjacent triangle, and
/// `opposite[k]` is the corner of `triangles[k]` not on the edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeAdjacency {
    /// First endpoint.
    pub v0: u32,
    /// Second endpoint.
    pub v1: u32,
    /// Adjacent triangles, in index order.
    pub triangles: Vec<u32>,
    /// Opposite corner of each adjacent triangle.
    pub opposite: Vec<u32>,
}

impl EdgeAdjacency {
    /// Edge with exactly one adjacent triangle.
    pub fn is_boundary(&self) -> bool {
        self.triangles.len() == 1
    }

    /// Edge shared by more than two triangles.
    pub fn is_non_manifold(&self) -> bool {
        self.triangles.len() > 2
    }

    /// The hinge over this edge, if it has exactly two triangles.
    pub fn interior(&self) -> Option<InteriorEdge> {
        match (self.triangles.as_slice(), self.opposite.as_slice()) {
            (&[tri_a, tri_b], &[wing_a, wing_b]) => Some(InteriorEdge {
                v0: self.v0,
                v1: self.v1,
                wing_a,
                wing_b,
                tri_a,
                tri_b,
            }),
            _ => None,
        }
    }
}

/// An interior (non-boundary) edge with its two adjacent triangles.
///
/// The dihedral angle between tri_a and tri_b across this edge defines the
/// bending energy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InteriorEdge {
    /// Index of vertex A of the shared edge.
    pub v0: u32,
    /// Index of vertex B of the shared edge.
    pub v1: u32,
    /// The "wing" vertex of triangle A (not on the edge).
    pub wing_a: u32,
    /// The "wing" vertex of triangle B (not on the edge).
    pub wing_b: u32,
    /// Index of adjacent triangle A.
    pub tri_a: u32,
    /// Index of adjacent triangle B.
    pub tri_b: u32,
}

impl Topology {
    /// Build topology from a triangle mesh.
    ///
    /// The mesh is assumed to have passed [`TriangleMesh::validate`].
    pub fn build(mesh: &TriangleMesh) -> Self {
        let vertex_count = mesh.vertex_count();
        let tri_count = mesh.triangle_count();

        let mut vertex_triangles: Vec<Vec<u32>> = vec![Vec::new(); vertex_count];
        let mut edge_map: BTreeMap<(u32, u32), EdgeAdjacency> = BTreeMap::new();

        for t in 0..tri_count {
            let [a, b, c] = mesh.triangle(t);
            for v in [a, b, c] {
                vertex_triangles[v as usize].push(t as u32);
            }

            for (v0, v1, wing) in [(a, b, c), (b, c, a), (c, a, b)] {
                let key = (v0.min(v1), v0.max(v1));
                let entry = edge_map.entry(key).or_insert_with(|| EdgeAdjacency {
                    v0,
                    v1,
                    triangles: Vec::with_capacity(2),
                    opposite: Vec::with_capacity(2),
                });
                entry.triangles.push(t as u32);
                entry.opposite.push(wing);
            }
        }

        Self {
            vertex_triangles,
            edges: edge_map.into_values().collect(),
        }
    }

    /// Iterates over the hinges of all interior edges.
    pub fn interior_edges(&self) -> impl Iterator<Item = InteriorEdge> + '_ {
        self.edges.iter().filter_map(EdgeAdjacency::interior)
    }

    /// Returns the 1-ring vertex neighborhood of vertex `v`, sorted.
    pub fn one_ring(&self, v: u32, mesh: &TriangleMesh) -> BTreeSet<u32> {
        self.vertex_triangles[v as usize]
            .iter()
            .flat_map(|&tri| mesh.triangle(tri as usize))
            .filter(|&u| u != v)
            .collect()
    }

    /// Returns the number of boundary edges (edges with only 1 adjacent triangle).
    pub fn boundary_edge_count(&self) -> usize {
        self.edges.iter().filter(|e| e.is_boundary()).count()
    }

    /// Returns true if the mesh is closed (no boundary edges).
    pub fn is_closed(&self) -> bool {
        self.boundary_edge_count() == 0
    }

    /// Returns the first edge shared by more than two triangles, if any.
    pub fn first_non_manifold_edge(&self) -> Option<&EdgeAdjacency> {
        self.edges.iter().find(|e| e.is_non_manifold())
    }

    /// Vertices not referenced by any triangle.
    pub fn isolated_vertices(&self) -> impl Iterator<Item = u32> + '_ {
        self.vertex_triangles
            .iter()
            .enumerate()
            .filter(|(_, tris)| tris.is_empty())
            .map(|(v, _)| v as u32)
    }
}
