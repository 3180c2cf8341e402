//! Procedural cloth patches.
//!
//! Both generators produce the same connectivity and material coordinates;
//! they differ only in how the patch is placed in the world.

use glam::DVec3;

use crate::mesh::TriangleMesh;

/// Generates a flat rectangular quad grid hanging in the XY plane.
///
/// The grid spans `[-width/2, width/2]` in X and `[-height/2, height/2]` in Y,
/// centered at the origin at Z=0. Vertex 0 is the top-left corner and
/// vertex `cols` the top-right corner.
///
/// # Arguments
/// - `cols`: Number of quads along X (vertex count = cols + 1).
/// - `rows`: Number of quads along Y (vertex count = rows + 1).
/// - `width`: Total width in meters.
/// - `height`: Total height in meters.
///
/// # Example
/// ```
/// use weft_mesh::generators::quad_grid;
/// let mesh = quad_grid(2, 2, 1.0, 1.0);
/// assert_eq!(mesh.vertex_count(), 9);  // 3×3 vertices
/// assert_eq!(mesh.triangle_count(), 8); // 2×2 quads × 2 tris each
/// ```
pub fn quad_grid(cols: usize, rows: usize, width: f64, height: f64) -> TriangleMesh {
    grid(cols, rows, width, height, |x, y| DVec3::new(x, y, 0.0))
}

/// Generates the same patch as [`quad_grid`] lying flat in the XZ plane
/// at Y=0, so gravity acts along its normal.
pub fn horizontal_quad_grid(cols: usize, rows: usize, width: f64, height: f64) -> TriangleMesh {
    grid(cols, rows, width, height, |x, y| DVec3::new(x, 0.0, -y))
}

fn grid(
    cols: usize,
    rows: usize,
    width: f64,
    height: f64,
    place: impl Fn(f64, f64) -> DVec3,
) -> TriangleMesh {
    let cols = cols.max(1);
    let rows = rows.max(1);
    let verts_x = cols + 1;
    let verts_y = rows + 1;

    let mut mesh = TriangleMesh::with_capacity(verts_x * verts_y, cols * rows * 2);

    let half_w = width / 2.0;
    let half_h = height / 2.0;

    for j in 0..verts_y {
        for i in 0..verts_x {
            let x = -half_w + width * i as f64 / cols as f64;
            let y = half_h - height * j as f64 / rows as f64; // Top to bottom
            mesh.push_vertex(place(x, y), [x, y]);
        }
    }

    // Two triangles per quad, counter-clockwise in material space
    for j in 0..rows {
        for i in 0..cols {
            let top_left = (j * verts_x + i) as u32;
            let top_right = top_left + 1;
            let bot_left = top_left + verts_x as u32;
            let bot_right = bot_left + 1;

            mesh.indices.extend_from_slice(&[top_left, bot_left, top_right]);
            mesh.indices.extend_from_slice(&[top_right, bot_left, bot_right]);
        }
    }

    mesh
}
