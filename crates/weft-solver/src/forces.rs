//! Force passes feeding the linear system.
//!
//! Each pass walks one kind of element (faces, hinges, handles), evaluates
//! its local force and Jacobian, and scatters them into a
//! [`LinearSystem`]. The per-element functions are public so callers can
//! assemble any subset in any order; the result only depends on the set.

use glam::DVec3;
use nalgebra::{Matrix3, SMatrix, SVector, Vector3};

use weft_material::FabricProperties;
use weft_math::dense::from_segments;
use weft_math::Vec9;
use weft_mesh::{Edge, Face, SimMesh};

use crate::assembly::{indices1, indices3, indices4, LinearSystem};
use crate::bending::bending_force;
use crate::handle::Handle;
use crate::stretching::stretching_force;
use crate::wind::Wind;

/// Gravity and wind on one face, split evenly over its corners.
///
/// Gravity is constant and has no Jacobian. The wind's velocity Jacobian
/// enters the matrix as `−dt·J_v`.
pub fn add_face_external(
    system: &mut LinearSystem,
    mesh: &SimMesh,
    face: &Face,
    density: f64,
    dt: f64,
    gravity: DVec3,
    wind: &Wind,
) {
    let indices = indices3(face.points);

    let weight = density * face.rest_area / 3.0 * gravity;
    let mut force: Vec9 = from_segments(&[weight; 3]);

    if !wind.is_calm() {
        let area = mesh.face_area(face);
        let (f, jv) = wind.face_force(mesh.face_normal(face), area, mesh.face_velocity(face));
        force += f;
        system.add_sub_matrix(&(jv * -dt), &indices);
    }

    system.add_sub_vector(&(force * dt), &indices);
}

/// Adds gravity and wind for every face.
pub fn add_external_forces(
    system: &mut LinearSystem,
    mesh: &SimMesh,
    material: &FabricProperties,
    dt: f64,
    gravity: DVec3,
    wind: &Wind,
) {
    for face in mesh.faces() {
        add_face_external(system, mesh, face, material.density, dt, gravity, wind);
    }
}

/// Scatters an elastic force `f` with position Jacobian `j` over the points
/// behind `indices`, with stiffness-proportional damping `c`:
/// matrix `−dt·(dt + c)·J`, vector `dt·(f + (dt + c)·J·v)`.
fn add_elastic<const N: usize>(
    system: &mut LinearSystem,
    force: SVector<f64, N>,
    jacobian: SMatrix<f64, N, N>,
    velocity: SVector<f64, N>,
    indices: &[usize; N],
    dt: f64,
    damping: f64,
) {
    let h = dt + damping;
    system.add_sub_matrix(&(jacobian * (-dt * h)), indices);
    system.add_sub_vector(&((force + jacobian * velocity * h) * dt), indices);
}

/// Stretching of one face.
pub fn add_face_stretching(
    system: &mut LinearSystem,
    mesh: &SimMesh,
    face: &Face,
    material: &FabricProperties,
    dt: f64,
) {
    if face.is_degenerate() {
        return;
    }
    let (force, jacobian) = stretching_force(face, mesh.face_positions(face), &material.stretching);
    let velocity = from_segments(&face.points.map(|p| mesh.velocity(p)));
    add_elastic(
        system,
        force,
        jacobian,
        velocity,
        &indices3(face.points),
        dt,
        material.damping,
    );
}

/// Bending across one edge. Boundary edges are skipped.
pub fn add_edge_bending(
    system: &mut LinearSystem,
    mesh: &SimMesh,
    edge: &Edge,
    material: &FabricProperties,
    dt: f64,
) {
    let Some(stencil) = edge.stencil() else {
        return;
    };
    if material.bending_stiffness == 0.0 {
        return;
    }
    let (force, jacobian) = bending_force(
        edge,
        stencil.map(|p| mesh.position(p)),
        material.bending_stiffness,
    );
    let velocity = from_segments(&stencil.map(|p| mesh.velocity(p)));
    add_elastic(
        system,
        force,
        jacobian,
        velocity,
        &indices4(stencil),
        dt,
        material.damping,
    );
}

/// Adds stretching for every face and bending for every interior edge.
pub fn add_internal_forces(
    system: &mut LinearSystem,
    mesh: &SimMesh,
    material: &FabricProperties,
    dt: f64,
) {
    for face in mesh.faces() {
        add_face_stretching(system, mesh, face, material, dt);
    }
    for edge in mesh.edges() {
        add_edge_bending(system, mesh, edge, material, dt);
    }
}

/// Penalty spring of one handle: matrix `dt²·k·I`, vector
/// `dt·(k·(target − x) − dt·k·v)`.
pub fn add_handle_force(system: &mut LinearSystem, mesh: &SimMesh, handle: &Handle, dt: f64) {
    let point = mesh.point(handle.point);
    let k = handle.stiffness;
    let stiffness = Matrix3::<f64>::identity() * (dt * dt * k);
    let rhs = (handle.force(point.position) - dt * k * point.velocity) * dt;

    let indices = indices1(handle.point);
    system.add_sub_matrix(&stiffness, &indices);
    system.add_sub_vector(&Vector3::new(rhs.x, rhs.y, rhs.z), &indices);
}

/// Adds every handle.
pub fn add_handle_forces(system: &mut LinearSystem, mesh: &SimMesh, handles: &[Handle], dt: f64) {
    for handle in handles {
        add_handle_force(system, mesh, handle, dt);
    }
}
