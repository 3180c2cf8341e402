//! Force model tests: stretching, bending and wind checked against
//! finite differences of their energies and forces.

use glam::{DMat3, DVec3};
use weft_material::StretchingStiffness;
use weft_math::dense::{is_symmetric, segment};
use weft_math::{Mat12, Mat9, Vec12, Vec9};
use weft_mesh::generators::quad_grid;
use weft_mesh::{Edge, Face, SimMesh, TriangleMesh};
use weft_solver::bending::{bending_energy, bending_force, dihedral_gradient};
use weft_solver::stretching::{stretching_energy, stretching_force};
use weft_solver::Wind;

const EPS: f64 = 1e-6;

fn stiffness() -> StretchingStiffness {
    StretchingStiffness::orthotropic(1000.0, 800.0, 150.0, 300.0)
}

/// A single right triangle with unit legs in material space.
fn unit_face() -> (SimMesh, Face) {
    let positions = vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
    let mesh = TriangleMesh::from_interleaved(&positions, &[0, 1, 2], &[]).unwrap();
    let sim = SimMesh::from_triangle_mesh(&mesh, 0.1).unwrap();
    let face = sim.faces()[0];
    (sim, face)
}

/// The diagonal hinge of a unit square.
fn unit_hinge() -> (SimMesh, Edge, [DVec3; 4]) {
    let sim = SimMesh::from_triangle_mesh(&quad_grid(1, 1, 1.0, 1.0), 0.1).unwrap();
    let edge = *sim.edges().iter().find(|e| e.is_interior()).unwrap();
    let x = edge.stencil().unwrap().map(|p| sim.position(p));
    (sim, edge, x)
}

fn perturb<const P: usize>(x: [DVec3; P], dof: usize, h: f64) -> [DVec3; P] {
    let mut out = x;
    out[dof / 3][dof % 3] += h;
    out
}

fn max_abs_diff9(a: &Mat9, b: &Mat9) -> f64 {
    (a - b).amax()
}

// ─── Stretching Tests ─────────────────────────────────────────

#[test]
fn stretching_force_vanishes_at_rest() {
    let (sim, face) = unit_face();
    let (f, _) = stretching_force(&face, sim.face_positions(&face), &stiffness());
    assert!(f.amax() < 1e-12, "rest force = {:?}", f);
    assert!(stretching_energy(&face, sim.face_positions(&face), &stiffness()).abs() < 1e-20);
}

#[test]
fn stretching_force_vanishes_for_rotated_rest_shape() {
    let (sim, face) = unit_face();
    let rot = DMat3::from_rotation_y(0.9) * DMat3::from_rotation_x(-0.4);
    let offset = DVec3::new(3.0, -1.0, 2.0);
    let x = sim.face_positions(&face).map(|p| rot * p + offset);
    let (f, _) = stretching_force(&face, x, &stiffness());
    assert!(f.amax() < 1e-9, "rotated rest force = {:?}", f);
}

#[test]
fn stretching_jacobian_matches_finite_differences_at_rest() {
    let (sim, face) = unit_face();
    let x = sim.face_positions(&face);
    let (_, jacobian) = stretching_force(&face, x, &stiffness());

    let mut fd = Mat9::zeros();
    for j in 0..9 {
        let (fp, _) = stretching_force(&face, perturb(x, j, EPS), &stiffness());
        let (fm, _) = stretching_force(&face, perturb(x, j, -EPS), &stiffness());
        let col = (fp - fm) * (1.0 / (2.0 * EPS));
        for i in 0..9 {
            fd[(i, j)] = col[i];
        }
    }

    let err = max_abs_diff9(&jacobian, &fd);
    assert!(err < 1e-5 * jacobian.amax(), "Jacobian error {err}");
    assert!(is_symmetric(&jacobian, 1e-9));
}

#[test]
fn stretching_jacobian_is_exact_under_uniaxial_tension() {
    let (sim, face) = unit_face();
    let x = sim.face_positions(&face).map(|p| DVec3::new(1.1 * p.x, p.y, p.z));
    let (_, jacobian) = stretching_force(&face, x, &stiffness());

    let mut fd = Mat9::zeros();
    for j in 0..9 {
        let (fp, _) = stretching_force(&face, perturb(x, j, EPS), &stiffness());
        let (fm, _) = stretching_force(&face, perturb(x, j, -EPS), &stiffness());
        let col = (fp - fm) * (1.0 / (2.0 * EPS));
        for i in 0..9 {
            fd[(i, j)] = col[i];
        }
    }

    let err = max_abs_diff9(&jacobian, &fd);
    assert!(err < 1e-5 * jacobian.amax(), "Jacobian error {err}");
}

#[test]
fn stretching_force_is_negative_energy_gradient() {
    let (sim, face) = unit_face();
    let x = sim.face_positions(&face);
    let x = [
        x[0] + DVec3::new(0.02, -0.01, 0.03),
        x[1] + DVec3::new(0.15, 0.04, -0.02),
        x[2] + DVec3::new(-0.05, 0.12, 0.08),
    ];
    let (force, _) = stretching_force(&face, x, &stiffness());

    let mut fd = Vec9::zeros();
    for j in 0..9 {
        let ep = stretching_energy(&face, perturb(x, j, EPS), &stiffness());
        let em = stretching_energy(&face, perturb(x, j, -EPS), &stiffness());
        fd[j] = -(ep - em) / (2.0 * EPS);
    }

    let err = (force - fd).amax();
    assert!(err < 1e-5 * force.amax(), "force error {err}, force {:?}", force);
}

#[test]
fn stretching_force_is_translation_free() {
    let (sim, face) = unit_face();
    let x = sim.face_positions(&face).map(|p| DVec3::new(1.3 * p.x, 0.8 * p.y, 0.2 * p.x));
    let (force, _) = stretching_force(&face, x, &stiffness());
    let net = segment(&force, 0) + segment(&force, 1) + segment(&force, 2);
    assert!(net.length() < 1e-9, "net force {net}");
}

#[test]
fn stretching_jacobian_is_negative_semidefinite_under_compression() {
    let (sim, face) = unit_face();
    let x = sim.face_positions(&face).map(|p| DVec3::new(0.7 * p.x, 0.9 * p.y, 0.1 * p.y));
    let (_, jacobian) = stretching_force(&face, x, &stiffness());
    assert!(is_symmetric(&jacobian, 1e-9));
    for seed in 0..20 {
        let mut v = Vec9::zeros();
        for i in 0..9 {
            v[i] = ((seed * 31 + i * 17) % 13) as f64 - 6.0;
        }
        let q = v.dot(&(jacobian * v));
        assert!(q <= 1e-9, "vᵀJv = {q} for seed {seed}");
    }
}

#[test]
fn degenerate_face_produces_zeros() {
    let (sim, mut face) = unit_face();
    face.rest_area = 0.0;
    face.dm_inv = [0.0; 4];
    let (f, j) = stretching_force(&face, sim.face_positions(&face), &stiffness());
    assert_eq!(f, Vec9::zeros());
    assert_eq!(j, Mat9::zeros());
    assert!(f.iter().chain(j.iter()).all(|v| v.is_finite()));
}

// ─── Bending Tests ────────────────────────────────────────────

#[test]
fn flat_hinge_has_no_bending_force() {
    let (_, edge, x) = unit_hinge();
    let (f, j) = bending_force(&edge, x, 1.0);
    assert!(f.amax() < 1e-12, "flat force = {:?}", f);
    assert!(j.iter().all(|v| v.is_finite()));
    assert!(bending_energy(&edge, x, 1.0).abs() < 1e-20);
}

#[test]
fn dihedral_gradient_is_translation_and_rotation_free() {
    let (_, _, x) = unit_hinge();
    let x = [x[0], x[1], x[2], x[3] + DVec3::new(0.0, 0.0, 0.4)];
    let grad = dihedral_gradient(x).unwrap();

    let net: DVec3 = (0..4).map(|i| segment(&grad, i)).sum();
    assert!(net.length() < 1e-12, "net gradient {net}");

    // Infinitesimal rotation about any axis leaves θ unchanged
    for axis in [DVec3::X, DVec3::Y, DVec3::Z] {
        let rate: f64 = (0..4).map(|i| segment(&grad, i).dot(axis.cross(x[i]))).sum();
        assert!(rate.abs() < 1e-12, "rotation rate {rate} about {axis}");
    }
}

#[test]
fn bending_force_is_negative_energy_gradient() {
    let (_, edge, x) = unit_hinge();
    let x = [
        x[0],
        x[1] + DVec3::new(0.0, 0.05, 0.02),
        x[2] + DVec3::new(0.03, 0.0, -0.15),
        x[3] + DVec3::new(0.0, 0.0, 0.35),
    ];
    let kb = 0.01;
    let (force, _) = bending_force(&edge, x, kb);
    assert!(force.amax() > 1e-6);

    let mut fd = Vec12::zeros();
    for j in 0..12 {
        let ep = bending_energy(&edge, perturb(x, j, EPS), kb);
        let em = bending_energy(&edge, perturb(x, j, -EPS), kb);
        fd[j] = -(ep - em) / (2.0 * EPS);
    }

    let err = (force - fd).amax();
    assert!(err < 1e-6 * force.amax().max(1.0), "force error {err}");
}

#[test]
fn bending_jacobian_is_symmetric_semidefinite() {
    let (_, edge, x) = unit_hinge();
    let x = [x[0], x[1], x[2], x[3] + DVec3::new(0.1, 0.0, 0.5)];
    let (_, jacobian) = bending_force(&edge, x, 1.0);
    assert!(is_symmetric(&jacobian, 1e-12));
    for seed in 0..20 {
        let mut v = Vec12::zeros();
        for i in 0..12 {
            v[i] = ((seed * 7 + i * 11) % 9) as f64 - 4.0;
        }
        assert!(v.dot(&(jacobian * v)) <= 1e-12);
    }
}

#[test]
fn folded_rest_shape_is_bending_equilibrium() {
    let mut mesh = quad_grid(1, 1, 1.0, 1.0);
    mesh.pos_z[3] = 0.4;
    let sim = SimMesh::from_triangle_mesh(&mesh, 0.1).unwrap();
    let edge = *sim.edges().iter().find(|e| e.is_interior()).unwrap();
    let x = edge.stencil().unwrap().map(|p| sim.position(p));
    let (f, _) = bending_force(&edge, x, 1.0);
    assert!(f.amax() < 1e-12);

    // Flattening the fold now costs energy
    let mut flat = x;
    flat[3].z = 0.0;
    assert!(bending_energy(&edge, flat, 1.0) > 0.0);
}

/// Rotates `p` about the line through `origin` along the unit `axis`.
fn rotate_about(p: DVec3, origin: DVec3, axis: DVec3, angle: f64) -> DVec3 {
    origin + DMat3::from_axis_angle(axis, angle) * (p - origin)
}

#[test]
fn hinge_folded_near_half_turn_responds_symmetrically() {
    let flat = quad_grid(1, 1, 1.0, 1.0);
    for rest in [2.8, 2.9] {
        // Fold the second wing almost back onto the first
        let sim = SimMesh::from_triangle_mesh(&flat, 0.1).unwrap();
        let stencil = sim.edges().iter().find_map(|e| e.stencil()).unwrap();
        let x = stencil.map(|p| sim.position(p));
        let wing = rotate_about(x[3], x[0], (x[1] - x[0]).normalize(), rest);
        let mut mesh = flat.clone();
        let i = stencil[3].index();
        mesh.pos_x[i] = wing.x;
        mesh.pos_y[i] = wing.y;
        mesh.pos_z[i] = wing.z;

        let sim = SimMesh::from_triangle_mesh(&mesh, 0.1).unwrap();
        let edge = *sim.edges().iter().find(|e| e.is_interior()).unwrap();
        assert!((edge.rest_angle.abs() - rest).abs() < 1e-9, "rest angle {}", edge.rest_angle);

        let x = edge.stencil().unwrap().map(|p| sim.position(p));
        let axis = (x[1] - x[0]).normalize();
        let turned = |delta: f64| [x[0], x[1], x[2], rotate_about(x[3], x[0], axis, delta)];

        // One direction carries the hinge past ±π
        let e_plus = bending_energy(&edge, turned(0.4), 1.0);
        let e_minus = bending_energy(&edge, turned(-0.4), 1.0);
        assert!(e_plus > 0.0);
        assert!((e_plus - e_minus).abs() < 1e-9 * e_plus, "E+ = {e_plus}, E- = {e_minus}");

        let (f_plus, _) = bending_force(&edge, turned(0.4), 1.0);
        let (f_minus, _) = bending_force(&edge, turned(-0.4), 1.0);
        assert!(
            (f_plus.norm() - f_minus.norm()).abs() < 1e-9 * f_plus.norm(),
            "|f+| = {}, |f-| = {}",
            f_plus.norm(),
            f_minus.norm()
        );
    }
}

#[test]
fn bending_scales_with_stiffness() {
    let (_, edge, x) = unit_hinge();
    let x = [x[0], x[1], x[2], x[3] + DVec3::new(0.0, 0.0, 0.3)];
    let (f1, j1) = bending_force(&edge, x, 1.0);
    let (f2, j2) = bending_force(&edge, x, 2.0);
    assert!((f2 - f1 * 2.0).amax() < 1e-12);
    assert!((j2 - j1 * 2.0).amax() < 1e-12);
}

#[test]
fn collapsed_wing_produces_zeros() {
    let (_, edge, x) = unit_hinge();
    // Move the first wing onto the hinge edge
    let x = [x[0], x[1], 0.5 * (x[0] + x[1]), x[3]];
    let (f, j) = bending_force(&edge, x, 1.0);
    assert_eq!(f, Vec12::zeros());
    assert_eq!(j, Mat12::zeros());
}

// ─── Wind Tests ───────────────────────────────────────────────

fn breeze() -> Wind {
    Wind {
        density: 1.2,
        velocity: DVec3::new(2.0, 0.5, 6.0),
        drag: 0.3,
    }
}

#[test]
fn calm_wind_is_inert() {
    let (f, j) = Wind::calm().face_force(DVec3::Z, 0.5, DVec3::new(1.0, 2.0, 3.0));
    assert_eq!(f, Vec9::zeros());
    assert_eq!(j, Mat9::zeros());
    assert!(Wind::default().is_calm());
}

#[test]
fn head_on_wind_pushes_along_normal() {
    let wind = Wind {
        density: 1.2,
        velocity: DVec3::new(0.0, 0.0, 5.0),
        drag: 0.0,
    };
    let (f, _) = wind.face_force(DVec3::Z, 0.6, DVec3::ZERO);
    let expected = 0.6 / 3.0 * 1.2 * 25.0;
    for i in 0..3 {
        assert!((segment(&f, i) - DVec3::new(0.0, 0.0, expected)).length() < 1e-12);
    }
}

#[test]
fn face_moving_with_wind_feels_nothing() {
    let wind = breeze();
    let (f, _) = wind.face_force(DVec3::Y, 1.0, wind.velocity);
    assert!(f.amax() < 1e-12);
}

#[test]
fn wind_jacobian_matches_finite_differences() {
    let wind = breeze();
    let n = DVec3::new(0.2, 0.3, 0.9).normalize();
    let area = 0.4;
    let v = [DVec3::new(0.1, 0.0, -0.3), DVec3::new(0.0, 0.2, 0.1), DVec3::new(-0.2, 0.1, 0.0)];
    let force_at = |v: [DVec3; 3]| wind.face_force(n, area, (v[0] + v[1] + v[2]) / 3.0).0;
    let (_, jacobian) = wind.face_force(n, area, (v[0] + v[1] + v[2]) / 3.0);

    let mut fd = Mat9::zeros();
    for j in 0..9 {
        let col = (force_at(perturb(v, j, EPS)) - force_at(perturb(v, j, -EPS))) * (1.0 / (2.0 * EPS));
        for i in 0..9 {
            fd[(i, j)] = col[i];
        }
    }
    let err = max_abs_diff9(&jacobian, &fd);
    assert!(err < 1e-6, "wind Jacobian error {err}");
    assert!(is_symmetric(&jacobian, 1e-12));
}

#[test]
fn wind_toml_defaults() {
    let wind: Wind = toml::from_str("density = 1.2").unwrap();
    assert_eq!(wind.velocity, DVec3::ZERO);
    assert_eq!(wind.drag, 0.0);
    assert!(!wind.is_calm());
}
