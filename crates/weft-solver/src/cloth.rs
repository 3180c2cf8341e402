//! Implicit cloth simulation driver.
//!
//! Each call to [`Cloth::update`] runs one backward-Euler step:
//! 1. **Init**: mass matrix on the diagonal, zero right-hand side
//! 2. **External**: gravity and wind per face
//! 3. **Internal**: stretching per face, bending per interior edge
//! 4. **Handles**: penalty springs on pinned points
//! 5. **Solve**: sparse Cholesky for `Δv`
//! 6. **Apply**: hand `Δv` to the mesh, which integrates velocity and position
//!
//! A step that fails leaves the mesh exactly as it was, and the error
//! carries the step index and `dt` so a caller can retry with a smaller
//! timestep.

use std::time::Instant;

use glam::DVec3;
use tracing::{debug, error, trace};

use weft_material::FabricProperties;
use weft_math::faer_solver::FaerSolver;
use weft_math::sparse::{CsrMatrix, FactorizationError, SparseSolver};
use weft_mesh::{SimMesh, TriangleMesh};
use weft_types::{PointId, WeftError, WeftResult};

use crate::assembly::{check_system, LinearSystem, SystemDefect};
use crate::bending::bending_energy;
use crate::config::SolverConfig;
use crate::forces::{add_external_forces, add_handle_forces, add_internal_forces};
use crate::handle::Handle;
use crate::step::StepResult;
use crate::stretching::stretching_energy;
use crate::wind::Wind;

/// A piece of cloth: mesh state, material, handles and solver.
pub struct Cloth {
    mesh: SimMesh,
    material: FabricProperties,
    handles: Vec<Handle>,
    config: SolverConfig,
    solver: FaerSolver,
    steps: u64,
}

impl Cloth {
    /// Builds a cloth from an input mesh.
    pub fn new(mesh: &TriangleMesh, material: FabricProperties, config: SolverConfig) -> WeftResult<Self> {
        material.validate()?;
        let sim = SimMesh::from_triangle_mesh(mesh, material.density)?;
        Self::from_sim_mesh(sim, material, config)
    }

    /// Wraps an existing simulation mesh.
    ///
    /// The mesh masses are taken as they are; `material.density` is only
    /// used for gravity.
    pub fn from_sim_mesh(mesh: SimMesh, material: FabricProperties, config: SolverConfig) -> WeftResult<Self> {
        material.validate()?;
        config.validate()?;
        Ok(Self {
            mesh,
            material,
            handles: Vec::new(),
            config,
            solver: FaerSolver::new(),
            steps: 0,
        })
    }

    /// Simulation mesh.
    pub fn mesh(&self) -> &SimMesh {
        &self.mesh
    }

    /// Fabric parameters.
    pub fn material(&self) -> &FabricProperties {
        &self.material
    }

    /// Solver configuration.
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Active handles.
    pub fn handles(&self) -> &[Handle] {
        &self.handles
    }

    /// Number of completed steps.
    pub fn step_count(&self) -> u64 {
        self.steps
    }

    /// Pins point `index` at its current position with the configured
    /// handle stiffness.
    pub fn add_handle(&mut self, index: usize) -> WeftResult<()> {
        if index >= self.mesh.point_count() {
            return Err(WeftError::InvalidConfig(format!(
                "handle point {index} out of range (point count: {})",
                self.mesh.point_count()
            )));
        }
        let handle = Handle::pin(&self.mesh, PointId(index as u32), self.config.handle_stiffness);
        self.push_handle(handle)
    }

    /// Adds a handle with its own stiffness and target.
    pub fn push_handle(&mut self, handle: Handle) -> WeftResult<()> {
        handle.validate(&self.mesh)?;
        debug!(point = handle.point.0, stiffness = handle.stiffness, "added handle");
        self.handles.push(handle);
        Ok(())
    }

    /// Sets a point's velocity. Intended for initial conditions.
    pub fn set_velocity(&mut self, index: usize, velocity: DVec3) -> WeftResult<()> {
        if index >= self.mesh.point_count() {
            return Err(WeftError::InvalidConfig(format!(
                "point {index} out of range (point count: {})",
                self.mesh.point_count()
            )));
        }
        self.mesh.set_velocity(PointId(index as u32), velocity);
        Ok(())
    }

    /// Replaces the whole dynamic state, e.g. from a recorded frame.
    ///
    /// `velocities` may be empty, meaning at rest. The next step is numbered
    /// `next_step`. Nothing changes if the input is rejected.
    pub fn restore_state(
        &mut self,
        next_step: u64,
        positions: &[DVec3],
        velocities: &[DVec3],
    ) -> WeftResult<()> {
        let n = self.mesh.point_count();
        if positions.len() != n || !(velocities.is_empty() || velocities.len() == n) {
            return Err(WeftError::InvalidConfig(format!(
                "state has {} positions and {} velocities, mesh has {n} points",
                positions.len(),
                velocities.len()
            )));
        }
        if let Some(i) = positions
            .iter()
            .chain(velocities)
            .position(|v| !v.is_finite())
        {
            return Err(WeftError::InvalidConfig(format!(
                "state value {i} is not finite"
            )));
        }

        for (i, &x) in positions.iter().enumerate() {
            let id = PointId(i as u32);
            self.mesh.set_position(id, x);
            self.mesh
                .set_velocity(id, velocities.get(i).copied().unwrap_or(DVec3::ZERO));
        }
        self.steps = next_step;
        debug!(points = n, next_step, "state restored");
        Ok(())
    }

    /// Assembles `A·Δv = b` for the current state.
    pub fn assemble(&self, dt: f64, gravity: DVec3, wind: &Wind) -> (CsrMatrix, Vec<f64>) {
        let mut system = LinearSystem::init(&self.mesh);
        add_external_forces(&mut system, &self.mesh, &self.material, dt, gravity, wind);
        add_internal_forces(&mut system, &self.mesh, &self.material, dt);
        add_handle_forces(&mut system, &self.mesh, &self.handles, dt);
        trace!(contributions = system.contributions(), "scattered element blocks");
        system.finish()
    }

    /// Assembles and solves for the velocity delta without touching the
    /// mesh.
    pub fn solve_velocity_delta(&mut self, dt: f64, gravity: DVec3, wind: &Wind) -> WeftResult<Vec<f64>> {
        self.solve(dt, gravity, wind).map(|solved| solved.dv)
    }

    /// Advances the cloth by one step.
    ///
    /// On error the mesh is unchanged and the step counter is not advanced.
    pub fn update(&mut self, dt: f64, gravity: DVec3, wind: &Wind) -> WeftResult<StepResult> {
        let start = Instant::now();
        let solved = self.solve(dt, gravity, wind)?;

        self.mesh.apply_velocity_delta(&solved.dv, dt);

        let max_velocity_delta = solved
            .dv
            .chunks_exact(3)
            .map(|d| DVec3::new(d[0], d[1], d[2]).length())
            .fold(0.0, f64::max);

        let result = StepResult {
            step: self.steps,
            dt,
            dimension: solved.dv.len(),
            nnz: solved.nnz,
            assembly_time: solved.assembly_time,
            solve_time: solved.solve_time,
            wall_time: start.elapsed().as_secs_f64(),
            max_velocity_delta,
        };
        self.steps += 1;

        debug!(
            step = result.step,
            dt,
            nnz = result.nnz,
            max_dv = max_velocity_delta,
            "step complete"
        );
        Ok(result)
    }

    /// Total elastic energy (stretching + bending + handles) of the current
    /// state.
    pub fn elastic_energy(&self) -> f64 {
        let mesh = &self.mesh;
        let stretching: f64 = mesh
            .faces()
            .iter()
            .map(|f| stretching_energy(f, mesh.face_positions(f), &self.material.stretching))
            .sum();
        let bending: f64 = mesh
            .edges()
            .iter()
            .filter_map(|e| e.stencil().map(|s| (e, s)))
            .map(|(e, s)| bending_energy(e, s.map(|p| mesh.position(p)), self.material.bending_stiffness))
            .sum();
        let handles: f64 = self
            .handles
            .iter()
            .map(|h| h.energy(mesh.position(h.point)))
            .sum();
        stretching + bending + handles
    }

    /// Kinetic energy of the current state.
    pub fn kinetic_energy(&self) -> f64 {
        self.mesh.kinetic_energy()
    }

    fn solve(&mut self, dt: f64, gravity: DVec3, wind: &Wind) -> WeftResult<Solved> {
        if !(dt.is_finite() && dt > 0.0) {
            return Err(WeftError::InvalidConfig(format!("timestep must be positive, got {dt}")));
        }
        let step = self.steps;

        let assembly_start = Instant::now();
        let (matrix, rhs) = self.assemble(dt, gravity, wind);
        let assembly_time = assembly_start.elapsed().as_secs_f64();

        if self.config.check_diagonal {
            check_system(&matrix, &rhs).map_err(|defect| {
                error!(step, dt, ?defect, "assembled system rejected");
                match defect {
                    SystemDefect::NonFinite(detail) => WeftError::NonFinite { step, dt, detail },
                    SystemDefect::NonPositiveDiagonal(detail) => {
                        WeftError::NotPositiveDefinite { step, dt, detail }
                    }
                }
            })?;
        }

        let solve_start = Instant::now();
        self.solver.factorize(&matrix).map_err(|e| {
            error!(step, dt, error = %e, "factorization failed");
            match e {
                FactorizationError::NotPositiveDefinite(detail) => {
                    WeftError::NotPositiveDefinite { step, dt, detail }
                }
                FactorizationError::Invalid(detail) => WeftError::Solver(detail),
            }
        })?;

        let mut dv = vec![0.0; rhs.len()];
        self.solver.solve(&rhs, &mut dv).map_err(|detail| {
            error!(step, dt, %detail, "back-substitution failed");
            WeftError::NonFinite { step, dt, detail }
        })?;
        let solve_time = solve_start.elapsed().as_secs_f64();

        Ok(Solved {
            dv,
            nnz: matrix.nnz(),
            assembly_time,
            solve_time,
        })
    }
}

struct Solved {
    dv: Vec<f64>,
    nnz: usize,
    assembly_time: f64,
    solve_time: f64,
}
