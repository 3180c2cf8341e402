//! Step driver with half-step retry.
//!
//! A step the solver rejects (non-finite or not positive-definite system)
//! leaves the cloth untouched, so it can be retried as two steps of half
//! the size. Every attempt, accepted or not, is reported on the event bus.

use glam::DVec3;
use tracing::warn;

use weft_solver::{Cloth, StepResult, Wind};
use weft_telemetry::{EventBus, EventKind, SimulationEvent};
use weft_types::WeftResult;

/// Anything that can attempt one implicit step of a given size.
///
/// A failed attempt must leave the state as it was.
pub trait Stepper {
    /// Index the next step will carry.
    fn step_count(&self) -> u64;

    /// Attempts one step of size `dt`.
    fn try_step(&mut self, dt: f64) -> WeftResult<StepResult>;
}

/// A cloth stepped under fixed gravity and wind.
pub struct ClothStepper<'a> {
    /// Cloth being advanced.
    pub cloth: &'a mut Cloth,
    /// Gravitational acceleration.
    pub gravity: DVec3,
    /// Ambient wind.
    pub wind: &'a Wind,
}

impl Stepper for ClothStepper<'_> {
    fn step_count(&self) -> u64 {
        self.cloth.step_count()
    }

    fn try_step(&mut self, dt: f64) -> WeftResult<StepResult> {
        self.cloth.update(dt, self.gravity, self.wind)
    }
}

/// Advances by `dt`, splitting a failed step into two half steps at most
/// `retries` levels deep.
///
/// Returns the number of accepted steps. Emits `StepBegin` for every
/// attempt, `StepFailed` for every rejected one, and the assembly, solve
/// and end events for every accepted one. Errors that are not step
/// failures are returned without retrying.
pub fn advance<S: Stepper>(stepper: &mut S, bus: &EventBus, dt: f64, retries: u32) -> WeftResult<u32> {
    let step = stepper.step_count();
    bus.emit(SimulationEvent::new(step, EventKind::StepBegin { dt }));

    match stepper.try_step(dt) {
        Ok(result) => {
            emit_step(bus, &result);
            Ok(1)
        }
        Err(e) => {
            bus.emit(SimulationEvent::new(
                step,
                EventKind::StepFailed {
                    reason: e.to_string(),
                },
            ));
            if !(e.is_step_failure() && retries > 0) {
                return Err(e);
            }
            warn!(step, dt, error = %e, "step failed, retrying with dt/2");
            let first = advance(stepper, bus, dt / 2.0, retries - 1)?;
            let second = advance(stepper, bus, dt / 2.0, retries - 1)?;
            Ok(first + second)
        }
    }
}

fn emit_step(bus: &EventBus, result: &StepResult) {
    bus.emit(SimulationEvent::new(
        result.step,
        EventKind::Assembly {
            nnz: result.nnz,
            dimension: result.dimension,
            wall_time: result.assembly_time,
        },
    ));
    bus.emit(SimulationEvent::new(
        result.step,
        EventKind::Solve {
            wall_time: result.solve_time,
        },
    ));
    bus.emit(SimulationEvent::new(
        result.step,
        EventKind::StepEnd {
            wall_time: result.wall_time,
            max_velocity_delta: result.max_velocity_delta,
        },
    ));
}
