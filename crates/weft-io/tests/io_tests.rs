//! Integration tests for weft-io.

use glam::DVec3;
use weft_io::contract::{Frame, FrameOutput, MaterialSpec, Orientation, SceneConfig};
use weft_io::runner::{advance, ClothStepper, Stepper};
use weft_io::validator::validate_scene;
use weft_material::MaterialDatabase;
use weft_solver::StepResult;
use weft_telemetry::{EventBus, EventKind, SimulationEvent, VecSink};
use weft_types::{WeftError, WeftResult};

const SCENE: &str = r#"
dt = 0.005
steps = 40
handles = [0, 4]

[grid]
cols = 4
rows = 3
width = 1.0
height = 0.75

[material]
preset = "silk_charmeuse"

[wind]
density = 1.2
velocity = [0.0, 0.0, 3.0]
drag = 0.05

[solver]
handle_stiffness = 1e5
"#;

const INLINE: &str = r#"
steps = 10

[grid]
cols = 2
rows = 2
width = 1.0
height = 1.0
orientation = "horizontal"

[material]
name = "felt"
density = 0.3
bending_stiffness = 1e-4
damping = 0.001

[material.stretching]
k = [800.0, 100.0, 800.0, 250.0]
"#;

fn db() -> MaterialDatabase {
    MaterialDatabase::with_defaults()
}

// ─── Scene Tests ──────────────────────────────────────────────

#[test]
fn parse_preset_scene() {
    let scene = SceneConfig::from_toml_str(SCENE).unwrap();
    assert_eq!(scene.dt, 0.005);
    assert_eq!(scene.steps, 40);
    assert_eq!(scene.handles, vec![0, 4]);
    assert_eq!(scene.grid.orientation, Orientation::Vertical);
    assert_eq!(scene.grid.point_count(), 20);
    assert_eq!(scene.wind.velocity, DVec3::new(0.0, 0.0, 3.0));
    assert_eq!(scene.solver.handle_stiffness, 1e5);
    assert_eq!(scene.solver.gravity, [0.0, -9.8, 0.0]);
    assert!(matches!(scene.material, MaterialSpec::Preset { ref preset } if preset == "silk_charmeuse"));
    assert!(validate_scene(&scene, &db()).is_ok());
}

#[test]
fn parse_inline_scene_with_defaults() {
    let scene = SceneConfig::from_toml_str(INLINE).unwrap();
    assert_eq!(scene.dt, 0.01);
    assert!(scene.handles.is_empty());
    assert!(scene.wind.is_calm());
    assert_eq!(scene.grid.orientation, Orientation::Horizontal);

    let material = scene.material.resolve(&db()).unwrap();
    assert_eq!(material.name, "felt");
    assert_eq!(material.stretching.shear(), 250.0);
    assert!(validate_scene(&scene, &db()).is_ok());
}

#[test]
fn scene_toml_round_trip() {
    let scene = SceneConfig::from_toml_str(SCENE).unwrap();
    let text = scene.to_toml_string().unwrap();
    let back = SceneConfig::from_toml_str(&text).unwrap();
    assert_eq!(back, scene);
}

#[test]
fn malformed_scene_is_a_serialization_error() {
    let err = SceneConfig::from_toml_str("steps = \"many\"").unwrap_err();
    assert!(matches!(err, WeftError::Serialization(_)));
}

#[test]
fn missing_scene_file_is_io_error() {
    let err = SceneConfig::load("/nonexistent/weft/scene.toml").unwrap_err();
    assert!(matches!(err, WeftError::Io(_)));
}

#[test]
fn build_places_handles() {
    let scene = SceneConfig::from_toml_str(SCENE).unwrap();
    let cloth = scene.build(&db()).unwrap();
    assert_eq!(cloth.mesh().point_count(), 20);
    assert_eq!(cloth.handles().len(), 2);
    assert_eq!(cloth.handles()[1].stiffness, 1e5);
    assert_eq!(cloth.material().name, "silk_charmeuse");
}

#[test]
fn scene_runs() {
    let scene = SceneConfig::from_toml_str(SCENE).unwrap();
    let mut cloth = scene.build(&db()).unwrap();
    let gravity = scene.solver.gravity();
    for _ in 0..5 {
        cloth.update(scene.dt, gravity, &scene.wind).unwrap();
    }
    assert_eq!(cloth.step_count(), 5);
    // Wind blows along +z
    let middle = cloth.mesh().position(weft_types::PointId(12));
    assert!(middle.z > 0.0, "middle point {middle}");
}

// ─── Validator Tests ──────────────────────────────────────────

fn valid_scene() -> SceneConfig {
    SceneConfig::from_toml_str(SCENE).unwrap()
}

#[test]
fn unknown_preset_rejected() {
    let mut scene = valid_scene();
    scene.material = MaterialSpec::Preset {
        preset: "burlap".into(),
    };
    let err = validate_scene(&scene, &db()).unwrap_err();
    assert!(matches!(err, WeftError::InvalidMaterial(_)));
    assert!(err.to_string().contains("cotton_twill"), "{err}");
}

#[test]
fn handle_out_of_range_rejected() {
    let mut scene = valid_scene();
    scene.handles.push(20);
    assert!(validate_scene(&scene, &db()).is_err());
}

#[test]
fn bad_ranges_rejected() {
    let mut scene = valid_scene();
    scene.dt = 0.0;
    assert!(validate_scene(&scene, &db()).is_err());

    let mut scene = valid_scene();
    scene.dt = 2.0;
    assert!(validate_scene(&scene, &db()).is_err());

    let mut scene = valid_scene();
    scene.steps = 0;
    assert!(validate_scene(&scene, &db()).is_err());

    let mut scene = valid_scene();
    scene.grid.cols = 0;
    assert!(validate_scene(&scene, &db()).is_err());

    let mut scene = valid_scene();
    scene.grid.height = -1.0;
    assert!(validate_scene(&scene, &db()).is_err());

    let mut scene = valid_scene();
    scene.wind.drag = -0.1;
    assert!(validate_scene(&scene, &db()).is_err());

    let mut scene = valid_scene();
    scene.solver.handle_stiffness = f64::NAN;
    assert!(validate_scene(&scene, &db()).is_err());
}

#[test]
fn invalid_inline_material_rejected() {
    let mut scene = SceneConfig::from_toml_str(INLINE).unwrap();
    if let MaterialSpec::Inline(ref mut props) = scene.material {
        props.density = 0.0;
    }
    assert!(matches!(
        validate_scene(&scene, &db()),
        Err(WeftError::InvalidMaterial(_))
    ));
}

// ─── Frame Tests ──────────────────────────────────────────────

#[test]
fn frames_record_positions() {
    let scene = SceneConfig::from_toml_str(INLINE).unwrap();
    let mut cloth = scene.build(&db()).unwrap();
    let mut output = FrameOutput::new(cloth.mesh());
    assert_eq!(output.indices.len(), 3 * 8);

    for _ in 0..2 {
        let result = cloth.update(scene.dt, scene.solver.gravity(), &scene.wind).unwrap();
        let time = (result.step + 1) as f64 * scene.dt;
        output.push(Frame::capture(result.step, time, cloth.mesh()));
    }

    assert_eq!(output.frames.len(), 2);
    assert_eq!(output.frames[1].step, 1);
    assert_eq!(output.frames[0].positions.len(), 9);
    // Unpinned horizontal cloth falls
    assert!(output.frames[1].positions[4][1] < output.frames[0].positions[4][1]);

    let json = output.to_json_string().unwrap();
    let back: FrameOutput = serde_json::from_str(&json).unwrap();
    assert_eq!(back, output);
}

#[test]
fn frames_load_back_from_disk() {
    let scene = SceneConfig::from_toml_str(INLINE).unwrap();
    let mut cloth = scene.build(&db()).unwrap();
    let mut output = FrameOutput::new(cloth.mesh());
    let result = cloth.update(scene.dt, scene.solver.gravity(), &scene.wind).unwrap();
    output.push(Frame::capture(result.step, scene.dt, cloth.mesh()));

    let path = std::env::temp_dir().join(format!("weft-frames-{}.json", std::process::id()));
    output.write(&path).unwrap();
    let back = FrameOutput::load(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(back.indices, output.indices);
    assert_eq!(back.frames.len(), 1);
    let (a, b) = (&back.frames[0], &output.frames[0]);
    for (p, q) in a.positions.iter().zip(&b.positions).chain(a.velocities.iter().zip(&b.velocities)) {
        assert!((DVec3::from(*p) - DVec3::from(*q)).length() < 1e-12);
    }
}

#[test]
fn restored_frame_continues_the_run() {
    let scene = SceneConfig::from_toml_str(INLINE).unwrap();
    let gravity = scene.solver.gravity();
    let mut original = scene.build(&db()).unwrap();
    let mut frames = Vec::new();
    for _ in 0..3 {
        let result = original.update(scene.dt, gravity, &scene.wind).unwrap();
        frames.push(Frame::capture(result.step, 0.0, original.mesh()));
    }

    let mut resumed = scene.build(&db()).unwrap();
    frames[1].restore(&mut resumed).unwrap();
    assert_eq!(resumed.step_count(), 2);
    let result = resumed.update(scene.dt, gravity, &scene.wind).unwrap();
    assert_eq!(result.step, 2);

    let replay = Frame::capture(result.step, 0.0, resumed.mesh());
    for (p, q) in replay.positions.iter().zip(&frames[2].positions) {
        assert!((DVec3::from(*p) - DVec3::from(*q)).length() < 1e-12);
    }
    for (v, w) in replay.velocities.iter().zip(&frames[2].velocities) {
        assert!((DVec3::from(*v) - DVec3::from(*w)).length() < 1e-12);
    }
}

#[test]
fn frame_without_velocities_restores_at_rest() {
    let scene = SceneConfig::from_toml_str(INLINE).unwrap();
    let mut cloth = scene.build(&db()).unwrap();
    cloth.set_velocity(4, DVec3::new(0.0, -1.0, 0.0)).unwrap();

    let positions: Vec<[f64; 3]> = (0..9).map(|i| [i as f64, 0.5, 0.0]).collect();
    let json = serde_json::json!({ "step": 7, "time": 0.08, "positions": positions }).to_string();
    let frame: Frame = serde_json::from_str(&json).unwrap();
    assert!(frame.velocities.is_empty());

    frame.restore(&mut cloth).unwrap();
    assert_eq!(cloth.step_count(), 8);
    assert_eq!(cloth.mesh().max_speed(), 0.0);
    assert_eq!(cloth.mesh().position(weft_types::PointId(3)), DVec3::new(3.0, 0.5, 0.0));
}

#[test]
fn mismatched_frame_is_rejected_without_change() {
    let scene = SceneConfig::from_toml_str(INLINE).unwrap();
    let mut cloth = scene.build(&db()).unwrap();
    let before = cloth.mesh().positions_flat();

    let short = Frame {
        step: 0,
        time: 0.0,
        positions: vec![[0.0; 3]; 4],
        velocities: Vec::new(),
    };
    assert!(matches!(short.restore(&mut cloth), Err(WeftError::InvalidConfig(_))));

    let mut bad = Frame::capture(0, 0.0, cloth.mesh());
    bad.velocities[2][0] = f64::NAN;
    assert!(matches!(bad.restore(&mut cloth), Err(WeftError::InvalidConfig(_))));

    assert_eq!(cloth.mesh().positions_flat(), before);
    assert_eq!(cloth.step_count(), 0);
}

// ─── Runner Tests ─────────────────────────────────────────────

/// Accepts steps no larger than `limit` and records every attempted size.
struct LimitedStepper {
    limit: f64,
    steps: u64,
    attempts: Vec<f64>,
}

impl LimitedStepper {
    fn new(limit: f64) -> Self {
        Self {
            limit,
            steps: 0,
            attempts: Vec::new(),
        }
    }
}

impl Stepper for LimitedStepper {
    fn step_count(&self) -> u64 {
        self.steps
    }

    fn try_step(&mut self, dt: f64) -> WeftResult<StepResult> {
        self.attempts.push(dt);
        if dt > self.limit {
            return Err(WeftError::NotPositiveDefinite {
                step: self.steps,
                dt,
                detail: "step too large".into(),
            });
        }
        let step = self.steps;
        self.steps += 1;
        Ok(StepResult {
            step,
            dt,
            dimension: 3,
            nnz: 3,
            assembly_time: 0.0,
            solve_time: 0.0,
            wall_time: 0.0,
            max_velocity_delta: 0.0,
        })
    }
}

fn recording_bus() -> (EventBus, VecSink) {
    let sink = VecSink::new();
    let mut bus = EventBus::new();
    bus.add_sink(Box::new(sink.clone()));
    (bus, sink)
}

fn failures(events: &[SimulationEvent]) -> Vec<u64> {
    events.iter().filter(|e| e.is_failure()).map(|e| e.step).collect()
}

#[test]
fn accepted_step_is_not_split() {
    let (mut bus, sink) = recording_bus();
    let mut stepper = LimitedStepper::new(1.0);
    assert_eq!(advance(&mut stepper, &bus, 0.01, 3).unwrap(), 1);
    bus.flush();

    let events = sink.events();
    assert_eq!(events.len(), 4);
    assert!(matches!(events[0].kind, EventKind::StepBegin { dt } if dt == 0.01));
    assert!(matches!(events[3].kind, EventKind::StepEnd { .. }));
    assert!(failures(&events).is_empty());
}

#[test]
fn failed_step_is_retried_as_two_half_steps() {
    let (mut bus, sink) = recording_bus();
    let mut stepper = LimitedStepper::new(0.006);
    assert_eq!(advance(&mut stepper, &bus, 0.01, 3).unwrap(), 2);
    assert_eq!(stepper.attempts, vec![0.01, 0.005, 0.005]);
    assert_eq!(stepper.steps, 2);

    bus.flush();
    let events = sink.events();
    assert_eq!(failures(&events), vec![0]);
    let ends: Vec<u64> = events
        .iter()
        .filter(|e| matches!(e.kind, EventKind::StepEnd { .. }))
        .map(|e| e.step)
        .collect();
    assert_eq!(ends, vec![0, 1]);
}

#[test]
fn retries_recurse_to_the_allowed_depth() {
    let (mut bus, sink) = recording_bus();
    let mut stepper = LimitedStepper::new(0.003);
    // 0.01 → 0.005 → 0.0025 needs two levels
    assert_eq!(advance(&mut stepper, &bus, 0.01, 2).unwrap(), 4);
    assert_eq!(stepper.attempts, vec![0.01, 0.005, 0.0025, 0.0025, 0.005, 0.0025, 0.0025]);

    bus.flush();
    assert_eq!(failures(&sink.events()), vec![0, 0, 2]);
}

#[test]
fn exhausted_retries_return_the_last_failure() {
    let (mut bus, sink) = recording_bus();
    let mut stepper = LimitedStepper::new(0.003);
    let err = advance(&mut stepper, &bus, 0.01, 1).unwrap_err();
    assert!(matches!(err, WeftError::NotPositiveDefinite { .. }), "{err}");
    assert_eq!(err.failed_dt(), Some(0.005));
    // The second half step is never attempted
    assert_eq!(stepper.attempts, vec![0.01, 0.005]);
    assert_eq!(stepper.steps, 0);

    bus.flush();
    assert_eq!(failures(&sink.events()).len(), 2);
}

#[test]
fn zero_retries_fails_immediately() {
    let (bus, _) = recording_bus();
    let mut stepper = LimitedStepper::new(0.001);
    let err = advance(&mut stepper, &bus, 0.01, 0).unwrap_err();
    assert_eq!(err.failed_dt(), Some(0.01));
    assert_eq!(stepper.attempts.len(), 1);
}

#[test]
fn configuration_errors_are_not_retried() {
    let scene = SceneConfig::from_toml_str(INLINE).unwrap();
    let mut cloth = scene.build(&db()).unwrap();
    let (mut bus, sink) = recording_bus();
    let mut stepper = ClothStepper {
        cloth: &mut cloth,
        gravity: scene.solver.gravity(),
        wind: &scene.wind,
    };
    let err = advance(&mut stepper, &bus, -0.01, 3).unwrap_err();
    assert!(matches!(err, WeftError::InvalidConfig(_)));

    bus.flush();
    let events = sink.events();
    assert_eq!(events.len(), 2);
    assert!(events[1].is_failure());
}

#[test]
fn unrecoverable_cloth_exhausts_retries_untouched() {
    let scene = SceneConfig::from_toml_str(INLINE).unwrap();
    let mut cloth = scene.build(&db()).unwrap();
    cloth.set_velocity(4, DVec3::new(f64::NAN, 0.0, 0.0)).unwrap();
    let before = cloth.mesh().positions_flat();

    let (mut bus, sink) = recording_bus();
    let mut stepper = ClothStepper {
        cloth: &mut cloth,
        gravity: scene.solver.gravity(),
        wind: &scene.wind,
    };
    let err = advance(&mut stepper, &bus, 0.01, 2).unwrap_err();
    assert!(matches!(err, WeftError::NonFinite { step: 0, .. }), "{err}");
    assert_eq!(err.failed_dt(), Some(0.0025));

    bus.flush();
    let events = sink.events();
    assert_eq!(failures(&events), vec![0, 0, 0]);
    let sizes: Vec<f64> = events
        .iter()
        .filter_map(|e| match e.kind {
            EventKind::StepBegin { dt } => Some(dt),
            _ => None,
        })
        .collect();
    assert_eq!(sizes, vec![0.01, 0.005, 0.0025]);
    assert_eq!(cloth.step_count(), 0);
    assert_eq!(cloth.mesh().positions_flat(), before);
}

#[test]
fn cloth_stepper_advances_the_cloth() {
    let scene = SceneConfig::from_toml_str(SCENE).unwrap();
    let mut cloth = scene.build(&db()).unwrap();
    let bus = EventBus::new();
    let mut stepper = ClothStepper {
        cloth: &mut cloth,
        gravity: scene.solver.gravity(),
        wind: &scene.wind,
    };
    for _ in 0..3 {
        advance(&mut stepper, &bus, scene.dt, 3).unwrap();
    }
    assert_eq!(stepper.step_count(), 3);
}
