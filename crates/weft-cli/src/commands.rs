//! CLI command implementations.

use std::time::Instant;

use tracing::{info, Level};

use weft_io::contract::{Frame, FrameOutput, SceneConfig};
use weft_io::runner::{advance, ClothStepper};
use weft_io::validator::validate_scene;
use weft_material::MaterialDatabase;
use weft_mesh::{SimMesh, TriangleMesh};
use weft_telemetry::{EventBus, EventKind, SimulationEvent, TracingSink};

/// Run a simulation from a scene file.
pub fn simulate(
    config_path: &str,
    output_path: Option<&str>,
    resume_path: Option<&str>,
    max_retries: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let database = MaterialDatabase::with_defaults();
    let scene = SceneConfig::load(config_path)?;
    validate_scene(&scene, &database)?;
    let mut cloth = scene.build(&database)?;

    let mut time = 0.0;
    if let Some(path) = resume_path {
        let recorded = FrameOutput::load(path)?;
        let frame = recorded
            .last()
            .ok_or_else(|| format!("{path} holds no frames to resume from"))?;
        frame.restore(&mut cloth)?;
        time = frame.time;
        info!(path, step = frame.step, "resuming from recorded frame");
    }

    println!("weft simulation");
    println!("───────────────");
    println!("Scene:     {config_path}");
    println!("Material:  {}", cloth.material().name);
    println!(
        "Mesh:      {} points, {} faces, {} edges",
        cloth.mesh().point_count(),
        cloth.mesh().faces().len(),
        cloth.mesh().edges().len()
    );
    println!("Handles:   {}", cloth.handles().len());
    println!("Steps:     {} × {}s", scene.steps, scene.dt);
    println!();

    let mut bus = EventBus::new();
    bus.add_sink(Box::new(TracingSink::new(Level::DEBUG)));

    let mut frames = output_path.map(|_| FrameOutput::new(cloth.mesh()));
    let gravity = scene.solver.gravity();
    let start = Instant::now();

    for _ in 0..scene.steps {
        let mut stepper = ClothStepper {
            cloth: &mut cloth,
            gravity,
            wind: &scene.wind,
        };
        if let Err(e) = advance(&mut stepper, &bus, scene.dt, max_retries) {
            bus.finish();
            return Err(e.into());
        }
        time += scene.dt;

        // Numbered by the last accepted step, which retries may push ahead
        let step = cloth.step_count() - 1;
        bus.emit(SimulationEvent::new(
            step,
            EventKind::Energy {
                kinetic: cloth.kinetic_energy(),
                elastic: cloth.elastic_energy(),
            },
        ));
        bus.flush();

        if let Some(frames) = frames.as_mut() {
            frames.push(Frame::capture(step, time, cloth.mesh()));
        }
    }
    bus.finish();

    let wall = start.elapsed().as_secs_f64();
    println!("Wall time:    {wall:.3}s ({:.3}ms/frame)", wall * 1000.0 / f64::from(scene.steps));
    println!("Solves:       {}", cloth.step_count());
    println!("Kinetic:      {:.6e} J", cloth.kinetic_energy());
    println!("Elastic:      {:.6e} J", cloth.elastic_energy());
    println!("Max speed:    {:.4} m/s", cloth.mesh().max_speed());

    if let (Some(path), Some(frames)) = (output_path, frames) {
        frames.write(path)?;
        println!("Frames written to: {path}");
    }

    Ok(())
}

/// List the material presets.
pub fn materials() -> Result<(), Box<dyn std::error::Error>> {
    let database = MaterialDatabase::with_defaults();
    println!(
        "{:<16} {:>9} {:>8} {:>8} {:>8} {:>8} {:>9} {:>8}",
        "name", "kg/m²", "warp", "weft", "coupl.", "shear", "bending", "damping"
    );
    for m in database.iter() {
        let s = &m.stretching;
        println!(
            "{:<16} {:>9.3} {:>8.0} {:>8.0} {:>8.0} {:>8.0} {:>9.1e} {:>8.4}",
            m.name,
            m.density,
            s.warp(),
            s.weft(),
            s.coupling(),
            s.shear(),
            m.bending_stiffness,
            m.damping
        );
    }
    Ok(())
}

/// Validate a scene or a mesh.
pub fn validate(path: &str) -> Result<(), Box<dyn std::error::Error>> {
    if path.ends_with(".toml") {
        info!(path, "validating scene");
        let database = MaterialDatabase::with_defaults();
        let scene = SceneConfig::load(path)?;
        validate_scene(&scene, &database)?;
        let cloth = scene.build(&database)?;
        println!(
            "✅ Scene is valid ({} points, {} handles, {} steps of {}s).",
            cloth.mesh().point_count(),
            cloth.handles().len(),
            scene.steps,
            scene.dt
        );
    } else if path.ends_with(".json") {
        info!(path, "validating mesh");
        let content = std::fs::read_to_string(path)?;
        let mesh: TriangleMesh = serde_json::from_str(&content)?;
        mesh.validate()?;
        // Also checks manifoldness and isolated vertices
        let sim = SimMesh::from_triangle_mesh(&mesh, 1.0)?;
        println!(
            "✅ Mesh is valid ({} verts, {} tris, {} interior edges).",
            mesh.vertex_count(),
            mesh.triangle_count(),
            sim.edges().iter().filter(|e| e.is_interior()).count()
        );
    } else {
        return Err("unsupported file format, use .toml (scene) or .json (mesh)".into());
    }
    Ok(())
}
