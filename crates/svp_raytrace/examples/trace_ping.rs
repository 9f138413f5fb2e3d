//! Trace a multibeam ping through a sound velocity profile.
//!
//! Loads a profile from JSON, traces one ray in detail with its sampled
//! path, then traces a 21-beam fan and prints the soundings.
//!
//! Run with `RUST_LOG=debug` to see per-trace logging.

use anyhow::{Context, Result};
use svp_core::parse_profile_json;
use svp_raytrace::{trace_beams, Beam, PathMode, RayTracer, TraceConfig};

const PROFILE: &str = r#"{
    "name": "summer thermocline",
    "nodes": [
        { "depth": 0.0,    "velocity": 1522.0 },
        { "depth": 15.0,   "velocity": 1521.5 },
        { "depth": 40.0,   "velocity": 1505.0 },
        { "depth": 120.0,  "velocity": 1492.0 },
        { "depth": 600.0,  "velocity": 1486.0 },
        { "depth": 1500.0, "velocity": 1495.0 }
    ]
}"#;

fn main() -> Result<()> {
    env_logger::init();

    println!("svptrace - Ping Example");
    println!("=======================");

    let model = parse_profile_json(PROFILE).context("Failed to parse sound velocity profile")?;
    println!(
        "Loaded {} nodes, {} layers, {:.1}-{:.1} m",
        model.nodes().len(),
        model.layer_count(),
        model.depth_range().top,
        model.depth_range().bottom
    );

    // One ray with its path
    let config = TraceConfig::new().with_path(PathMode::Full, 200);
    let tracer = RayTracer::new(&model).with_config(config);
    let result = tracer.trace(5.0, 55.0, 0.6)?;

    println!();
    println!(
        "55 deg ray: x = {:.2} m, z = {:.2} m, t = {:.4} s, {:?} after {} segments",
        result.x, result.z, result.travel_time, result.status, result.segments
    );
    if let Some(path) = &result.path {
        for sample in path.samples().iter().step_by(5) {
            println!("  {:10.2} {:10.2} {:8.4}", sample.x, sample.z, sample.t);
        }
    }

    // A full fan, with the transducer's own sound speed correcting the angles
    let config = TraceConfig::new().with_surface_velocity(1520.0, 0.0);
    let tracer = RayTracer::new(&model).with_config(config);
    let beams: Vec<Beam> = (-10..=10)
        .map(|i| {
            let angle = 6.5 * i as f64;
            // Flat seafloor at 400 m seen by a straight-ray estimate
            let slant = (400.0 - 5.0) / angle.to_radians().cos();
            Beam::new(angle, 0.0, 2.0 * slant / 1500.0)
        })
        .collect();

    let start = std::time::Instant::now();
    let soundings = trace_beams(&tracer, 5.0, &beams);
    println!();
    println!("Traced {} beams in {:?}", beams.len(), start.elapsed());

    for (beam, sounding) in beams.iter().zip(&soundings) {
        match sounding {
            Ok(sounding) => println!(
                "{}",
                serde_json::json!({
                    "angle": beam.angle,
                    "acrosstrack": (sounding.acrosstrack * 100.0).round() / 100.0,
                    "depth": (sounding.depth * 100.0).round() / 100.0,
                    "status": format!("{:?}", sounding.status),
                })
            ),
            Err(e) => println!("beam {:.1}: {}", beam.angle, e),
        }
    }

    Ok(())
}
