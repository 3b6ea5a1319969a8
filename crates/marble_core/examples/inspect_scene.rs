//! Example: Generate or load a scene description and print a summary.
//!
//! Run with: cargo run --example inspect_scene -- [scene.json]

use std::collections::BTreeMap;
use std::env;

use marble_core::{random_scene, MaterialDescriptor, SceneDescription};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    let scene = match args.get(1) {
        Some(path) => {
            println!("Loading scene file: {}", path);
            let json = match std::fs::read_to_string(path) {
                Ok(json) => json,
                Err(e) => {
                    eprintln!("Failed to read {}: {}", path, e);
                    std::process::exit(1);
                }
            };
            match SceneDescription::from_json(&json) {
                Ok(scene) => scene,
                Err(e) => {
                    eprintln!("Failed to parse scene: {}", e);
                    std::process::exit(1);
                }
            }
        }
        None => {
            println!("No scene file given, generating the random scene with seed 0");
            random_scene(&mut StdRng::seed_from_u64(0))
        }
    };

    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for primitive in &scene.primitives {
        let kind = match primitive.material() {
            MaterialDescriptor::Lambertian { .. } => "lambertian",
            MaterialDescriptor::Metal { .. } => "metal",
            MaterialDescriptor::Dielectric { .. } => "dielectric",
        };
        *counts.entry(kind).or_default() += 1;
    }

    println!("\n=== Scene ===");
    println!("Primitives: {}", scene.len());
    for (kind, count) in counts {
        println!("  {:<11} {}", kind, count);
    }
}
