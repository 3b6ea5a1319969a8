//! Simple path tracer example.
//!
//! Builds a small scene by hand, renders it in memory without checkpoints,
//! and saves it to PPM format.

use marble_renderer::{
    render, CameraSettings, Color, Dielectric, Lambertian, Metal, RenderConfig, Sphere, Vec3,
    World,
};
use std::fs::File;
use std::io::BufWriter;
use std::sync::Arc;

fn main() {
    println!("Marble Path Tracer - Simple Example");
    println!("===================================");

    let world = build_scene();
    println!("Scene has {} objects", world.len());

    let camera = CameraSettings::new()
        .with_resolution(400, 250)
        .with_position(
            Vec3::new(-2.0, 2.0, 1.0), // look_from
            Vec3::new(0.0, 0.0, -1.0), // look_at
            Vec3::new(0.0, 1.0, 0.0),  // up
        )
        .with_lens(40.0, 0.2, 3.4)
        .build()
        .expect("valid camera settings");

    let config = RenderConfig {
        samples_per_pixel: 32,
        max_depth: 10,
        seed: 7,
        rows_per_flush: 25,
    };

    println!(
        "Rendering {}x{} @ {} spp...",
        camera.image_width, camera.image_height, config.samples_per_pixel
    );

    let start = std::time::Instant::now();
    let image = render(&camera, &world, &config).expect("render failed");
    println!("Rendered in {:?}", start.elapsed());

    let filename = "output.ppm";
    let file = File::create(filename).expect("Failed to create image file");
    image
        .write_ppm(BufWriter::new(file))
        .expect("Failed to save image");
    println!("Saved to {}", filename);
}

fn build_scene() -> World {
    let mut world = World::new();

    // Ground
    world.add(Box::new(Sphere::new(
        Vec3::new(0.0, -100.5, -1.0),
        100.0,
        Arc::new(Lambertian::new(Color::new(0.8, 0.8, 0.0))),
    )));

    world.add(Box::new(Sphere::new(
        Vec3::new(0.0, 0.0, -1.0),
        0.5,
        Arc::new(Lambertian::new(Color::new(0.1, 0.2, 0.5))),
    )));

    // Glass bubble: two concentric spheres sharing one material
    let glass = Arc::new(Dielectric::new(1.5));
    world.add(Box::new(Sphere::new(Vec3::new(-1.0, 0.0, -1.0), 0.5, glass.clone())));
    world.add(Box::new(Sphere::new(Vec3::new(-1.0, 0.0, -1.0), 0.45, glass)));

    world.add(Box::new(Sphere::new(
        Vec3::new(1.0, 0.0, -1.0),
        0.5,
        Arc::new(Metal::new(Color::new(0.8, 0.6, 0.2), 0.3)),
    )));

    world
}
