//! Built-in scenes.

use marble_math::{Color, Vec3, VectorExt};
use rand::{Rng, RngCore};

use crate::scene::{MaterialDescriptor, PrimitiveDescriptor, SceneDescription};

const GLASS: MaterialDescriptor = MaterialDescriptor::Dielectric {
    index_of_refraction: 1.5,
};

/// Ground plus one diffuse, one metal and one glass sphere in front of a
/// camera at the origin looking down `-z`.
pub fn demo_scene() -> SceneDescription {
    [
        // Ground
        PrimitiveDescriptor::sphere(
            Vec3::new(0.0, -100.5, -1.0),
            100.0,
            MaterialDescriptor::Lambertian {
                albedo: Color::new(0.8, 0.8, 0.0),
            },
        ),
        PrimitiveDescriptor::sphere(
            Vec3::new(0.0, 0.0, -1.0),
            0.5,
            MaterialDescriptor::Lambertian {
                albedo: Color::new(0.1, 0.2, 0.5),
            },
        ),
        PrimitiveDescriptor::sphere(
            Vec3::new(1.0, 0.0, -1.0),
            0.5,
            MaterialDescriptor::Metal {
                albedo: Color::new(0.8, 0.6, 0.2),
                fuzziness: 0.0,
            },
        ),
        PrimitiveDescriptor::sphere(Vec3::new(-1.0, 0.0, -1.0), 0.5, GLASS),
    ]
    .into_iter()
    .collect()
}

/// The large marble field: a grey ground sphere, a 22x22 grid of small
/// randomized marbles, and three big feature spheres.
///
/// Every draw comes from `rng`, so a seeded generator always yields the
/// same scene.
pub fn random_scene(rng: &mut dyn RngCore) -> SceneDescription {
    let mut scene = SceneDescription::new();

    // Ground
    scene.push(PrimitiveDescriptor::sphere(
        Vec3::new(0.0, -1000.0, 0.0),
        1000.0,
        MaterialDescriptor::Lambertian {
            albedo: Color::splat(0.5),
        },
    ));

    // Marbles
    let keep_clear = Vec3::new(4.0, 0.2, 0.0);
    for x in -11..11 {
        for z in -11..11 {
            let choose_material: f64 = rng.gen();
            let center = Vec3::new(
                x as f64 + 0.9 * rng.gen::<f64>(),
                0.2,
                z as f64 + 0.9 * rng.gen::<f64>(),
            );

            if (center - keep_clear).norm() <= 0.9 {
                continue;
            }

            let material = if choose_material < 0.8 {
                let albedo = random_color(rng) * random_color(rng);
                MaterialDescriptor::Lambertian { albedo }
            } else if choose_material < 0.95 {
                let albedo = random_color(rng) * 0.5 + Color::splat(0.5);
                let fuzziness = rng.gen::<f64>() * 0.4;
                MaterialDescriptor::Metal { albedo, fuzziness }
            } else {
                GLASS
            };

            scene.push(PrimitiveDescriptor::sphere(center, 0.2, material));
        }
    }

    // Big spheres
    scene.push(PrimitiveDescriptor::sphere(Vec3::new(0.0, 1.0, 0.0), 1.0, GLASS));
    scene.push(PrimitiveDescriptor::sphere(
        Vec3::new(-4.0, 1.0, 0.0),
        1.0,
        MaterialDescriptor::Lambertian {
            albedo: Color::new(0.6, 0.1, 0.1),
        },
    ));
    scene.push(PrimitiveDescriptor::sphere(
        Vec3::new(4.0, 1.0, 0.0),
        1.0,
        MaterialDescriptor::Metal {
            albedo: Color::new(0.7, 0.6, 0.5),
            fuzziness: 0.0,
        },
    ));

    log::debug!("generated random scene with {} primitives", scene.len());
    scene
}

fn random_color(rng: &mut dyn RngCore) -> Color {
    Color::new(rng.gen(), rng.gen(), rng.gen())
}
