//! Random sampling helpers.
//!
//! Every function draws from the generator it is handed; nothing here
//! touches a global or thread-local RNG, so a seeded generator gives a
//! reproducible sequence of samples.

use marble_math::Vec3;
use rand::{Rng, RngCore};

/// Uniform `f64` in `[0, 1)`.
#[inline]
pub fn gen_f64(rng: &mut dyn RngCore) -> f64 {
    rng.gen::<f64>()
}

/// Uniform `f64` in `[min, max)`.
#[inline]
pub fn gen_range(rng: &mut dyn RngCore, min: f64, max: f64) -> f64 {
    min + (max - min) * gen_f64(rng)
}

/// Uniform point strictly inside the unit ball.
///
/// Rejection sampling: draw from the cube `[-1, 1]^3` until the squared
/// norm is below one.
pub fn random_in_unit_sphere(rng: &mut dyn RngCore) -> Vec3 {
    loop {
        let p = Vec3::new(
            gen_range(rng, -1.0, 1.0),
            gen_range(rng, -1.0, 1.0),
            gen_range(rng, -1.0, 1.0),
        );
        if p.length_squared() < 1.0 {
            return p;
        }
    }
}

/// Uniformly distributed unit vector, from a normalized unit-ball sample.
pub fn random_unit_vector(rng: &mut dyn RngCore) -> Vec3 {
    loop {
        let p = random_in_unit_sphere(rng);
        let len_sq = p.length_squared();
        // Too short to normalize without blowing up
        if len_sq > 1e-12 {
            return p / len_sq.sqrt();
        }
    }
}

/// Flip `v` into the hemisphere around `normal` when it points against it.
#[inline]
pub fn flip_into_hemisphere(v: Vec3, normal: Vec3) -> Vec3 {
    if v.dot(normal) > 0.0 {
        v
    } else {
        -v
    }
}

/// Unit vector in the hemisphere around `normal`.
pub fn random_unit_in_hemisphere(normal: Vec3, rng: &mut dyn RngCore) -> Vec3 {
    flip_into_hemisphere(random_unit_vector(rng), normal)
}

/// Uniform point inside the unit disk in the xy plane.
pub fn random_in_unit_disk(rng: &mut dyn RngCore) -> Vec3 {
    loop {
        let p = Vec3::new(gen_range(rng, -1.0, 1.0), gen_range(rng, -1.0, 1.0), 0.0);
        if p.length_squared() < 1.0 {
            return p;
        }
    }
}
