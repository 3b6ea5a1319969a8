//! Core path tracing renderer.
//!
//! Implements Monte Carlo path tracing with:
//! - Recursive ray tracing bounded by a maximum depth
//! - A vertical sky gradient for rays that escape the scene
//! - Stratified supersampling with deterministic, evenly spread sub-pixel
//!   positions
//! - Square-root gamma and clamping before storage

use crate::{
    generate_batches, render_batch, Camera, ConfigError, Hittable, PixelBuffer, RenderError,
};
use marble_math::{Color, ColorExt, DegenerateVectorError, Interval, Ray, VectorExt};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};

/// Smallest hit parameter accepted after a bounce, to avoid shadow acne.
pub const HIT_EPSILON: f64 = 1e-3;

/// Largest accepted `max_depth`. Each bounce is one level of recursion.
pub const MAX_DEPTH_LIMIT: u32 = 1000;

const HORIZON: Color = Color::new(1.0, 1.0, 1.0);
const ZENITH: Color = Color::new(0.5, 0.7, 1.0);

/// Render configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Samples per pixel for anti-aliasing
    pub samples_per_pixel: u32,
    /// Maximum ray bounce depth
    pub max_depth: u32,
    /// Seed for every random draw made while tracing
    pub seed: u64,
    /// Rows rendered between two checkpoint flushes
    pub rows_per_flush: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            samples_per_pixel: 8,
            max_depth: 50,
            seed: 0,
            rows_per_flush: 1,
        }
    }
}

impl RenderConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.samples_per_pixel == 0 {
            return Err(ConfigError::Samples);
        }
        if self.max_depth == 0 || self.max_depth > MAX_DEPTH_LIMIT {
            return Err(ConfigError::MaxDepth {
                depth: self.max_depth,
                limit: MAX_DEPTH_LIMIT,
            });
        }
        if self.rows_per_flush == 0 {
            return Err(ConfigError::RowsPerFlush);
        }
        Ok(())
    }
}

/// Estimate the radiance arriving along `ray`.
///
/// Follows the path until it escapes to the sky, is absorbed, or `depth`
/// bounces have been spent; a path cut off by the depth limit contributes
/// black.
pub fn estimate_radiance(
    ray: &Ray,
    world: &dyn Hittable,
    depth: u32,
    rng: &mut dyn RngCore,
) -> Result<Color, DegenerateVectorError> {
    if depth == 0 {
        return Ok(Color::ZERO);
    }

    let Some(hit) = world.hit(ray, Interval::new(HIT_EPSILON, f64::INFINITY)) else {
        return sky_gradient(ray);
    };

    let scattering = hit.material.scatter(ray, &hit, rng)?;
    match scattering.continuation() {
        Some(outgoing) => {
            let incoming = estimate_radiance(&outgoing, world, depth - 1, rng)?;
            Ok(scattering.color.attenuate(incoming))
        }
        None => Ok(Color::ZERO),
    }
}

/// Background seen by a ray that escapes: white at the nadir blending to
/// blue at the zenith.
pub fn sky_gradient(ray: &Ray) -> Result<Color, DegenerateVectorError> {
    let direction = ray.direction.unit()?;
    let weight_for_zenith = (direction.y + 1.0) / 2.0;
    Ok(ZENITH.lerp_weighted(HORIZON, weight_for_zenith))
}

/// Rows of the sample grid: the smallest `n` with `n * n >= samples`.
pub fn strata_rows(samples_per_pixel: u32) -> u32 {
    let mut n = 1;
    while n * n < samples_per_pixel {
        n += 1;
    }
    n
}

/// Sub-pixel offsets of every sample, in sample order.
///
/// The samples are dealt over [`strata_rows`] rows as evenly as possible,
/// the first rows taking one extra when they do not divide. Each row is as
/// tall as its share of the samples and is split into equal cells, so every
/// cell covers `1 / samples` of the pixel and the offsets average to the
/// pixel center. A square sample count gives the plain `n x n` grid of cell
/// centers, filled row by row.
pub fn stratified_offsets(samples_per_pixel: u32) -> impl Iterator<Item = (f64, f64)> {
    let rows = strata_rows(samples_per_pixel);
    let per_row = samples_per_pixel / rows;
    let extra = samples_per_pixel % rows;
    let total = samples_per_pixel as f64;

    (0..rows)
        .scan(0u32, move |before, row| {
            let in_row = per_row + u32::from(row < extra);
            let y = (*before as f64 + in_row as f64 * 0.5) / total;
            *before += in_row;
            Some((0..in_row).map(move |column| ((column as f64 + 0.5) / in_row as f64, y)))
        })
        .flatten()
}

/// Private random stream of pixel `(x, y)`.
///
/// Depends only on the seed and the pixel, so pixels can be computed in any
/// order, on any thread, or in a later resumed run, with identical results.
pub(crate) fn pixel_rng(seed: u64, x: u32, y: u32, width: u32) -> StdRng {
    let index = y as u64 * width as u64 + x as u64;
    StdRng::seed_from_u64(splitmix64(seed ^ splitmix64(index)))
}

pub(crate) fn splitmix64(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Render pixel `(x, y)`, `y = 0` being the bottom row.
///
/// Returns the tone-mapped display color: each channel is
/// `clamp(sqrt(sum / samples), 0, 0.999)`.
pub fn render_pixel(
    camera: &Camera,
    world: &dyn Hittable,
    x: u32,
    y: u32,
    config: &RenderConfig,
) -> Result<Color, RenderError> {
    let mut rng = pixel_rng(config.seed, x, y, camera.image_width);
    let width = camera.image_width as f64;
    let height = camera.image_height as f64;

    let mut sum = Color::ZERO;
    for (dx, dy) in stratified_offsets(config.samples_per_pixel) {
        let s = (x as f64 + dx) / width;
        let t = (y as f64 + dy) / height;
        let ray = camera.get_ray(s, t, &mut rng);
        sum += estimate_radiance(&ray, world, config.max_depth, &mut rng)
            .map_err(|source| RenderError::Degenerate { x, y, source })?;
    }

    Ok((sum / config.samples_per_pixel as f64).to_display())
}

/// Render the whole image in memory, without checkpoints.
pub fn render(
    camera: &Camera,
    world: &dyn Hittable,
    config: &RenderConfig,
) -> Result<PixelBuffer, RenderError> {
    config.validate()?;
    let mut image = PixelBuffer::new(camera.image_width, camera.image_height);

    for batch in generate_batches(camera.image_height, config.rows_per_flush) {
        render_batch(&batch, &mut image, camera, world, config)?;
    }

    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        CameraSettings, HitRecord, Lambertian, Material, MaterialRecord, Metal, Sphere, Vec3,
        World,
    };
    use rand::rngs::StdRng;
    use std::sync::Arc;

    /// Scatters every hit into a ray with no direction.
    struct Collapse;

    impl Material for Collapse {
        fn scatter(
            &self,
            _ray: &Ray,
            hit: &HitRecord,
            _rng: &mut dyn RngCore,
        ) -> Result<MaterialRecord, DegenerateVectorError> {
            Ok(MaterialRecord::scattered(
                Color::ONE,
                Ray::new(hit.point(), Vec3::ZERO),
            ))
        }
    }

    fn small_camera() -> Camera {
        CameraSettings::new()
            .with_resolution(8, 6)
            .with_position(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), Vec3::Y)
            .with_lens(90.0, 0.0, 1.0)
            .build()
            .unwrap()
    }

    #[test]
    fn test_sky_gradient_endpoints() {
        let up = sky_gradient(&Ray::new(Vec3::ZERO, Vec3::Y * 3.0)).unwrap();
        let down = sky_gradient(&Ray::new(Vec3::ZERO, -Vec3::Y)).unwrap();
        let level = sky_gradient(&Ray::new(Vec3::ZERO, Vec3::X)).unwrap();

        assert!((up - ZENITH).length() < 1e-12);
        assert!((down - HORIZON).length() < 1e-12);
        assert!((level - Color::new(0.75, 0.85, 1.0)).length() < 1e-12);
    }

    #[test]
    fn test_sky_gradient_is_monotonic() {
        let mut previous = sky_gradient(&Ray::new(Vec3::ZERO, -Vec3::Y)).unwrap();
        for i in 1..=200 {
            let angle = -std::f64::consts::FRAC_PI_2 + i as f64 * std::f64::consts::PI / 200.0;
            let dir = Vec3::new(angle.cos(), angle.sin(), 0.0);
            let color = sky_gradient(&Ray::new(Vec3::ZERO, dir)).unwrap();

            // Red and green fall, blue stays put, in small steps
            assert!(color.x <= previous.x + 1e-12);
            assert!(color.y <= previous.y + 1e-12);
            assert!((color.z - 1.0).abs() < 1e-12);
            assert!((color - previous).length() < 0.01);
            previous = color;
        }
    }

    #[test]
    fn test_sky_gradient_rejects_zero_direction() {
        assert!(sky_gradient(&Ray::new(Vec3::ZERO, Vec3::ZERO)).is_err());
    }

    #[test]
    fn test_zero_depth_is_black() {
        let world = World::new();
        let mut rng = StdRng::seed_from_u64(1);
        let ray = Ray::new(Vec3::ZERO, Vec3::Y);
        assert_eq!(estimate_radiance(&ray, &world, 0, &mut rng).unwrap(), Color::ZERO);
        assert_eq!(estimate_radiance(&ray, &world, 1, &mut rng).unwrap(), ZENITH);
    }

    #[test]
    fn test_depth_one_hit_is_black() {
        let mut world = World::new();
        world.add(Box::new(Sphere::new(
            Vec3::new(0.0, 0.0, -1.0),
            0.5,
            Arc::new(Lambertian::new(Color::splat(0.5))),
        )));
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let mut rng = StdRng::seed_from_u64(2);

        // The bounce would need a second level of recursion
        assert_eq!(estimate_radiance(&ray, &world, 1, &mut rng).unwrap(), Color::ZERO);
        let two = estimate_radiance(&ray, &world, 2, &mut rng).unwrap();
        assert!(two.max_element() > 0.0);
        assert!(two.max_element() <= 0.5);
    }

    #[test]
    fn test_mirror_attenuates_sky() {
        let mut world = World::new();
        world.add(Box::new(Sphere::new(
            Vec3::new(0.0, 0.0, -2.0),
            1.0,
            Arc::new(Metal::new(Color::new(0.5, 1.0, 1.0), 0.0)),
        )));

        // Head-on hit reflects straight back along +z, which sees the level sky
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let mut rng = StdRng::seed_from_u64(3);
        let color = estimate_radiance(&ray, &world, 5, &mut rng).unwrap();
        assert!((color - Color::new(0.375, 0.85, 1.0)).length() < 1e-12);
    }

    #[test]
    fn test_strata() {
        assert_eq!(strata_rows(1), 1);
        assert_eq!(strata_rows(4), 2);
        assert_eq!(strata_rows(5), 3);
        assert_eq!(strata_rows(9), 3);
        assert_eq!(strata_rows(10), 4);

        let one: Vec<_> = stratified_offsets(1).collect();
        assert_eq!(one, vec![(0.5, 0.5)]);

        let four: Vec<_> = stratified_offsets(4).collect();
        assert_eq!(
            four,
            vec![(0.25, 0.25), (0.75, 0.25), (0.25, 0.75), (0.75, 0.75)]
        );
    }

    #[test]
    fn test_uneven_sample_counts_fill_the_pixel() {
        // 8 samples: rows of 3, 3 and 2, each row as tall as its share
        let eight: Vec<_> = stratified_offsets(8).collect();
        assert_eq!(eight.len(), 8);
        assert_eq!(eight[0], (0.5 / 3.0, 1.5 / 8.0));
        assert_eq!(eight[3], (0.5 / 3.0, 4.5 / 8.0));
        assert_eq!(eight[6], (0.25, 7.0 / 8.0));
        assert_eq!(eight[7], (0.75, 7.0 / 8.0));

        for samples in 1..=64 {
            let offsets: Vec<_> = stratified_offsets(samples).collect();
            assert_eq!(offsets.len(), samples as usize);

            let n = samples as f64;
            let mean_x = offsets.iter().map(|o| o.0).sum::<f64>() / n;
            let mean_y = offsets.iter().map(|o| o.1).sum::<f64>() / n;
            assert!((mean_x - 0.5).abs() < 1e-12, "{samples} spp: mean x {mean_x}");
            assert!((mean_y - 0.5).abs() < 1e-12, "{samples} spp: mean y {mean_y}");

            for (i, a) in offsets.iter().enumerate() {
                assert!(a.0 > 0.0 && a.0 < 1.0 && a.1 > 0.0 && a.1 < 1.0);
                assert!(offsets[i + 1..].iter().all(|b| b != a));
            }
        }
    }

    #[test]
    fn test_render_pixel_is_deterministic() {
        let mut world = World::new();
        world.add(Box::new(Sphere::new(
            Vec3::new(0.0, 0.0, -1.0),
            0.5,
            Arc::new(Lambertian::new(Color::new(0.5, 0.5, 0.5))),
        )));
        let camera = small_camera();
        let config = RenderConfig {
            samples_per_pixel: 4,
            max_depth: 5,
            seed: 99,
            rows_per_flush: 1,
        };

        let a = render_pixel(&camera, &world, 4, 3, &config).unwrap();
        let b = render_pixel(&camera, &world, 4, 3, &config).unwrap();
        assert_eq!(a, b);

        // Center pixel hits the sphere, so it is darker than the sky
        assert!(a.length() > 0.0);
        assert!(a.max_element() <= 0.999);
    }

    #[test]
    fn test_degenerate_bounce_reports_pixel() {
        let mut world = World::new();
        world.add(Box::new(Sphere::new(
            Vec3::new(0.0, 0.0, -1.0),
            0.5,
            Arc::new(Collapse),
        )));
        let camera = small_camera();
        let config = RenderConfig {
            samples_per_pixel: 1,
            max_depth: 4,
            ..RenderConfig::default()
        };

        let err = render_pixel(&camera, &world, 4, 3, &config).unwrap_err();
        assert!(matches!(err, RenderError::Degenerate { x: 4, y: 3, .. }));
        assert!(!err.is_recoverable_checkpoint());

        // Corner pixels see only sky and still render
        assert!(render_pixel(&camera, &world, 0, 0, &config).is_ok());
        assert!(matches!(
            render(&camera, &world, &config),
            Err(RenderError::Degenerate { .. })
        ));
    }

    #[test]
    fn test_empty_world_renders_sky() {
        let world = World::new();
        let camera = small_camera();
        let config = RenderConfig {
            samples_per_pixel: 1,
            max_depth: 1,
            ..RenderConfig::default()
        };

        let image = render(&camera, &world, &config).unwrap();
        assert!(image.is_complete());

        // Top rows are bluer than bottom rows
        let top = image.get(0, 5).unwrap();
        let bottom = image.get(0, 0).unwrap();
        assert!(top.x < bottom.x);
        assert_eq!(top.z, 0.999);
    }

    #[test]
    fn test_invalid_config() {
        let base = RenderConfig::default();
        assert!(base.validate().is_ok());
        assert_eq!(
            RenderConfig { samples_per_pixel: 0, ..base.clone() }.validate(),
            Err(ConfigError::Samples)
        );
        assert_eq!(
            RenderConfig { max_depth: 0, ..base.clone() }.validate(),
            Err(ConfigError::MaxDepth { depth: 0, limit: MAX_DEPTH_LIMIT })
        );
        assert!(RenderConfig { max_depth: MAX_DEPTH_LIMIT, ..base.clone() }
            .validate()
            .is_ok());
        assert_eq!(
            RenderConfig { max_depth: MAX_DEPTH_LIMIT + 1, ..base.clone() }.validate(),
            Err(ConfigError::MaxDepth { depth: MAX_DEPTH_LIMIT + 1, limit: MAX_DEPTH_LIMIT })
        );
        assert_eq!(
            RenderConfig { rows_per_flush: 0, ..base }.validate(),
            Err(ConfigError::RowsPerFlush)
        );
    }

    #[test]
    fn test_pixel_streams_differ() {
        let mut a = pixel_rng(1, 0, 0, 10);
        let mut b = pixel_rng(1, 1, 0, 10);
        let mut c = pixel_rng(2, 0, 0, 10);
        let first = a.next_u64();
        assert_ne!(first, b.next_u64());
        assert_ne!(first, c.next_u64());
        assert_eq!(first, pixel_rng(1, 0, 0, 10).next_u64());
    }
}
