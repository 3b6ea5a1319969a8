//! Material trait for surface scattering.

use std::sync::Arc;

use crate::hittable::HitRecord;
use crate::sampling;
use marble_core::MaterialDescriptor;
use marble_math::{Color, DegenerateVectorError, Ray, Vec3, VectorExt};
use rand::RngCore;

/// Outcome of a scatter query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialRecord {
    /// Attenuation applied to the radiance carried by the outgoing ray
    pub color: Color,
    /// Next bounce; `None` terminates the path
    pub outgoing_ray: Option<Ray>,
    /// Set when a direction was computed but the energy is lost anyway
    pub absorbed: bool,
}

impl MaterialRecord {
    /// A ray that keeps bouncing.
    pub fn scattered(color: Color, outgoing_ray: Ray) -> Self {
        Self {
            color,
            outgoing_ray: Some(outgoing_ray),
            absorbed: false,
        }
    }

    /// The ray to follow, unless the path stops at this surface.
    pub fn continuation(&self) -> Option<Ray> {
        if self.absorbed {
            None
        } else {
            self.outgoing_ray
        }
    }
}

/// Trait for materials that describe how light interacts with surfaces.
pub trait Material: Send + Sync {
    /// Scatter an incoming ray at `hit`.
    ///
    /// Errors only when a direction that must be normalized has collapsed to
    /// zero length.
    fn scatter(
        &self,
        ray_in: &Ray,
        hit: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Result<MaterialRecord, DegenerateVectorError>;
}

/// Instantiate the material a descriptor names.
pub fn material_from_descriptor(descriptor: &MaterialDescriptor) -> Arc<dyn Material> {
    match *descriptor {
        MaterialDescriptor::Lambertian { albedo } => Arc::new(Lambertian::new(albedo)),
        MaterialDescriptor::Metal { albedo, fuzziness } => Arc::new(Metal::new(albedo, fuzziness)),
        MaterialDescriptor::Dielectric {
            index_of_refraction,
        } => Arc::new(Dielectric::new(index_of_refraction)),
    }
}

/// Lambertian (diffuse) material.
#[derive(Debug, Clone)]
pub struct Lambertian {
    albedo: Color,
}

impl Lambertian {
    /// Create a new Lambertian material with the given albedo color.
    pub fn new(albedo: Color) -> Self {
        Self { albedo }
    }
}

impl Material for Lambertian {
    fn scatter(
        &self,
        _ray_in: &Ray,
        hit: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Result<MaterialRecord, DegenerateVectorError> {
        let normal = hit.normal().unit()?;
        let mut direction = normal + sampling::random_unit_in_hemisphere(normal, rng);

        // Catch degenerate scatter direction
        if direction.near_zero() {
            direction = normal;
        }

        Ok(MaterialRecord::scattered(
            self.albedo,
            Ray::new(hit.point(), direction),
        ))
    }
}

/// Metal (specular) material.
#[derive(Debug, Clone)]
pub struct Metal {
    albedo: Color,
    fuzziness: f64,
}

impl Metal {
    /// Create a new Metal material.
    ///
    /// - `albedo`: The color of the metal
    /// - `fuzziness`: Roughness, 0.0 = perfect mirror, 1.0 = very rough
    pub fn new(albedo: Color, fuzziness: f64) -> Self {
        Self {
            albedo,
            fuzziness: fuzziness.clamp(0.0, 1.0),
        }
    }

    pub fn fuzziness(&self) -> f64 {
        self.fuzziness
    }
}

impl Material for Metal {
    fn scatter(
        &self,
        ray_in: &Ray,
        hit: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Result<MaterialRecord, DegenerateVectorError> {
        let normal = hit.normal().unit()?;
        let reflected = reflect(ray_in.direction.unit()?, normal);

        let mut direction = reflected;
        if self.fuzziness > 0.0 {
            direction += self.fuzziness * sampling::random_in_unit_sphere(rng);
            if direction.near_zero() {
                direction = reflected;
            }
        }

        // Fuzz that pushes the ray below the surface loses its energy
        let absorbed = direction.dot(normal) < 0.0;

        Ok(MaterialRecord {
            color: self.albedo,
            outgoing_ray: Some(Ray::new(hit.point(), direction)),
            absorbed,
        })
    }
}

/// Dielectric (glass) material.
#[derive(Debug, Clone)]
pub struct Dielectric {
    index_of_refraction: f64,
}

impl Dielectric {
    /// Create a new Dielectric material.
    ///
    /// - `index_of_refraction`: 1.0 = air, 1.5 = glass, 2.4 = diamond
    pub fn new(index_of_refraction: f64) -> Self {
        Self {
            index_of_refraction,
        }
    }

    /// Schlick's approximation for reflectance
    fn reflectance(cosine: f64, index_ratio: f64) -> f64 {
        let r0 = ((1.0 - index_ratio) / (1.0 + index_ratio)).powi(2);
        r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
    }
}

impl Material for Dielectric {
    fn scatter(
        &self,
        ray_in: &Ray,
        hit: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Result<MaterialRecord, DegenerateVectorError> {
        let (incoming_index, outgoing_index) = if hit.resultant_outward {
            (1.0, self.index_of_refraction)
        } else {
            (self.index_of_refraction, 1.0)
        };
        let index_ratio = incoming_index / outgoing_index;

        let direction = ray_in.direction.unit()?;
        let normal = hit.normal();
        let cos_theta = (-direction).dot(normal).min(1.0);
        let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();

        // Total internal reflection leaves no choice
        let cannot_refract = sin_theta * index_ratio > 1.0;

        let outgoing = if cannot_refract
            || Self::reflectance(cos_theta, index_ratio) >= sampling::gen_f64(rng)
        {
            reflect(direction, normal)
        } else {
            refract(direction, normal, index_ratio)
        };

        Ok(MaterialRecord::scattered(
            Color::ONE,
            Ray::new(hit.point(), outgoing),
        ))
    }
}

// =============================================================================
// Helper functions
// =============================================================================

/// Mirror `v` about the plane with normal `n`.
#[inline]
pub fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Bend unit vector `uv` through a surface with normal `n` by Snell's law.
///
/// The result is the sum of a component perpendicular to the normal and
/// one parallel to it.
#[inline]
pub fn refract(uv: Vec3, n: Vec3, index_ratio: f64) -> Vec3 {
    let cos_theta = (-uv).dot(n).min(1.0);
    let r_out_perp = index_ratio * (uv + cos_theta * n);
    let r_out_parallel = -(1.0 - r_out_perp.length_squared()).max(0.0).sqrt() * n;
    r_out_perp + r_out_parallel
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn hit_at<'a>(ray: &Ray, t: f64, outward_normal: Vec3, material: &'a dyn Material) -> HitRecord<'a> {
        HitRecord::new(ray, t, outward_normal, material)
    }

    /// Every draw is just below 1.0.
    fn high_draws() -> StepRng {
        StepRng::new(u64::MAX, 0)
    }

    #[test]
    fn test_lambertian_scatters_into_hemisphere() {
        let material = Lambertian::new(Color::new(0.2, 0.4, 0.6));
        let ray = Ray::new(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, -1.0, 0.0));
        let hit = hit_at(&ray, 1.0, Vec3::Y, &material);
        let mut rng = StdRng::seed_from_u64(5);

        for _ in 0..200 {
            let rec = material.scatter(&ray, &hit, &mut rng).unwrap();
            assert_eq!(rec.color, Color::new(0.2, 0.4, 0.6));
            assert!(!rec.absorbed);
            let out = rec.continuation().unwrap();
            assert_eq!(out.base, Vec3::ZERO);
            assert!(out.direction.dot(Vec3::Y) > 0.0);
            assert!(!out.direction.near_zero());
        }
    }

    #[test]
    fn test_metal_without_fuzz_is_a_mirror() {
        let material = Metal::new(Color::ONE, 0.0);
        let incoming = Vec3::new(1.0, -2.0, 0.5);
        let ray = Ray::new(Vec3::new(-1.0, 2.0, -0.5), incoming);
        let hit = hit_at(&ray, 1.0, Vec3::Y, &material);
        let mut rng = StdRng::seed_from_u64(6);

        let rec = material.scatter(&ray, &hit, &mut rng).unwrap();
        let out = rec.continuation().unwrap().direction;
        let unit_in = incoming.normalize();

        // Angle of incidence equals angle of reflection
        let cos_in = -unit_in.dot(Vec3::Y);
        let cos_out = out.dot(Vec3::Y);
        assert!((cos_in - cos_out).abs() < 1e-12);
        // Tangential component is preserved
        assert!((out.x - unit_in.x).abs() < 1e-12);
        assert!((out.z - unit_in.z).abs() < 1e-12);
        assert!((out.length() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_metal_fuzz_is_clamped() {
        assert_eq!(Metal::new(Color::ONE, 3.0).fuzziness(), 1.0);
        assert_eq!(Metal::new(Color::ONE, -1.0).fuzziness(), 0.0);
    }

    #[test]
    fn test_metal_absorbs_rays_fuzzed_below_surface() {
        let material = Metal::new(Color::ONE, 1.0);
        // Grazing incidence: the mirror direction is almost tangent
        let ray = Ray::new(Vec3::new(-1.0, 0.01, 0.0), Vec3::new(1.0, -0.01, 0.0));
        let hit = hit_at(&ray, 1.0, Vec3::Y, &material);
        let mut rng = StdRng::seed_from_u64(7);

        let mut absorbed = 0;
        for _ in 0..200 {
            let rec = material.scatter(&ray, &hit, &mut rng).unwrap();
            let out = rec.outgoing_ray.unwrap().direction;
            assert_eq!(rec.absorbed, out.dot(Vec3::Y) < 0.0);
            if rec.absorbed {
                absorbed += 1;
                assert!(rec.continuation().is_none());
            }
        }
        assert!(absorbed > 0);
    }

    #[test]
    fn test_dielectric_with_unit_ratio_is_undeviated() {
        let material = Dielectric::new(1.0);
        let incoming = Vec3::new(0.3, -1.0, 0.2).normalize();
        let ray = Ray::new(Vec3::new(-0.3, 1.0, -0.2), incoming);
        let hit = hit_at(&ray, 1.0, Vec3::Y, &material);

        let rec = material.scatter(&ray, &hit, &mut high_draws()).unwrap();
        let out = rec.continuation().unwrap().direction;

        assert_eq!(rec.color, Color::ONE);
        assert!((out - incoming).length() < 1e-12);
    }

    #[test]
    fn test_dielectric_total_internal_reflection() {
        let material = Dielectric::new(1.5);
        // Leaving glass at a steep angle: sin(theta) * 1.5 > 1
        let incoming = Vec3::new(0.9, 0.3, 0.0).normalize();
        let ray = Ray::new(Vec3::ZERO, incoming);
        // Outward normal along +y, the ray travels with it, so it is inside
        let hit = hit_at(&ray, 1.0, Vec3::Y, &material);
        assert!(!hit.resultant_outward);

        let rec = material.scatter(&ray, &hit, &mut high_draws()).unwrap();
        let out = rec.continuation().unwrap().direction;
        assert!((out - reflect(incoming, -Vec3::Y)).length() < 1e-12);
    }

    #[test]
    fn test_dielectric_refracts_by_snell() {
        let material = Dielectric::new(1.5);
        let incoming = Vec3::new(0.5, -1.0, 0.0).normalize();
        let ray = Ray::new(Vec3::ZERO, incoming);
        let hit = hit_at(&ray, 1.0, Vec3::Y, &material);

        let rec = material.scatter(&ray, &hit, &mut high_draws()).unwrap();
        let out = rec.continuation().unwrap().direction;

        let sin_in = incoming.cross(Vec3::Y).length();
        let sin_out = out.normalize().cross(Vec3::Y).length();
        assert!((sin_in - 1.5 * sin_out).abs() < 1e-12);
        assert!(out.y < 0.0);
    }

    #[test]
    fn test_dielectric_reflects_when_draw_is_low() {
        let material = Dielectric::new(1.5);
        let incoming = Vec3::new(0.5, -1.0, 0.0).normalize();
        let ray = Ray::new(Vec3::ZERO, incoming);
        let hit = hit_at(&ray, 1.0, Vec3::Y, &material);

        // Draws of exactly zero never beat the Schlick reflectance
        let rec = material.scatter(&ray, &hit, &mut StepRng::new(0, 0)).unwrap();
        let out = rec.continuation().unwrap().direction;
        assert!((out - reflect(incoming, Vec3::Y)).length() < 1e-12);
    }

    #[test]
    fn test_schlick_at_normal_incidence() {
        let r = Dielectric::reflectance(1.0, 1.0 / 1.5);
        assert!((r - 0.04).abs() < 1e-12);
        assert_eq!(Dielectric::reflectance(1.0, 1.0), 0.0);
        assert_eq!(Dielectric::reflectance(0.0, 1.0), 1.0);
    }

    #[test]
    fn test_degenerate_incoming_ray_is_an_error() {
        let material = Metal::new(Color::ONE, 0.0);
        let probe = Ray::new(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, -1.0, 0.0));
        let hit = hit_at(&probe, 1.0, Vec3::Y, &material);
        let ray = Ray::new(Vec3::ZERO, Vec3::ZERO);

        let mut rng = StdRng::seed_from_u64(8);
        assert!(material.scatter(&ray, &hit, &mut rng).is_err());
    }

    #[test]
    fn test_material_from_descriptor() {
        let metal = material_from_descriptor(&MaterialDescriptor::Metal {
            albedo: Color::new(0.9, 0.1, 0.1),
            fuzziness: 0.0,
        });
        let ray = Ray::new(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, -1.0, 0.0));
        let hit = hit_at(&ray, 1.0, Vec3::Y, metal.as_ref());
        let rec = metal.scatter(&ray, &hit, &mut StdRng::seed_from_u64(1)).unwrap();

        assert_eq!(rec.color, Color::new(0.9, 0.1, 0.1));
        assert_eq!(rec.continuation().unwrap().direction, Vec3::Y);
    }
}
