//! Sphere primitive for ray tracing.

use std::sync::Arc;

use crate::{
    hittable::{HitRecord, Hittable},
    Material,
};
use marble_math::{Aabb, Interval, Ray, Vec3};

/// A sphere primitive.
///
/// The material is shared: many spheres may point at the same one.
pub struct Sphere {
    center: Vec3,
    radius: f64,
    material: Arc<dyn Material>,
    bbox: Aabb,
}

impl Sphere {
    /// Create a new sphere.
    pub fn new(center: Vec3, radius: f64, material: Arc<dyn Material>) -> Self {
        let rvec = Vec3::splat(radius);
        let bbox = Aabb::from_points(center - rvec, center + rvec);

        Self {
            center,
            radius,
            material,
            bbox,
        }
    }
}

impl Hittable for Sphere {
    /// Solves `|base + t*dir - center|^2 = radius^2`.
    ///
    /// A zero discriminant (tangent ray) is treated as a miss. The smaller
    /// root is tried first; the first root strictly inside `ray_t` wins.
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'a>> {
        let base_to_center = ray.base - self.center;
        let a = ray.direction.length_squared();
        let b = ray.direction.dot(base_to_center);
        let c = base_to_center.length_squared() - self.radius * self.radius;

        let discriminant = b * b - a * c;
        if discriminant <= 0.0 {
            return None;
        }

        let sqrtd = discriminant.sqrt();
        let root = [(-b - sqrtd) / a, (-b + sqrtd) / a]
            .into_iter()
            .find(|&t| ray_t.surrounds(t))?;

        let outward_normal = (ray.at(root) - self.center) / self.radius;
        Some(HitRecord::new(ray, root, outward_normal, self.material.as_ref()))
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Color, Lambertian};

    fn test_sphere() -> Sphere {
        Sphere::new(
            Vec3::new(0.0, 0.0, -1.0),
            0.5,
            Arc::new(Lambertian::new(Color::splat(0.5))),
        )
    }

    fn forward() -> Interval {
        Interval::new(0.001, f64::INFINITY)
    }

    #[test]
    fn test_sphere_hit() {
        let sphere = test_sphere();
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));

        let rec = sphere.hit(&ray, forward()).unwrap();
        assert_eq!(rec.t, 0.5);
        assert_eq!(rec.normal(), Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(rec.point(), Vec3::new(0.0, 0.0, -0.5));
        assert!(rec.resultant_outward);
    }

    #[test]
    fn test_sphere_miss() {
        let sphere = test_sphere();

        // Ray pointing away from sphere
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 1.0, 0.0));
        assert!(sphere.hit(&ray, forward()).is_none());
    }

    #[test]
    fn test_tangent_ray_is_a_miss() {
        let sphere = test_sphere();

        // Grazes the sphere at (0.5, 0, -1); the discriminant is exactly zero
        let ray = Ray::new(Vec3::new(0.5, 0.0, 0.0), Vec3::new(0.0, 0.0, -1.0));
        for _ in 0..10 {
            assert!(sphere.hit(&ray, forward()).is_none());
        }

        // Nudged inward it becomes a hit
        let ray = Ray::new(Vec3::new(0.499, 0.0, 0.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(sphere.hit(&ray, forward()).is_some());
    }

    #[test]
    fn test_hit_from_inside_uses_far_root() {
        let sphere = test_sphere();
        let ray = Ray::new(Vec3::new(0.0, 0.0, -1.0), Vec3::new(0.0, 0.0, -1.0));

        let rec = sphere.hit(&ray, forward()).unwrap();
        assert!((rec.t - 0.5).abs() < 1e-12);
        assert!(!rec.resultant_outward);
        // Normal points back against the ray, towards the center
        assert_eq!(rec.normal(), Vec3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_interval_excludes_roots() {
        let sphere = test_sphere();
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));

        // Roots at 0.5 and 1.5
        assert!(sphere.hit(&ray, Interval::new(0.001, 0.5)).is_none());
        let rec = sphere.hit(&ray, Interval::new(0.6, 10.0)).unwrap();
        assert!((rec.t - 1.5).abs() < 1e-12);
        assert!(sphere.hit(&ray, Interval::new(1.6, 10.0)).is_none());
    }

    #[test]
    fn test_normals_are_unit_and_oriented() {
        let sphere = Sphere::new(
            Vec3::new(0.3, -0.2, -2.0),
            0.7,
            Arc::new(Lambertian::new(Color::ONE)),
        );

        for i in 0..50 {
            let angle = i as f64 * 0.013;
            let direction = Vec3::new(angle.sin() * 0.3, -angle.cos() * 0.1, -1.0);
            let ray = Ray::new(Vec3::new(0.1, 0.0, 0.0), direction * (1.0 + i as f64));

            if let Some(rec) = sphere.hit(&ray, forward()) {
                assert!((rec.normal().length() - 1.0).abs() < 1e-9);
                if rec.resultant_outward {
                    assert!(ray.direction.dot(rec.normal()) < 0.0);
                }
            }
        }
    }

    #[test]
    fn test_bounding_box() {
        let bbox = test_sphere().bounding_box();
        assert_eq!(bbox.x, Interval::new(-0.5, 0.5));
        assert_eq!(bbox.z, Interval::new(-1.5, -0.5));
    }
}
