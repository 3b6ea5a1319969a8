//! Hittable trait, HitRecord, and the world that aggregates primitives.

use crate::{material_from_descriptor, Material, Sphere};
use marble_core::{PrimitiveDescriptor, SceneDescription, SceneError};
use marble_math::{Aabb, Interval, Ray, Vec3};

/// Record of a ray-object intersection.
///
/// A miss is `None` at the call site; a `HitRecord` always describes a hit.
#[derive(Clone, Copy)]
pub struct HitRecord<'a> {
    /// Parameter t where the intersection occurs
    pub t: f64,
    /// Base is the hit point, direction is the unit surface normal,
    /// always oriented against the incoming ray
    pub resultant: Ray,
    /// Whether the ray hit the outside face of the surface
    pub resultant_outward: bool,
    /// Material at the intersection point
    pub material: &'a dyn Material,
}

impl<'a> HitRecord<'a> {
    /// Build a record for a hit at `t` and orient it against `ray`.
    pub fn new(
        ray: &Ray,
        t: f64,
        outward_normal: Vec3,
        material: &'a dyn Material,
    ) -> Self {
        let mut rec = Self {
            t,
            resultant: Ray::new(ray.at(t), outward_normal),
            resultant_outward: true,
            material,
        };
        rec.orient(ray, outward_normal);
        rec
    }

    /// Store the normal so it points against the incoming ray.
    ///
    /// When the ray already travels against `outward_normal` it hit the
    /// outside face; otherwise it is leaving the surface from inside and the
    /// stored normal is flipped.
    pub fn orient(&mut self, ray: &Ray, outward_normal: Vec3) {
        self.resultant_outward = ray.direction.dot(outward_normal) < 0.0;
        self.resultant.direction = if self.resultant_outward {
            outward_normal
        } else {
            -outward_normal
        };
    }

    /// The hit point.
    #[inline]
    pub fn point(&self) -> Vec3 {
        self.resultant.base
    }

    /// The oriented unit normal.
    #[inline]
    pub fn normal(&self) -> Vec3 {
        self.resultant.direction
    }
}

/// Trait for objects that can be hit by rays.
pub trait Hittable: Send + Sync {
    /// Nearest intersection with parameter strictly inside `ray_t`.
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'a>>;

    /// Get the axis-aligned bounding box of this object.
    fn bounding_box(&self) -> Aabb;
}

/// Margin added around each primitive's box before it joins the world box,
/// so rounding in the slab test never culls a grazing hit.
const BOUNDS_PADDING: f64 = 1e-6;

/// An ordered list of primitives, intersected by brute force once a ray
/// reaches their combined bounding box.
pub struct World {
    objects: Vec<Box<dyn Hittable>>,
    bbox: Aabb,
}

impl World {
    /// Create a new empty world.
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            bbox: Aabb::EMPTY,
        }
    }

    /// Build the world a scene description describes, in the same order.
    pub fn from_description(scene: &SceneDescription) -> Result<Self, SceneError> {
        scene.validate()?;

        let mut world = Self::new();
        for primitive in &scene.primitives {
            match primitive {
                PrimitiveDescriptor::Sphere {
                    center,
                    radius,
                    material,
                } => world.add(Box::new(Sphere::new(
                    *center,
                    *radius,
                    material_from_descriptor(material),
                ))),
            }
        }
        Ok(world)
    }

    /// Add an object to the world.
    pub fn add(&mut self, object: Box<dyn Hittable>) {
        self.bbox = Aabb::surrounding(&self.bbox, &object.bounding_box().pad(BOUNDS_PADDING));
        self.objects.push(object);
    }

    /// Get the number of objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Check if the world is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl Hittable for World {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'a>> {
        if !self.bbox.hit(ray, ray_t) {
            return None;
        }

        let mut closest: Option<HitRecord<'a>> = None;

        for object in &self.objects {
            let interval = match &closest {
                Some(rec) => ray_t.with_max(rec.t),
                None => ray_t,
            };
            if let Some(rec) = object.hit(ray, interval) {
                closest = Some(rec);
            }
        }

        closest
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}
