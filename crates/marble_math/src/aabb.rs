use crate::{Interval, Ray, Vec3};

/// Axis-aligned bounding box.
///
/// Defined by three intervals (one per axis) that bound a 3D volume.
/// The world rejects rays that miss the union of its primitives' boxes
/// before testing any primitive.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub x: Interval,
    pub y: Interval,
    pub z: Interval,
}

impl Aabb {
    /// Create an AABB from two corner points.
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        Self {
            x: Interval::new(a.x.min(b.x), a.x.max(b.x)),
            y: Interval::new(a.y.min(b.y), a.y.max(b.y)),
            z: Interval::new(a.z.min(b.z), a.z.max(b.z)),
        }
    }

    /// Create an AABB that surrounds two other AABBs.
    pub fn surrounding(box0: &Aabb, box1: &Aabb) -> Self {
        Self {
            x: Interval::surrounding(&box0.x, &box1.x),
            y: Interval::surrounding(&box0.y, &box1.y),
            z: Interval::surrounding(&box0.z, &box1.z),
        }
    }

    /// Grow every axis by `delta`, half on each side.
    pub fn pad(&self, delta: f64) -> Self {
        Self {
            x: self.x.expand(delta),
            y: self.y.expand(delta),
            z: self.z.expand(delta),
        }
    }

    /// Get the interval for a specific axis (0=X, 1=Y, 2=Z).
    pub fn axis_interval(&self, n: usize) -> Interval {
        match n {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }

    /// Slab test against the parameter range `ray_t`.
    ///
    /// Each axis narrows the running interval; the test fails as soon as it
    /// becomes empty. An axis the ray runs parallel to never narrows the
    /// interval, but the ray can only reach the box if its base already
    /// lies inside that slab.
    pub fn hit(&self, r: &Ray, mut ray_t: Interval) -> bool {
        for axis in 0..3 {
            let slab = self.axis_interval(axis);
            let base = r.base[axis];
            let dir = r.direction[axis];

            if dir == 0.0 {
                if !slab.contains(base) {
                    return false;
                }
                continue;
            }

            let t0 = (slab.min - base) / dir;
            let t1 = (slab.max - base) / dir;
            let (near, far) = if dir < 0.0 { (t1, t0) } else { (t0, t1) };

            ray_t.min = near.max(ray_t.min);
            ray_t.max = far.min(ray_t.max);
            if ray_t.is_empty() {
                return false;
            }
        }

        true
    }

    pub const EMPTY: Aabb = Aabb {
        x: Interval::EMPTY,
        y: Interval::EMPTY,
        z: Interval::EMPTY,
    };
}
