use crate::Vec3;

/// A ray in 3D space.
///
/// A ray starts at `base` and travels along `direction`, which is not
/// required to be unit length.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub base: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Create a new ray.
    #[inline]
    pub fn new(base: Vec3, direction: Vec3) -> Self {
        Self { base, direction }
    }

    /// Get the point along the ray at parameter t.
    ///
    /// Returns: base + t * direction
    #[inline]
    pub fn at(&self, t: f64) -> Vec3 {
        self.base + t * self.direction
    }
}
