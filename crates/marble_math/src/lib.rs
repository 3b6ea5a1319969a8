//! Math types for the Marble path tracer.
//!
//! Everything is `f64`: the renderer promises bit-reproducible output and
//! the intersection tests compare normals against tight tolerances.

pub use glam::{DVec2, DVec3};

/// Three-component vector used for points, directions and normals.
pub type Vec3 = DVec3;

/// Linear RGB color, stored in the same vector type.
pub type Color = DVec3;

mod aabb;
mod interval;
mod ray;
mod vector;

pub use aabb::Aabb;
pub use interval::Interval;
pub use ray::Ray;
pub use vector::{ColorExt, DegenerateVectorError, VectorExt, NEAR_ZERO_EPSILON, UNIT_EPSILON};
