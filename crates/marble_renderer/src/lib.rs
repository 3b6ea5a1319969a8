//! Marble Renderer - CPU Path Tracing
//!
//! A brute-force Monte Carlo path tracer over spheres, with stratified
//! supersampling, depth of field, and checkpointed rendering that can be
//! interrupted and resumed without changing the final image.

mod batch;
mod buffer;
mod camera;
mod checkpoint;
mod error;
mod hittable;
mod material;
mod renderer;
pub mod sampling;
mod session;
mod sphere;

pub use batch::{generate_batches, render_batch, RowBatch};
pub use buffer::{PixelBuffer, UNWRITTEN};
pub use camera::{Camera, CameraSettings};
pub use checkpoint::{CheckpointError, CheckpointStore};
pub use error::{ConfigError, RenderError};
pub use hittable::{HitRecord, Hittable, World};
pub use material::{material_from_descriptor, Dielectric, Lambertian, Material, MaterialRecord, Metal};
pub use renderer::{
    estimate_radiance, render, render_pixel, sky_gradient, strata_rows, stratified_offsets,
    RenderConfig, HIT_EPSILON, MAX_DEPTH_LIMIT,
};
pub use session::{RenderOutcome, RenderSession};
pub use sphere::Sphere;

/// Re-export the math types used in the public API
pub use marble_math::{Aabb, Color, ColorExt, DegenerateVectorError, Interval, Ray, Vec3, VectorExt};
