//! Vector and color operations that glam does not provide directly.

use crate::{Color, Vec3};
use thiserror::Error;

/// Components strictly below this magnitude count as zero for `near_zero`.
pub const NEAR_ZERO_EPSILON: f64 = 1e-3;

/// Smallest norm `unit` will divide by.
pub const UNIT_EPSILON: f64 = 1e-12;

/// Returned when normalizing a vector whose norm is (nearly) zero.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("cannot normalize degenerate vector ({x}, {y}, {z})")]
pub struct DegenerateVectorError {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl DegenerateVectorError {
    fn of(v: Vec3) -> Self {
        Self {
            x: v.x,
            y: v.y,
            z: v.z,
        }
    }
}

/// Extra vector operations used throughout the tracer.
pub trait VectorExt: Sized {
    /// Euclidean length, `sqrt(self · self)`.
    fn norm(self) -> f64;

    /// Unit vector in the same direction.
    ///
    /// Fails instead of producing NaN or infinite components when the norm
    /// is below [`UNIT_EPSILON`] or not finite.
    fn unit(self) -> Result<Self, DegenerateVectorError>;

    /// `weight * self + (1 - weight) * other`.
    ///
    /// Note the weight belongs to `self`, the opposite of `glam`'s `lerp`.
    fn lerp_weighted(self, other: Self, weight: f64) -> Self;

    /// True when every component is below [`NEAR_ZERO_EPSILON`] in magnitude.
    fn near_zero(self) -> bool;
}

impl VectorExt for Vec3 {
    #[inline]
    fn norm(self) -> f64 {
        self.dot(self).sqrt()
    }

    fn unit(self) -> Result<Self, DegenerateVectorError> {
        let norm = self.norm();
        if norm < UNIT_EPSILON || !norm.is_finite() {
            return Err(DegenerateVectorError::of(self));
        }
        Ok(self / norm)
    }

    #[inline]
    fn lerp_weighted(self, other: Self, weight: f64) -> Self {
        weight * self + (1.0 - weight) * other
    }

    #[inline]
    fn near_zero(self) -> bool {
        self.abs().max_element() < NEAR_ZERO_EPSILON
    }
}

/// Color operations: attenuation and conversion to display values.
pub trait ColorExt {
    /// Component-wise (Hadamard) product.
    fn attenuate(self, other: Color) -> Color;

    /// Gamma-correct (square root) and clamp every channel to `[0, 0.999]`.
    fn to_display(self) -> Color;

    /// Quantize an already display-encoded color to 8 bits per channel.
    fn to_rgb8(self) -> [u8; 3];
}

impl ColorExt for Color {
    #[inline]
    fn attenuate(self, other: Color) -> Color {
        self * other
    }

    fn to_display(self) -> Color {
        Color::new(
            display_channel(self.x),
            display_channel(self.y),
            display_channel(self.z),
        )
    }

    fn to_rgb8(self) -> [u8; 3] {
        [
            quantize(self.x),
            quantize(self.y),
            quantize(self.z),
        ]
    }
}

#[inline]
fn display_channel(linear: f64) -> f64 {
    // max(0) first so negative noise never reaches sqrt
    linear.max(0.0).sqrt().clamp(0.0, 0.999)
}

#[inline]
fn quantize(display: f64) -> u8 {
    (display.clamp(0.0, 0.999) * 256.0).floor() as u8
}
