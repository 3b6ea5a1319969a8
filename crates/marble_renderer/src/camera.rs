//! Camera for ray generation.

use crate::renderer::splitmix64;
use crate::{sampling, ConfigError};
use marble_math::{Ray, Vec3, VectorExt};
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// Everything needed to build a [`Camera`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraSettings {
    // Image settings
    pub image_width: u32,
    pub image_height: u32,

    // Camera positioning
    pub look_from: Vec3,
    pub look_at: Vec3,
    pub up: Vec3,

    // Lens settings
    pub vfov: f64,           // Vertical field of view in degrees
    pub aperture: f64,       // Lens diameter, 0 for a pinhole
    pub focus_distance: f64, // Distance from camera to plane of perfect focus
}

impl CameraSettings {
    /// Create settings with the default marble-field framing.
    pub fn new() -> Self {
        Self {
            image_width: 960,
            image_height: 600,
            look_from: Vec3::new(13.0, 2.0, 3.0),
            look_at: Vec3::ZERO,
            up: Vec3::Y,
            vfov: 20.0,
            aperture: 0.1,
            focus_distance: 10.0,
        }
    }

    /// Set image resolution.
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.image_width = width;
        self.image_height = height;
        self
    }

    /// Set camera position.
    pub fn with_position(mut self, look_from: Vec3, look_at: Vec3, up: Vec3) -> Self {
        self.look_from = look_from;
        self.look_at = look_at;
        self.up = up;
        self
    }

    /// Set lens settings.
    pub fn with_lens(mut self, vfov: f64, aperture: f64, focus_distance: f64) -> Self {
        self.vfov = vfov;
        self.aperture = aperture;
        self.focus_distance = focus_distance;
        self
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.image_width as f64 / self.image_height as f64
    }

    /// Hash of every field, bit for bit.
    ///
    /// Two settings with the same fingerprint frame the same rays, so a
    /// checkpoint stores it to refuse resuming under a different camera.
    pub fn fingerprint(&self) -> u64 {
        let words = [
            u64::from(self.image_width),
            u64::from(self.image_height),
            self.look_from.x.to_bits(),
            self.look_from.y.to_bits(),
            self.look_from.z.to_bits(),
            self.look_at.x.to_bits(),
            self.look_at.y.to_bits(),
            self.look_at.z.to_bits(),
            self.up.x.to_bits(),
            self.up.y.to_bits(),
            self.up.z.to_bits(),
            self.vfov.to_bits(),
            self.aperture.to_bits(),
            self.focus_distance.to_bits(),
        ];
        words
            .into_iter()
            .fold(0, |hash, word| splitmix64(hash ^ splitmix64(word)))
    }

    /// Validate the settings and derive the camera basis and viewport.
    pub fn build(&self) -> Result<Camera, ConfigError> {
        if self.image_width == 0 || self.image_height == 0 {
            return Err(ConfigError::ImageSize {
                width: self.image_width,
                height: self.image_height,
            });
        }
        if !(self.look_from.is_finite() && self.look_at.is_finite() && self.up.is_finite()) {
            return Err(ConfigError::NonFinite("position"));
        }
        if !(self.vfov.is_finite() && self.vfov > 0.0 && self.vfov < 180.0) {
            return Err(ConfigError::FieldOfView(self.vfov));
        }
        if !(self.focus_distance.is_finite() && self.focus_distance > 0.0) {
            return Err(ConfigError::FocusDistance(self.focus_distance));
        }
        if !(self.aperture.is_finite() && self.aperture >= 0.0) {
            return Err(ConfigError::Aperture(self.aperture));
        }

        // Calculate camera basis vectors
        let w = (self.look_from - self.look_at)
            .unit()
            .map_err(|_| ConfigError::DegenerateBasis("look_from equals look_at"))?;
        let u = self
            .up
            .cross(w)
            .unit()
            .map_err(|_| ConfigError::DegenerateBasis("up is parallel to the view direction"))?;
        let v = w.cross(u);

        // Calculate viewport dimensions
        let theta = self.vfov.to_radians();
        let viewport_height = 2.0 * (theta / 2.0).tan();
        let viewport_width = viewport_height * self.aspect_ratio();

        let horizontal = viewport_width * u * self.focus_distance;
        let vertical = viewport_height * v * self.focus_distance;
        let lower_left =
            self.look_from - horizontal / 2.0 - vertical / 2.0 - self.focus_distance * w;

        Ok(Camera {
            image_width: self.image_width,
            image_height: self.image_height,
            origin: self.look_from,
            lower_left,
            horizontal,
            vertical,
            u,
            v,
            lens_radius: self.aperture / 2.0,
            settings: self.clone(),
        })
    }
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self::new()
    }
}

/// Immutable camera that maps normalized image coordinates to rays.
#[derive(Debug, Clone)]
pub struct Camera {
    pub image_width: u32,
    pub image_height: u32,
    origin: Vec3,
    lower_left: Vec3,
    horizontal: Vec3,
    vertical: Vec3,
    u: Vec3,
    v: Vec3,
    lens_radius: f64,
    settings: CameraSettings,
}

impl Camera {
    /// Generate a ray through normalized image coordinates.
    ///
    /// `s` runs left to right and `t` bottom to top, both over `[0, 1]`.
    /// With a non-zero aperture the ray starts at a random point on the lens.
    pub fn get_ray(&self, s: f64, t: f64, rng: &mut dyn RngCore) -> Ray {
        let base = self.origin + self.lens_offset(rng);
        let direction = self.lower_left + s * self.horizontal + t * self.vertical - base;
        Ray::new(base, direction)
    }

    /// Sample a point on the lens, in the u/v plane.
    fn lens_offset(&self, rng: &mut dyn RngCore) -> Vec3 {
        if self.lens_radius == 0.0 {
            return Vec3::ZERO;
        }
        let p = sampling::random_in_unit_disk(rng);
        (p.x * self.u + p.y * self.v) * self.lens_radius
    }

    /// The settings this camera was built from.
    pub fn settings(&self) -> &CameraSettings {
        &self.settings
    }
}
