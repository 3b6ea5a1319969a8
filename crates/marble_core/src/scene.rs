//! Serialisable scene description.
//!
//! A scene is an ordered list of primitives, each carrying its own material
//! parameters. The renderer builds its world from this description, and the
//! checkpoint layer stores it verbatim so a resumed render sees exactly the
//! scene the session started with, even when the scene was randomly
//! generated.

use marble_math::{Color, Vec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while validating or decoding a scene description.
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("primitive {index}: sphere radius must be positive and finite, got {radius}")]
    InvalidRadius { index: usize, radius: f64 },

    #[error("primitive {index}: index of refraction must be positive and finite, got {ior}")]
    InvalidIndexOfRefraction { index: usize, ior: f64 },

    #[error("primitive {index}: {field} has a non-finite component")]
    NonFinite { index: usize, field: &'static str },

    #[error("scene json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Surface response of a primitive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MaterialDescriptor {
    /// Diffuse surface.
    Lambertian { albedo: Color },

    /// Specular surface; `fuzziness` is clamped to `[0, 1]` by the renderer.
    Metal { albedo: Color, fuzziness: f64 },

    /// Clear refractive surface such as glass (1.5) or water (1.33).
    Dielectric { index_of_refraction: f64 },
}

/// One intersectable shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum PrimitiveDescriptor {
    Sphere {
        center: Vec3,
        radius: f64,
        material: MaterialDescriptor,
    },
}

impl PrimitiveDescriptor {
    /// Convenience constructor for a sphere.
    pub fn sphere(center: Vec3, radius: f64, material: MaterialDescriptor) -> Self {
        Self::Sphere {
            center,
            radius,
            material,
        }
    }

    /// Material of this primitive.
    pub fn material(&self) -> &MaterialDescriptor {
        match self {
            Self::Sphere { material, .. } => material,
        }
    }

    fn validate(&self, index: usize) -> Result<(), SceneError> {
        let Self::Sphere {
            center,
            radius,
            material,
        } = self;

        if !center.is_finite() {
            return Err(SceneError::NonFinite {
                index,
                field: "center",
            });
        }
        if !(radius.is_finite() && *radius > 0.0) {
            return Err(SceneError::InvalidRadius {
                index,
                radius: *radius,
            });
        }

        match *material {
            MaterialDescriptor::Lambertian { albedo } if !albedo.is_finite() => {
                Err(SceneError::NonFinite {
                    index,
                    field: "albedo",
                })
            }
            MaterialDescriptor::Metal { albedo, fuzziness }
                if !albedo.is_finite() || !fuzziness.is_finite() =>
            {
                Err(SceneError::NonFinite {
                    index,
                    field: "metal parameters",
                })
            }
            MaterialDescriptor::Dielectric {
                index_of_refraction,
            } if !(index_of_refraction.is_finite() && index_of_refraction > 0.0) => {
                Err(SceneError::InvalidIndexOfRefraction {
                    index,
                    ior: index_of_refraction,
                })
            }
            _ => Ok(()),
        }
    }
}

/// An ordered list of primitives.
///
/// Order is significant: it is the order in which the world tests
/// primitives, and it must survive a save/load cycle unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneDescription {
    pub primitives: Vec<PrimitiveDescriptor>,
}

impl SceneDescription {
    /// Create an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a primitive.
    pub fn push(&mut self, primitive: PrimitiveDescriptor) {
        self.primitives.push(primitive);
    }

    /// Number of primitives.
    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    /// True when the scene has no primitives.
    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    /// Check every primitive, reporting the first invalid one.
    pub fn validate(&self) -> Result<(), SceneError> {
        self.primitives
            .iter()
            .enumerate()
            .try_for_each(|(index, primitive)| primitive.validate(index))
    }

    /// Encode as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, SceneError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decode from JSON and validate.
    pub fn from_json(json: &str) -> Result<Self, SceneError> {
        let scene: SceneDescription = serde_json::from_str(json)?;
        scene.validate()?;
        Ok(scene)
    }
}

impl FromIterator<PrimitiveDescriptor> for SceneDescription {
    fn from_iter<I: IntoIterator<Item = PrimitiveDescriptor>>(iter: I) -> Self {
        Self {
            primitives: iter.into_iter().collect(),
        }
    }
}
