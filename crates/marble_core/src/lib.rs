//! Marble Core - scene descriptions for the Marble path tracer.
//!
//! This crate provides:
//!
//! - **Scene description types**: `SceneDescription`, `PrimitiveDescriptor`,
//!   `MaterialDescriptor`, serialisable with serde
//! - **Scene generators**: the small demo scene and the randomized
//!   marble field
//!
//! # Example
//!
//! ```ignore
//! use marble_core::{random_scene, SceneDescription};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let scene = random_scene(&mut StdRng::seed_from_u64(7));
//! let json = scene.to_json()?;
//! assert_eq!(SceneDescription::from_json(&json)?, scene);
//! ```

pub mod generate;
pub mod scene;

// Re-export commonly used types
pub use generate::{demo_scene, random_scene};
pub use scene::{MaterialDescriptor, PrimitiveDescriptor, SceneDescription, SceneError};
