//! Error types for configuration and rendering.

use crate::CheckpointError;
use marble_core::SceneError;
use marble_math::DegenerateVectorError;
use thiserror::Error;

/// Invalid camera or render settings, reported before any tracing starts.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("image dimensions must be positive, got {width}x{height}")]
    ImageSize { width: u32, height: u32 },

    #[error("vertical field of view must be in (0, 180) degrees, got {0}")]
    FieldOfView(f64),

    #[error("focus distance must be positive, got {0}")]
    FocusDistance(f64),

    #[error("aperture must be non-negative, got {0}")]
    Aperture(f64),

    #[error("camera {0} is not finite")]
    NonFinite(&'static str),

    #[error("camera basis is degenerate: {0}")]
    DegenerateBasis(&'static str),

    #[error("samples per pixel must be at least 1")]
    Samples,

    #[error("max depth must be between 1 and {limit}, got {depth}")]
    MaxDepth { depth: u32, limit: u32 },

    #[error("rows per flush must be at least 1")]
    RowsPerFlush,
}

/// Anything that can stop a render session.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),

    #[error("invalid scene: {0}")]
    Scene(#[from] SceneError),

    #[error("pixel ({x}, {y}): {source}")]
    Degenerate {
        x: u32,
        y: u32,
        #[source]
        source: DegenerateVectorError,
    },
}

impl RenderError {
    /// True when discarding the checkpoint and starting over may help.
    pub fn is_recoverable_checkpoint(&self) -> bool {
        matches!(self, RenderError::Checkpoint(_))
    }
}
