use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use log::LevelFilter;
use marble_renderer::{CameraSettings, RenderConfig, Vec3};

/// Log levels accepted on the command line
#[derive(Debug, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Built-in scene generators
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SceneKind {
    /// Field of small marbles around three large spheres
    Random,
    /// Ground plus one diffuse, one metal and one glass sphere
    Demo,
}

#[derive(Parser, Debug)]
#[command(name = "marble")]
#[command(about = "A resumable Monte Carlo path tracer")]
pub struct Args {
    /// Image width in pixels
    #[arg(long, default_value_t = 960)]
    pub width: u32,

    /// Image height in pixels
    #[arg(long, default_value_t = 600)]
    pub height: u32,

    /// Number of samples per pixel
    #[arg(long, short = 's', default_value_t = 8)]
    pub samples_per_pixel: u32,

    /// Maximum number of bounces per path
    #[arg(long, default_value_t = 50)]
    pub max_depth: u32,

    /// Seed for every random draw of the render
    #[arg(long, default_value_t = 0)]
    pub seed: u64,

    /// Rows rendered between checkpoint flushes
    #[arg(long, default_value_t = 1)]
    pub rows_per_flush: u32,

    /// Scene generator used when no checkpoint exists
    #[arg(long, value_enum, default_value_t = SceneKind::Random)]
    pub scene: SceneKind,

    /// Seed of the random scene generator
    #[arg(long, default_value_t = 0)]
    pub scene_seed: u64,

    /// Load the scene from a JSON description instead of generating it
    #[arg(long)]
    pub scene_file: Option<PathBuf>,

    /// Directory holding the checkpoint files
    #[arg(long, default_value = ".")]
    pub checkpoint_dir: PathBuf,

    /// File stem of the checkpoint files
    #[arg(long, default_value = "marble")]
    pub name: String,

    /// Discard any existing checkpoint and start over
    #[arg(long)]
    pub fresh: bool,

    /// Stop (and keep the checkpoint) after rendering this many rows
    #[arg(long)]
    pub stop_after_rows: Option<u32>,

    /// Output image path (.png or .ppm)
    #[arg(short, long, default_value = "output.png")]
    pub output: PathBuf,

    /// Set the logging level
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub debug_level: LogLevel,
}

impl Args {
    pub fn render_config(&self) -> RenderConfig {
        RenderConfig {
            samples_per_pixel: self.samples_per_pixel,
            max_depth: self.max_depth,
            seed: self.seed,
            rows_per_flush: self.rows_per_flush,
        }
    }

    pub fn camera_settings(&self) -> CameraSettings {
        let settings = CameraSettings::new().with_resolution(self.width, self.height);
        match self.scene {
            SceneKind::Random => settings,
            SceneKind::Demo => settings
                .with_position(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), Vec3::Y)
                .with_lens(90.0, 0.0, 1.0),
        }
    }
}
