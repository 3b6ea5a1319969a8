//! On-disk checkpoints: the scene as JSON and the pixel buffer as raw `f64`s.
//!
//! Pixel file layout (header little-endian):
//!
//! ```text
//! b"MRBLPIX\0"  magic
//! u32           version (2)
//! u32 u32       width, height
//! u32           channels per pixel (3)
//! u32 u32       samples per pixel, max depth
//! u64           seed
//! u64           camera fingerprint
//! f64 * w*h*3   channels in [x][y][channel] order, native endian
//! ```

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use bytemuck::{Pod, Zeroable};
use marble_core::{SceneDescription, SceneError};
use thiserror::Error;

use crate::{CameraSettings, PixelBuffer, RenderConfig, UNWRITTEN};

const MAGIC: [u8; 8] = *b"MRBLPIX\0";
const VERSION: u32 = 2;
const CHANNELS: u32 = 3;
const HEADER_LEN: usize = std::mem::size_of::<Header>();

/// Pixel file header, fields stored little-endian.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct Header {
    magic: [u8; 8],
    version: u32,
    width: u32,
    height: u32,
    channels: u32,
    samples_per_pixel: u32,
    max_depth: u32,
    seed: u64,
    camera: u64,
}

impl Header {
    fn new(image: &PixelBuffer, camera: &CameraSettings, config: &RenderConfig) -> Self {
        Self {
            magic: MAGIC,
            version: VERSION,
            width: image.width(),
            height: image.height(),
            channels: CHANNELS,
            samples_per_pixel: config.samples_per_pixel,
            max_depth: config.max_depth,
            seed: config.seed,
            camera: camera.fingerprint(),
        }
    }

    /// Swap every field between native and little-endian order. The
    /// conversion is its own inverse, so it serves both reads and writes.
    fn swap_le(self) -> Self {
        Self {
            magic: self.magic,
            version: self.version.to_le(),
            width: self.width.to_le(),
            height: self.height.to_le(),
            channels: self.channels.to_le(),
            samples_per_pixel: self.samples_per_pixel.to_le(),
            max_depth: self.max_depth.to_le(),
            seed: self.seed.to_le(),
            camera: self.camera.to_le(),
        }
    }
}

/// Errors reading or writing checkpoint files.
///
/// Every variant is recoverable by discarding the checkpoint and starting
/// over.
#[derive(Error, Debug)]
pub enum CheckpointError {
    #[error("checkpoint I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("corrupt checkpoint: {0}")]
    Corrupt(String),

    #[error("checkpoint is {found_width}x{found_height}, expected {width}x{height}")]
    ShapeMismatch {
        width: u32,
        height: u32,
        found_width: u32,
        found_height: u32,
    },

    #[error("checkpoint was rendered with a different {0}")]
    SettingsMismatch(&'static str),

    #[error("unreadable scene checkpoint: {0}")]
    Scene(#[source] serde_json::Error),

    #[error("invalid scene checkpoint: {0}")]
    InvalidScene(#[source] SceneError),
}

impl From<SceneError> for CheckpointError {
    fn from(err: SceneError) -> Self {
        match err {
            SceneError::Json(json) => CheckpointError::Scene(json),
            other => CheckpointError::InvalidScene(other),
        }
    }
}

/// Locations of the two checkpoint artifacts of one render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckpointStore {
    pixels_path: PathBuf,
    scene_path: PathBuf,
}

impl CheckpointStore {
    /// Store `<dir>/<stem>.pixels` and `<dir>/<stem>.scene.json`.
    pub fn new(dir: impl AsRef<Path>, stem: &str) -> Self {
        let dir = dir.as_ref();
        Self {
            pixels_path: dir.join(format!("{stem}.pixels")),
            scene_path: dir.join(format!("{stem}.scene.json")),
        }
    }

    pub fn pixels_path(&self) -> &Path {
        &self.pixels_path
    }

    pub fn scene_path(&self) -> &Path {
        &self.scene_path
    }

    pub fn has_scene(&self) -> bool {
        self.scene_path.is_file()
    }

    pub fn has_pixels(&self) -> bool {
        self.pixels_path.is_file()
    }

    pub fn save_scene(&self, scene: &SceneDescription) -> Result<(), CheckpointError> {
        let json = scene.to_json()?;
        atomic_write(&self.scene_path, json.as_bytes())?;
        log::debug!(
            "Saved {} primitives to {}",
            scene.len(),
            self.scene_path.display()
        );
        Ok(())
    }

    /// Load and validate the saved scene.
    pub fn load_scene(&self) -> Result<SceneDescription, CheckpointError> {
        let json = fs::read_to_string(&self.scene_path)?;
        Ok(SceneDescription::from_json(&json)?)
    }

    /// Save `image` along with the camera and sampling settings that
    /// produced it.
    pub fn save_pixels(
        &self,
        image: &PixelBuffer,
        camera: &CameraSettings,
        config: &RenderConfig,
    ) -> Result<(), CheckpointError> {
        let header = Header::new(image, camera, config).swap_le();
        let payload: &[u8] = bytemuck::cast_slice(image.as_slice());
        let mut bytes = Vec::with_capacity(HEADER_LEN + payload.len());

        bytes.extend_from_slice(bytemuck::bytes_of(&header));
        bytes.extend_from_slice(payload);

        atomic_write(&self.pixels_path, &bytes)
    }

    /// Load the pixel file, checking it was rendered through `camera` with
    /// the same sampling settings.
    pub fn load_pixels(
        &self,
        camera: &CameraSettings,
        config: &RenderConfig,
    ) -> Result<PixelBuffer, CheckpointError> {
        let bytes = fs::read(&self.pixels_path)?;
        decode_pixels(&bytes, camera, config)
    }

    /// Remove both artifacts. Missing files are not an error.
    pub fn discard(&self) -> Result<(), CheckpointError> {
        for path in [&self.pixels_path, &self.scene_path] {
            match fs::remove_file(path) {
                Ok(()) => log::debug!("Removed {}", path.display()),
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(err) => return Err(err.into()),
            }
        }
        Ok(())
    }
}

fn decode_pixels(
    bytes: &[u8],
    camera: &CameraSettings,
    config: &RenderConfig,
) -> Result<PixelBuffer, CheckpointError> {
    if bytes.len() < HEADER_LEN {
        return Err(CheckpointError::Corrupt(format!(
            "file is {} bytes, shorter than the header",
            bytes.len()
        )));
    }
    let header = bytemuck::pod_read_unaligned::<Header>(&bytes[..HEADER_LEN]).swap_le();
    if header.magic != MAGIC {
        return Err(CheckpointError::Corrupt("bad magic".into()));
    }
    if header.version != VERSION {
        return Err(CheckpointError::Corrupt(format!(
            "unsupported version {}",
            header.version
        )));
    }
    if header.channels != CHANNELS {
        return Err(CheckpointError::Corrupt(format!(
            "{} channels per pixel",
            header.channels
        )));
    }

    let (width, height) = (camera.image_width, camera.image_height);
    if (header.width, header.height) != (width, height) {
        return Err(CheckpointError::ShapeMismatch {
            width,
            height,
            found_width: header.width,
            found_height: header.height,
        });
    }
    if header.samples_per_pixel != config.samples_per_pixel {
        return Err(CheckpointError::SettingsMismatch("samples per pixel"));
    }
    if header.max_depth != config.max_depth {
        return Err(CheckpointError::SettingsMismatch("max depth"));
    }
    if header.seed != config.seed {
        return Err(CheckpointError::SettingsMismatch("seed"));
    }
    if header.camera != camera.fingerprint() {
        return Err(CheckpointError::SettingsMismatch("camera"));
    }

    let payload = &bytes[HEADER_LEN..];
    let expected = width as usize * height as usize * 3;
    if payload.len() != expected * std::mem::size_of::<f64>() {
        return Err(CheckpointError::Corrupt(format!(
            "payload is {} bytes, expected {}",
            payload.len(),
            expected * std::mem::size_of::<f64>()
        )));
    }

    let mut data = vec![0.0f64; expected];
    bytemuck::cast_slice_mut::<f64, u8>(&mut data).copy_from_slice(payload);

    for (index, pixel) in data.chunks_exact(3).enumerate() {
        let unwritten = pixel[0] == UNWRITTEN;
        let valid = if unwritten {
            pixel.iter().all(|&c| c == UNWRITTEN)
        } else {
            pixel.iter().all(|c| (0.0..=1.0).contains(c))
        };
        if !valid {
            let x = index / height as usize;
            let y = index % height as usize;
            return Err(CheckpointError::Corrupt(format!(
                "pixel ({x}, {y}) holds {pixel:?}"
            )));
        }
    }

    Ok(PixelBuffer::from_raw(width, height, data))
}

/// Write through `<path>.tmp` and rename, so a crash never leaves a
/// half-written checkpoint behind.
fn atomic_write(path: &Path, bytes: &[u8]) -> Result<(), CheckpointError> {
    let mut tmp = OsString::from(path.as_os_str());
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    let mut file = File::create(&tmp)?;
    file.write_all(bytes)?;
    file.sync_all()?;
    drop(file);

    fs::rename(&tmp, path)?;
    Ok(())
}
