//! Tone-mapped pixel storage and the hand-off to image writers.

use std::io::{self, Write};
use std::path::Path;

use marble_math::{Color, ColorExt};

/// Channel value marking a pixel that has not been rendered yet.
pub const UNWRITTEN: f64 = -1.0;

/// Dense `width x height` grid of display-range RGB values.
///
/// Storage order is `[x][y][channel]` with `y = 0` at the bottom of the
/// image, which is also the checkpoint file order. Unwritten pixels hold
/// [`UNWRITTEN`] in every channel.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<f64>,
}

impl PixelBuffer {
    /// Create a buffer with every pixel unwritten.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![UNWRITTEN; width as usize * height as usize * 3],
        }
    }

    /// Wrap raw checkpoint data; the caller has checked the length.
    pub(crate) fn from_raw(width: u32, height: u32, data: Vec<f64>) -> Self {
        debug_assert_eq!(data.len(), width as usize * height as usize * 3);
        Self {
            width,
            height,
            data,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw channel values in storage order.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> usize {
        (x as usize * self.height as usize + y as usize) * 3
    }

    /// True once pixel `(x, y)` holds a rendered color.
    pub fn is_written(&self, x: u32, y: u32) -> bool {
        self.data[self.offset(x, y)] != UNWRITTEN
    }

    /// Get the pixel at (x, y), or `None` if it is still unwritten.
    pub fn get(&self, x: u32, y: u32) -> Option<Color> {
        let i = self.offset(x, y);
        if self.data[i] == UNWRITTEN {
            return None;
        }
        Some(Color::new(self.data[i], self.data[i + 1], self.data[i + 2]))
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        let i = self.offset(x, y);
        self.data[i..i + 3].copy_from_slice(&color.to_array());
    }

    /// True when every pixel of row `y` is written.
    pub fn row_complete(&self, y: u32) -> bool {
        (0..self.width).all(|x| self.is_written(x, y))
    }

    /// Number of rows with every pixel written.
    pub fn complete_rows(&self) -> u32 {
        (0..self.height).filter(|&y| self.row_complete(y)).count() as u32
    }

    /// Number of written pixels.
    pub fn written_count(&self) -> usize {
        self.data
            .chunks_exact(3)
            .filter(|pixel| pixel[0] != UNWRITTEN)
            .count()
    }

    pub fn is_complete(&self) -> bool {
        self.written_count() == self.width as usize * self.height as usize
    }

    /// 8-bit RGB raster, row-major with the top row first.
    ///
    /// Unwritten pixels come out black.
    pub fn to_rgb8(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.width as usize * self.height as usize * 3);
        for y in (0..self.height).rev() {
            for x in 0..self.width {
                let rgb = self.get(x, y).unwrap_or(Color::ZERO).to_rgb8();
                bytes.extend_from_slice(&rgb);
            }
        }
        bytes
    }

    /// Write a plain-text PPM (`P3`) in the same order as [`to_rgb8`](Self::to_rgb8).
    pub fn write_ppm<W: Write>(&self, mut writer: W) -> io::Result<()> {
        writeln!(writer, "P3")?;
        writeln!(writer, "{} {}", self.width, self.height)?;
        writeln!(writer, "255")?;

        for rgb in self.to_rgb8().chunks_exact(3) {
            writeln!(writer, "{} {} {}", rgb[0], rgb[1], rgb[2])?;
        }

        writer.flush()
    }

    /// Encode as PNG.
    pub fn save_png(&self, path: impl AsRef<Path>) -> image::ImageResult<()> {
        image::save_buffer_with_format(
            path,
            &self.to_rgb8(),
            self.width,
            self.height,
            image::ColorType::Rgb8,
            image::ImageFormat::Png,
        )
    }
}
