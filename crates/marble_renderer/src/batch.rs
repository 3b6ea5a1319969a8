//! Row batches: the unit of work between two checkpoint flushes.
//!
//! Rows inside a batch render in parallel using rayon; batches run in
//! order from the bottom of the image to the top.

use crate::renderer::render_pixel;
use crate::{Camera, Hittable, PixelBuffer, RenderConfig, RenderError};
use marble_math::Color;
use rayon::prelude::*;

/// A contiguous band of image rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowBatch {
    /// First (lowest) row of the band, `y = 0` being the bottom row
    pub first_row: u32,
    /// Number of rows in the band
    pub rows: u32,
    /// Index of this batch in the render order
    pub index: usize,
}

impl RowBatch {
    pub fn new(first_row: u32, rows: u32, index: usize) -> Self {
        Self {
            first_row,
            rows,
            index,
        }
    }

    /// Row indices covered by this batch.
    pub fn row_range(&self) -> std::ops::Range<u32> {
        self.first_row..self.first_row + self.rows
    }
}

/// Split `height` rows into batches of `rows_per_flush`, bottom up.
///
/// The last batch is shorter when the height is not a multiple.
pub fn generate_batches(height: u32, rows_per_flush: u32) -> Vec<RowBatch> {
    let step = rows_per_flush.max(1);
    let mut batches = Vec::new();

    let mut y = 0;
    while y < height {
        let rows = step.min(height - y);
        batches.push(RowBatch::new(y, rows, batches.len()));
        y += rows;
    }

    batches
}

/// Render every unwritten pixel of `batch` into `image`.
///
/// Pixels already present in the buffer are kept as they are. Returns the
/// number of pixels rendered.
pub fn render_batch(
    batch: &RowBatch,
    image: &mut PixelBuffer,
    camera: &Camera,
    world: &dyn Hittable,
    config: &RenderConfig,
) -> Result<usize, RenderError> {
    let buffer: &PixelBuffer = image;
    let rows = batch
        .row_range()
        .into_par_iter()
        .map(|y| render_row(buffer, y, camera, world, config))
        .collect::<Result<Vec<_>, RenderError>>()?;

    let mut rendered = 0;
    for pixels in rows {
        rendered += pixels.len();
        for (x, y, color) in pixels {
            image.set(x, y, color);
        }
    }

    log::trace!(
        "Batch {} (rows {}..{}): {} pixels",
        batch.index,
        batch.first_row,
        batch.first_row + batch.rows,
        rendered
    );
    Ok(rendered)
}

fn render_row(
    image: &PixelBuffer,
    y: u32,
    camera: &Camera,
    world: &dyn Hittable,
    config: &RenderConfig,
) -> Result<Vec<(u32, u32, Color)>, RenderError> {
    (0..image.width())
        .filter(|&x| !image.is_written(x, y))
        .map(|x| Ok((x, y, render_pixel(camera, world, x, y, config)?)))
        .collect()
}
