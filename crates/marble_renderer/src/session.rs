//! Resumable render sessions.
//!
//! A session renders the image batch by batch and flushes the pixel buffer
//! to its [`CheckpointStore`] after every batch. Restarting with the same
//! store and settings picks up where the last flush left off and produces
//! the same image an uninterrupted run would.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use marble_core::SceneDescription;

use crate::{
    generate_batches, render_batch, Camera, CheckpointError, CheckpointStore, PixelBuffer,
    RenderConfig, RenderError, RowBatch, World,
};

/// How a call to [`RenderSession::run`] ended.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderOutcome {
    /// Every pixel is rendered and the checkpoint files are gone.
    Complete(PixelBuffer),
    /// Stopped between batches; the checkpoint holds `rows_done` full rows.
    Interrupted { rows_done: u32 },
}

/// A render backed by checkpoint files.
pub struct RenderSession {
    world: World,
    scene: SceneDescription,
    camera: Camera,
    config: RenderConfig,
    image: PixelBuffer,
    store: CheckpointStore,
    resumed: bool,
}

impl RenderSession {
    /// Resume from `store` when it holds a checkpoint, or start a new
    /// render of the scene `make_scene` builds.
    ///
    /// A saved pixel buffer must match the camera settings and the
    /// sampling settings of `config`.
    pub fn start_or_resume<F>(
        store: CheckpointStore,
        camera: Camera,
        config: RenderConfig,
        make_scene: F,
    ) -> Result<Self, RenderError>
    where
        F: FnOnce() -> SceneDescription,
    {
        config.validate()?;

        let (scene, image, resumed) = match (store.has_scene(), store.has_pixels()) {
            (true, true) => {
                let scene = store.load_scene()?;
                let image = store.load_pixels(camera.settings(), &config)?;
                log::info!(
                    "Resuming from {}: {}/{} rows done",
                    store.pixels_path().display(),
                    image.complete_rows(),
                    image.height()
                );
                (scene, image, true)
            }
            (false, true) => {
                return Err(CheckpointError::Corrupt(format!(
                    "{} exists without {}",
                    store.pixels_path().display(),
                    store.scene_path().display()
                ))
                .into());
            }
            _ => {
                let scene = make_scene();
                scene.validate()?;
                store.save_scene(&scene)?;
                log::info!(
                    "Starting new render, scene saved to {}",
                    store.scene_path().display()
                );
                let image = PixelBuffer::new(camera.image_width, camera.image_height);
                (scene, image, false)
            }
        };

        let world = World::from_description(&scene)?;
        log::debug!("World has {} primitives", world.len());

        Ok(Self {
            world,
            scene,
            camera,
            config,
            image,
            store,
            resumed,
        })
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn scene(&self) -> &SceneDescription {
        &self.scene
    }

    pub fn store(&self) -> &CheckpointStore {
        &self.store
    }

    /// Pixels rendered so far.
    pub fn image(&self) -> &PixelBuffer {
        &self.image
    }

    /// True when this session was loaded from a checkpoint.
    pub fn is_resumed(&self) -> bool {
        self.resumed
    }

    /// Number of fully rendered rows.
    pub fn rows_done(&self) -> u32 {
        self.image.complete_rows()
    }

    /// Render until the image is complete or `stop` is raised.
    pub fn run(&mut self, stop: &AtomicBool) -> Result<RenderOutcome, RenderError> {
        self.run_with(stop, |_, _| {})
    }

    /// Like [`run`](Self::run), calling `on_batch` after each batch has
    /// been rendered and flushed.
    pub fn run_with<F>(
        &mut self,
        stop: &AtomicBool,
        mut on_batch: F,
    ) -> Result<RenderOutcome, RenderError>
    where
        F: FnMut(&RowBatch, &PixelBuffer),
    {
        let start = Instant::now();
        let batches = generate_batches(self.camera.image_height, self.config.rows_per_flush);
        log::info!(
            "Rendering {}x{} @ {} spp, depth {}, {} batches",
            self.camera.image_width,
            self.camera.image_height,
            self.config.samples_per_pixel,
            self.config.max_depth,
            batches.len()
        );

        for batch in &batches {
            if batch.row_range().all(|y| self.image.row_complete(y)) {
                continue;
            }

            if stop.load(Ordering::SeqCst) {
                self.store
                .save_pixels(&self.image, self.camera.settings(), &self.config)?;
                let rows_done = self.image.complete_rows();
                log::warn!(
                    "Render interrupted with {}/{} rows done, checkpoint at {}",
                    rows_done,
                    self.image.height(),
                    self.store.pixels_path().display()
                );
                return Ok(RenderOutcome::Interrupted { rows_done });
            }

            let rendered = render_batch(
                batch,
                &mut self.image,
                &self.camera,
                &self.world,
                &self.config,
            )?;
            self.store
                .save_pixels(&self.image, self.camera.settings(), &self.config)?;
            log::debug!(
                "Batch {}/{}: {} pixels, flushed",
                batch.index + 1,
                batches.len(),
                rendered
            );

            on_batch(batch, &self.image);
        }

        if let Err(err) = self.store.discard() {
            log::warn!("Could not remove checkpoint files: {err}");
        }
        log::info!("Render complete in {:.2?}", start.elapsed());

        Ok(RenderOutcome::Complete(self.image.clone()))
    }
}
