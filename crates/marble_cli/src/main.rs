use std::fs::{self, File};
use std::io::BufWriter;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info};
use marble_core::{demo_scene, random_scene, SceneDescription};
use marble_renderer::{CheckpointStore, PixelBuffer, RenderOutcome, RenderSession};
use rand::rngs::StdRng;
use rand::SeedableRng;

mod cli;
mod interrupt;
mod logger;

use cli::{Args, SceneKind};
use interrupt::install_interrupt_handler;
use logger::init_logger;

fn main() -> Result<()> {
    let args = Args::parse();
    init_logger(args.debug_level.clone().into());

    let camera = args.camera_settings().build()?;
    let config = args.render_config();

    fs::create_dir_all(&args.checkpoint_dir).with_context(|| {
        format!("creating checkpoint directory {}", args.checkpoint_dir.display())
    })?;
    let store = CheckpointStore::new(&args.checkpoint_dir, &args.name);
    if args.fresh {
        store.discard()?;
    }

    // Loaded up front so a bad file fails before any checkpoint is touched
    let scene_from_file = match &args.scene_file {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("reading scene file {}", path.display()))?;
            Some(SceneDescription::from_json(&json)?)
        }
        None => None,
    };
    let make_scene = || match scene_from_file {
        Some(scene) => scene,
        None => match args.scene {
            SceneKind::Random => random_scene(&mut StdRng::seed_from_u64(args.scene_seed)),
            SceneKind::Demo => demo_scene(),
        },
    };

    let mut session = match RenderSession::start_or_resume(store, camera, config, make_scene) {
        Ok(session) => session,
        Err(err) if err.is_recoverable_checkpoint() => {
            error!("Cannot resume: {err}");
            error!("Rerun with --fresh to discard the checkpoint and start over");
            return Err(err.into());
        }
        Err(err) => return Err(err.into()),
    };

    let stop = Arc::new(AtomicBool::new(false));
    install_interrupt_handler(Arc::clone(&stop))?;

    let mut rows_this_run = 0;
    let outcome = session.run_with(&stop, |batch, image| {
        rows_this_run += batch.rows;
        info!("{}/{} rows", image.complete_rows(), image.height());
        if args.stop_after_rows.is_some_and(|limit| rows_this_run >= limit) {
            stop.store(true, Ordering::SeqCst);
        }
    })?;

    match outcome {
        RenderOutcome::Complete(image) => {
            save_image(&image, &args)?;
            info!("Saved {}", args.output.display());
        }
        RenderOutcome::Interrupted { rows_done } => {
            info!(
                "Stopped after {} rows; run again to resume from {}",
                rows_done,
                session.store().pixels_path().display()
            );
        }
    }

    Ok(())
}

fn save_image(image: &PixelBuffer, args: &Args) -> Result<()> {
    let is_ppm = args
        .output
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("ppm"));

    if is_ppm {
        let file = File::create(&args.output)
            .with_context(|| format!("creating {}", args.output.display()))?;
        image.write_ppm(BufWriter::new(file))?;
    } else {
        image
            .save_png(&args.output)
            .with_context(|| format!("writing {}", args.output.display()))?;
    }
    Ok(())
}
