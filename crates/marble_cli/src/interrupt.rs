use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use log::warn;

/// Exit status of a process killed by SIGINT.
const INTERRUPTED_STATUS: i32 = 130;

/// Raise `stop` on Ctrl-C.
///
/// The session notices the flag between batches, flushes the checkpoint and
/// returns. A second Ctrl-C exits immediately; the last flush is kept.
pub fn install_interrupt_handler(stop: Arc<AtomicBool>) -> Result<()> {
    ctrlc::set_handler(move || {
        if request_stop(&stop) {
            warn!("Second interrupt, exiting without waiting for the batch");
            std::process::exit(INTERRUPTED_STATUS);
        }
        warn!("Interrupt received, stopping after the current batch");
    })
    .context("installing the Ctrl-C handler")
}

/// Raise `stop`, returning whether it was already raised.
fn request_stop(stop: &AtomicBool) -> bool {
    stop.swap(true, Ordering::SeqCst)
}
