//! Arguments and logging setup shared by the binaries.

use crate::capture::{CaptureError, CaptureSource, ReplayCapture, WebcamCapture};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Default trained weights archive
pub const DEFAULT_WEIGHTS: &str = "model-bw.safetensors";

/// Default companion topology description written by the training run
pub const DEFAULT_TOPOLOGY: &str = "model-bw.json";

/// Default dataset root
pub const DEFAULT_DATASET: &str = "DataSet";

#[derive(clap::Args, Debug, Clone)]
pub struct CameraArgs {
    /// Input webcam device index
    #[arg(short, long, default_value_t = 0)]
    pub input_device: u32,

    /// Show frames as captured instead of mirrored
    #[arg(long)]
    pub no_mirror: bool,

    /// Replay still images from this directory instead of using the webcam
    #[arg(long)]
    pub replay: Option<PathBuf>,
}

impl CameraArgs {
    /// Open the webcam, or the replay directory when one was given
    pub fn open(&self) -> Result<Box<dyn CaptureSource>, CaptureError> {
        let mirror = !self.no_mirror;
        match &self.replay {
            Some(dir) => Ok(Box::new(ReplayCapture::open(dir, mirror)?)),
            None => Ok(Box::new(WebcamCapture::new(self.input_device, mirror)?)),
        }
    }
}

/// Install the fmt subscriber; DEBUG with `debug`, INFO otherwise
pub fn init_logging(debug: bool) {
    let log_level = if debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();
}

/// Route Ctrl-C into a flag the loop polls, so the process unwinds through
/// its normal shutdown instead of being killed mid-tick
pub fn install_interrupt_handler() -> Result<Arc<AtomicBool>, ctrlc::Error> {
    let interrupted = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&interrupted);
    ctrlc::set_handler(move || {
        tracing::info!("Interrupt received, stopping");
        flag.store(true, Ordering::SeqCst);
    })?;
    Ok(interrupted)
}
