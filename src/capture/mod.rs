mod replay;
mod webcam;

pub use replay::ReplayCapture;
pub use webcam::WebcamCapture;

use image::RgbImage;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CaptureError {
    /// The device or directory could not be opened at all
    #[error("failed to open frame source: {0}")]
    Open(String),

    /// One read failed; the next one may succeed
    #[error("failed to read frame: {0}")]
    Read(String),

    /// A finite source has no frames left
    #[error("frame source exhausted")]
    Exhausted,
}

/// Trait for frame sources
pub trait CaptureSource {
    /// Capture a single frame, blocking until one is available
    fn capture_frame(&mut self) -> Result<RgbImage, CaptureError>;

    /// Get the resolution of captured frames
    fn resolution(&self) -> (u32, u32);

    /// Give the device back. Calling this more than once does nothing.
    fn release(&mut self) {}
}

impl<T: CaptureSource + ?Sized> CaptureSource for Box<T> {
    fn capture_frame(&mut self) -> Result<RgbImage, CaptureError> {
        (**self).capture_frame()
    }

    fn resolution(&self) -> (u32, u32) {
        (**self).resolution()
    }

    fn release(&mut self) {
        (**self).release()
    }
}
