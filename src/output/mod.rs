mod console;
pub mod font;
pub mod overlay;
mod window;

pub use console::ConsoleOutput;
pub use window::WindowOutput;

use crate::keys::KeyPress;
use crate::labels::Mode;
use crate::ranking::Prediction;
use crate::vision::Roi;
use image::{GrayImage, RgbImage};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("window error: {0}")]
    Window(String),

    #[error("font error: {0}")]
    Font(String),
}

/// Everything rendered for one tick of the recognizer
pub struct TickView<'a> {
    pub frame: &'a RgbImage,
    pub roi: Roi,
    /// Binarized classifier input, for display
    pub sample: &'a GrayImage,
    pub mode: Mode,
    /// Ranked labels of the active mode; empty when idle
    pub predictions: &'a [Prediction],
}

/// Trait for presentation destinations
pub trait OutputSink {
    /// Render one tick
    fn present(&mut self, view: &TickView<'_>) -> Result<(), OutputError>;

    /// Take at most one pending key press
    fn poll_key(&mut self) -> Option<KeyPress> {
        None
    }

    /// Keep the display responsive on a tick with nothing to render
    fn idle(&mut self) -> Result<(), OutputError> {
        Ok(())
    }

    /// False once the user closed the display
    fn is_open(&self) -> bool {
        true
    }

    /// Tear the display down. Calling this more than once does nothing.
    fn close(&mut self) {}
}

impl<T: OutputSink + ?Sized> OutputSink for Box<T> {
    fn present(&mut self, view: &TickView<'_>) -> Result<(), OutputError> {
        (**self).present(view)
    }

    fn poll_key(&mut self) -> Option<KeyPress> {
        (**self).poll_key()
    }

    fn idle(&mut self) -> Result<(), OutputError> {
        (**self).idle()
    }

    fn is_open(&self) -> bool {
        (**self).is_open()
    }

    fn close(&mut self) {
        (**self).close()
    }
}
