use super::{OutputError, OutputSink, TickView};
use crate::keys::KeyPress;
use crate::labels::Mode;
use crate::ranking::{slot_text, CONSOLE_BUDGET};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Headless sink: logs the ranking whenever the leading label changes.
///
/// With no keyboard to read, a raised interrupt flag is reported as Escape.
pub struct ConsoleOutput {
    budget: usize,
    last: Option<(Mode, Option<&'static str>)>,
    interrupt: Arc<AtomicBool>,
}

impl Default for ConsoleOutput {
    fn default() -> Self {
        Self::new(CONSOLE_BUDGET)
    }
}

impl ConsoleOutput {
    pub fn new(budget: usize) -> Self {
        Self {
            budget,
            last: None,
            interrupt: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Quit once `interrupt` is raised, e.g. by a Ctrl-C handler
    pub fn with_interrupt(mut self, interrupt: Arc<AtomicBool>) -> Self {
        self.interrupt = interrupt;
        self
    }

    /// Lines describing one tick, top prediction first
    pub fn lines(&self, view: &TickView<'_>) -> Vec<String> {
        let mut lines = vec![view.mode.status_text().to_string()];
        if view.mode.is_active() {
            lines.extend((0..self.budget).map(|slot| slot_text(slot, view.predictions.get(slot))));
        }
        lines
    }
}

impl OutputSink for ConsoleOutput {
    fn present(&mut self, view: &TickView<'_>) -> Result<(), OutputError> {
        let key = (view.mode, view.predictions.first().map(|p| p.label));
        let lines = self.lines(view);

        if self.last != Some(key) {
            for line in &lines {
                tracing::info!("{}", line);
            }
            self.last = Some(key);
        } else {
            tracing::debug!("{}", lines.join(" | "));
        }

        Ok(())
    }

    fn poll_key(&mut self) -> Option<KeyPress> {
        self.interrupt
            .swap(false, Ordering::SeqCst)
            .then_some(KeyPress::Escape)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranking::Prediction;
    use crate::vision::Roi;
    use image::{GrayImage, RgbImage};

    #[test]
    fn pads_missing_slots() {
        let frame = RgbImage::new(64, 64);
        let sample = GrayImage::new(64, 64);
        let predictions = [Prediction {
            label: "Jeu",
            probability: 0.5,
        }];
        let view = TickView {
            frame: &frame,
            roi: Roi::for_frame(64, 64),
            sample: &sample,
            mode: Mode::Actions,
            predictions: &predictions,
        };

        let console = ConsoleOutput::default();
        assert_eq!(
            console.lines(&view),
            ["MODE: ACTIONS", "1. Jeu: 50.0%", "2. ---: 0.0%", "3. ---: 0.0%"]
        );
    }

    #[test]
    fn idle_prints_only_the_status() {
        let frame = RgbImage::new(64, 64);
        let sample = GrayImage::new(64, 64);
        let view = TickView {
            frame: &frame,
            roi: Roi::for_frame(64, 64),
            sample: &sample,
            mode: Mode::Idle,
            predictions: &[],
        };
        assert_eq!(ConsoleOutput::default().lines(&view), ["MODE: NONE"]);
    }

    #[test]
    fn interrupt_is_reported_as_escape_once() {
        let interrupt = Arc::new(AtomicBool::new(false));
        let mut console = ConsoleOutput::default().with_interrupt(Arc::clone(&interrupt));

        assert_eq!(console.poll_key(), None);
        interrupt.store(true, Ordering::SeqCst);
        assert_eq!(console.poll_key(), Some(KeyPress::Escape));
        assert_eq!(console.poll_key(), None);
    }
}
