//! The recognizer's interaction loop.
//!
//! Each tick reads one frame, extracts and preprocesses the hand area,
//! classifies it when a mode is active, renders, then applies at most one
//! user command.

mod recovery;
mod state;

pub use recovery::{FailureCounter, DEFAULT_MAX_CONSECUTIVE_FAILURES};
pub use state::{AppState, Command, Transition};

use crate::capture::{CaptureError, CaptureSource};
use crate::classifier::{Classifier, InferenceError};
use crate::keys::recognizer_command;
use crate::labels::Mode;
use crate::output::{OutputError, OutputSink, TickView};
use crate::ranking::{rank, Prediction};
use crate::vision::{Preprocessor, Roi};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Frames between timing reports
const STATS_INTERVAL: u64 = 30;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("camera lost after {failures} consecutive failed reads")]
    CameraLost {
        failures: u32,
        #[source]
        source: CaptureError,
    },

    #[error(transparent)]
    Inference(#[from] InferenceError),

    #[error(transparent)]
    Output(#[from] OutputError),
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub initial_mode: Mode,
    /// Ranked entries kept per tick
    pub budget: usize,
    pub max_consecutive_failures: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            initial_mode: Mode::Idle,
            budget: crate::ranking::WINDOW_BUDGET,
            max_consecutive_failures: DEFAULT_MAX_CONSECUTIVE_FAILURES,
        }
    }
}

/// Counters reported when the loop ends
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub ticks: u64,
    pub frames: u64,
    pub skipped_frames: u64,
    pub classifications: u64,
}

#[derive(Debug, Default)]
struct Timings {
    capture: Duration,
    classify: Duration,
    render: Duration,
}

/// Owns the frame source, classifier, sink and loop state for one run
pub struct Session<C, M, O> {
    capture: C,
    classifier: M,
    output: O,
    preprocessor: Preprocessor,
    state: AppState,
    failures: FailureCounter,
    budget: usize,
    summary: SessionSummary,
    timings: Timings,
    released: bool,
}

impl<C, M, O> Session<C, M, O>
where
    C: CaptureSource,
    M: Classifier,
    O: OutputSink,
{
    pub fn new(capture: C, classifier: M, output: O, config: SessionConfig) -> Self {
        Self {
            capture,
            classifier,
            output,
            preprocessor: Preprocessor::default(),
            state: AppState::new(config.initial_mode),
            failures: FailureCounter::new(config.max_consecutive_failures),
            budget: config.budget,
            summary: SessionSummary::default(),
            timings: Timings::default(),
            released: false,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn summary(&self) -> &SessionSummary {
        &self.summary
    }

    /// Tick until a quit command, a closed display or the end of the source.
    ///
    /// Resources are released before returning, on success or error.
    pub fn run(&mut self) -> Result<SessionSummary, SessionError> {
        tracing::info!("Starting recognition loop in {} mode", self.state.mode());
        tracing::info!("Keys: 1 = digits, 2 = letters, 3 = actions, Esc = quit");

        let result = self.run_ticks();
        self.shutdown();

        let summary = self.summary.clone();
        tracing::info!(
            "Recognition loop ended: {} frames, {} skipped, {} classified",
            summary.frames,
            summary.skipped_frames,
            summary.classifications
        );
        result.map(|()| summary)
    }

    fn run_ticks(&mut self) -> Result<(), SessionError> {
        while self.state.is_running() {
            self.tick()?;
        }
        Ok(())
    }

    /// One pass of read → preprocess → classify → render → poll
    pub fn tick(&mut self) -> Result<(), SessionError> {
        if !self.state.is_running() {
            return Ok(());
        }
        self.summary.ticks += 1;

        let capture_start = Instant::now();
        let frame = match self.capture.capture_frame() {
            Ok(frame) => {
                self.failures.record_success();
                Some(frame)
            }
            Err(CaptureError::Exhausted) => {
                tracing::info!("Frame source exhausted");
                self.apply(Command::Quit);
                return Ok(());
            }
            Err(e) => {
                self.summary.skipped_frames += 1;
                if self.failures.record_failure() {
                    return Err(SessionError::CameraLost {
                        failures: self.failures.consecutive(),
                        source: e,
                    });
                }
                tracing::warn!("Skipping tick: {}", e);
                self.output.idle()?;
                None
            }
        };
        self.timings.capture += capture_start.elapsed();

        if let Some(frame) = frame {
            self.summary.frames += 1;
            self.process(&frame)?;
            self.report_timings();
        }

        if !self.output.is_open() {
            self.apply(Command::Quit);
        } else if let Some(command) = self.output.poll_key().and_then(recognizer_command) {
            self.apply(command);
        }

        Ok(())
    }

    fn process(&mut self, frame: &image::RgbImage) -> Result<(), SessionError> {
        let _span = tracing::debug_span!("tick", frame = self.summary.frames).entered();

        let (width, height) = frame.dimensions();
        let roi = Roi::for_frame(width, height);
        let binary = self.preprocessor.binarize(&roi.extract(frame));

        let mode = self.state.mode();
        let predictions: Vec<Prediction> = if mode.is_active() {
            let classify_start = Instant::now();
            let sample = Preprocessor::normalize(&binary);
            let probabilities = self.classifier.classify(&sample)?;
            self.summary.classifications += 1;
            self.timings.classify += classify_start.elapsed();
            rank(mode, &probabilities, self.budget)
        } else {
            Vec::new()
        };

        let render_start = Instant::now();
        self.output.present(&TickView {
            frame,
            roi,
            sample: &binary,
            mode,
            predictions: &predictions,
        })?;
        self.timings.render += render_start.elapsed();

        Ok(())
    }

    /// Apply a user command, releasing resources when it stops the loop
    pub fn apply(&mut self, command: Command) -> Transition {
        let transition = self.state.apply(command);
        match transition {
            Transition::ModeChanged { from, to } => {
                tracing::info!("Mode {} -> {}", from, to);
            }
            Transition::ModeRefreshed(mode) => {
                tracing::info!("Mode {} reselected", mode);
            }
            Transition::Stopped => {
                tracing::info!("Quit requested");
                self.shutdown();
            }
            Transition::Ignored => {}
        }
        transition
    }

    fn shutdown(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.capture.release();
        self.output.close();
    }

    fn report_timings(&self) {
        let frames = self.summary.frames;
        if frames % STATS_INTERVAL != 0 {
            return;
        }

        let per_frame = |total: Duration| total.as_secs_f64() * 1000.0 / frames as f64;
        let capture_ms = per_frame(self.timings.capture);
        let classify_ms = per_frame(self.timings.classify);
        let render_ms = per_frame(self.timings.render);
        let total_ms = capture_ms + classify_ms + render_ms;

        tracing::info!(
            "Frame {}: capture={:.1}ms, classify={:.1}ms, render={:.1}ms, total={:.1}ms, fps={:.1}",
            frames,
            capture_ms,
            classify_ms,
            render_ms,
            total_ms,
            1000.0 / total_ms
        );
    }
}
