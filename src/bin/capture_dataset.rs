use anyhow::{bail, Context, Result};
use clap::Parser;
use signcam::capture::{CaptureError, CaptureSource};
use signcam::cli::{init_logging, CameraArgs, DEFAULT_DATASET};
use signcam::dataset::{Dataset, Partition};
use signcam::keys::{capture_action, CaptureAction};
use signcam::output::overlay::{compose_capture, CaptureView};
use signcam::output::{OutputSink, WindowOutput};
use signcam::session::{FailureCounter, DEFAULT_MAX_CONSECUTIVE_FAILURES};
use signcam::vision::{Preprocessor, Roi};
use std::path::PathBuf;

/// Classes whose counters stay on screen
const HEADLINE_CLASSES: [&str; 5] = ["0", "1", "2", "A", "B"];

#[derive(Parser, Debug)]
#[command(author, version, about = "Record labeled hand-sign samples from the webcam", long_about = None)]
struct Args {
    #[command(flatten)]
    camera: CameraArgs,

    /// Dataset root directory
    #[arg(short, long, default_value = DEFAULT_DATASET)]
    dataset: PathBuf,

    /// Partition new samples are saved into
    #[arg(short, long, value_enum, default_value_t = Partition::Train)]
    partition: Partition,

    /// Consecutive failed frame reads tolerated before giving up
    #[arg(long, default_value_t = DEFAULT_MAX_CONSECUTIVE_FAILURES)]
    max_failures: u32,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.debug);

    tracing::info!("Dataset capture starting");
    tracing::info!("Dataset: {}, partition: {}", args.dataset.display(), args.partition);

    let dataset = Dataset::new(&args.dataset);
    dataset
        .ensure_layout()
        .context("Failed to create dataset directories")?;

    let mut capture = args.camera.open().context(
        "Failed to initialize frame source (check that the webcam is connected and not used by another application)",
    )?;

    let mut window =
        WindowOutput::new("Dataset capture").context("Failed to open display window")?;

    tracing::info!("Keys: 0-9 / A-Z save into that class, * + - save an action, Esc quits");

    let result = capture_loop(&mut capture, &mut window, &dataset, &args);

    capture.release();
    window.close();

    let saved = result?;
    tracing::info!("Dataset capture finished, {} samples saved", saved);
    Ok(())
}

/// # Returns
/// Number of samples saved
fn capture_loop(
    capture: &mut dyn CaptureSource,
    window: &mut WindowOutput,
    dataset: &Dataset,
    args: &Args,
) -> Result<u64> {
    let preprocessor = Preprocessor::default();
    let mut failures = FailureCounter::new(args.max_failures);
    let mut saved = 0u64;
    let mut last_saved: Option<String> = None;

    while window.is_open() {
        let frame = match capture.capture_frame() {
            Ok(frame) => {
                failures.record_success();
                frame
            }
            Err(CaptureError::Exhausted) => {
                tracing::info!("Frame source exhausted");
                break;
            }
            Err(e) => {
                if failures.record_failure() {
                    bail!(
                        "camera lost after {} consecutive failed reads: {}",
                        failures.consecutive(),
                        e
                    );
                }
                tracing::warn!("Skipping frame: {}", e);
                window.pump();
                if window.take_key().and_then(capture_action) == Some(CaptureAction::Quit) {
                    break;
                }
                continue;
            }
        };

        let (width, height) = frame.dimensions();
        let roi = Roi::for_frame(width, height);
        let sample = preprocessor.binarize(&roi.extract(&frame));

        let counts = HEADLINE_CLASSES
            .iter()
            .map(|&class| dataset.count(args.partition, class).map(|n| (class, n)))
            .collect::<Result<Vec<_>, _>>()?;

        let canvas = compose_capture(window.typeface(), &CaptureView {
            frame: &frame,
            roi,
            sample: &sample,
            partition: args.partition,
            counts: &counts,
            last_saved: last_saved.as_deref(),
        });
        window.show_canvas(&canvas)?;

        match window.take_key().and_then(capture_action) {
            Some(CaptureAction::Quit) => {
                tracing::info!("Stopping capture");
                break;
            }
            Some(CaptureAction::Save(class)) => {
                let path = dataset.save_sample(args.partition, class, &sample)?;
                let total = dataset.count(args.partition, class)?;
                tracing::info!("Saved {} ({} images in {})", path.display(), total, class);
                last_saved = path
                    .strip_prefix(dataset.root())
                    .ok()
                    .map(|p| p.display().to_string());
                saved += 1;
            }
            None => {}
        }
    }

    Ok(saved)
}
