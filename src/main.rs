use anyhow::{Context, Result};
use clap::Parser;
use signcam::classifier::{SignCnn, Topology};
use signcam::cli::{init_logging, install_interrupt_handler, CameraArgs, DEFAULT_WEIGHTS};
use signcam::labels::Mode;
use signcam::output::{ConsoleOutput, OutputSink, WindowOutput};
use signcam::ranking::{CONSOLE_BUDGET, WINDOW_BUDGET};
use signcam::session::{Session, SessionConfig, DEFAULT_MAX_CONSECUTIVE_FAILURES};
use std::path::PathBuf;

#[derive(clap::ValueEnum, Debug, Clone, Copy)]
enum StartMode {
    Idle,
    Digits,
    Letters,
    Actions,
}

impl From<StartMode> for Mode {
    fn from(mode: StartMode) -> Self {
        match mode {
            StartMode::Idle => Mode::Idle,
            StartMode::Digits => Mode::Digits,
            StartMode::Letters => Mode::Letters,
            StartMode::Actions => Mode::Actions,
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Live sign-language recognition", long_about = None)]
struct Args {
    #[command(flatten)]
    camera: CameraArgs,

    /// Trained classifier weights (safetensors)
    #[arg(short, long, default_value = DEFAULT_WEIGHTS)]
    weights: PathBuf,

    /// Mode active at startup
    #[arg(long, value_enum, default_value_t = StartMode::Idle)]
    mode: StartMode,

    /// Log predictions to the console instead of opening a window
    #[arg(long)]
    headless: bool,

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

    tracing::info!("Sign recognition starting");

    // Load the model before touching the camera so a bad model never opens it
    let classifier = SignCnn::load(&args.weights).with_context(|| {
        format!(
            "Failed to load classifier weights from {}\n\
             Expected a safetensors archive of f32 tensors:\n  {}\n\
             Convert a trained Keras model by saving model.get_weights() under these names in this order",
            args.weights.display(),
            Topology::sign_cnn().weights_layout().join("\n  ")
        )
    })?;

    let capture = args.camera.open().context(
        "Failed to initialize frame source (check that the webcam is connected and not used by another application)",
    )?;

    let (output, budget): (Box<dyn OutputSink>, usize) = if args.headless {
        tracing::info!("Running headless, predictions go to the log; Ctrl-C quits");
        let interrupt =
            install_interrupt_handler().context("Failed to install the Ctrl-C handler")?;
        let console = ConsoleOutput::new(CONSOLE_BUDGET).with_interrupt(interrupt);
        (Box::new(console), CONSOLE_BUDGET)
    } else {
        let window = WindowOutput::new("Sign language recognition")
            .context("Failed to open display window")?;
        (Box::new(window), WINDOW_BUDGET)
    };

    let config = SessionConfig {
        initial_mode: args.mode.into(),
        budget,
        max_consecutive_failures: args.max_failures,
    };

    let mut session = Session::new(capture, classifier, output, config);
    session.run().context("Recognition loop failed")?;

    tracing::info!("Sign recognition finished");
    Ok(())
}
