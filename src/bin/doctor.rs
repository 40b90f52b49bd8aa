use anyhow::{bail, Result};
use clap::Parser;
use signcam::classifier::{SignCnn, Topology};
use signcam::cli::{init_logging, CameraArgs, DEFAULT_DATASET, DEFAULT_TOPOLOGY, DEFAULT_WEIGHTS};
use signcam::dataset::{Dataset, Partition};
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(author, version, about = "Check weights, camera and dataset before a demo", long_about = None)]
struct Args {
    #[command(flatten)]
    camera: CameraArgs,

    /// Trained classifier weights (safetensors)
    #[arg(short, long, default_value = DEFAULT_WEIGHTS)]
    weights: PathBuf,

    /// Companion topology description from the training run
    #[arg(short, long, default_value = DEFAULT_TOPOLOGY)]
    topology: PathBuf,

    /// Dataset root directory
    #[arg(short, long, default_value = DEFAULT_DATASET)]
    dataset: PathBuf,

    /// Skip the camera checks
    #[arg(long)]
    skip_camera: bool,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Ok,
    Warn,
    Fail,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Status::Ok => "ok",
            Status::Warn => "warn",
            Status::Fail => "FAIL",
        };
        write!(f, "{tag:>4}")
    }
}

#[derive(Default)]
struct Report {
    failures: usize,
    warnings: usize,
}

impl Report {
    fn record(&mut self, status: Status, check: &str, detail: impl fmt::Display) {
        match status {
            Status::Ok => {}
            Status::Warn => self.warnings += 1,
            Status::Fail => self.failures += 1,
        }
        println!("[{status}] {check:<12} {detail}");
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.debug);

    let mut report = Report::default();

    check_weights(&mut report, &args.weights);
    check_topology_file(&mut report, &args.topology);
    if args.skip_camera {
        report.record(Status::Warn, "camera", "skipped");
    } else {
        check_camera(&mut report, &args.camera);
    }
    check_dataset(&mut report, &args.dataset);

    println!();
    println!("{} failed, {} warnings", report.failures, report.warnings);

    if report.failures > 0 {
        bail!("{} checks failed", report.failures);
    }
    Ok(())
}

fn check_weights(report: &mut Report, path: &Path) {
    match SignCnn::load(path) {
        Ok(network) => {
            let topology = network.topology();
            report.record(
                Status::Ok,
                "weights",
                format_args!(
                    "{} loads, {} classes, {} parameters",
                    path.display(),
                    topology.classes,
                    topology.parameter_count()
                ),
            );
            print_summary(topology);
        }
        Err(e) => {
            report.record(Status::Fail, "weights", e);
            println!("       expected safetensors tensors, in Keras get_weights() order:");
            for line in Topology::sign_cnn().weights_layout() {
                println!("       {line}");
            }
        }
    }
}

fn print_summary(topology: &Topology) {
    println!("       {:<10} {:<16} {:>10}", "layer", "output", "params");
    for layer in topology.summary() {
        println!(
            "       {:<10} {:<16} {:>10}",
            layer.name,
            format!("{:?}", layer.output_shape),
            layer.parameters
        );
    }
}

/// The recognizer never reads this file; its absence only matters to retraining
fn check_topology_file(report: &mut Report, path: &Path) {
    if path.is_file() {
        report.record(Status::Ok, "topology", format_args!("{} present", path.display()));
    } else {
        report.record(
            Status::Warn,
            "topology",
            format_args!("{} not found (not needed for recognition)", path.display()),
        );
    }
}

fn check_camera(report: &mut Report, camera: &CameraArgs) {
    if camera.replay.is_none() {
        match nokhwa::query(nokhwa::utils::ApiBackend::Auto) {
            Ok(cameras) if cameras.is_empty() => {
                report.record(Status::Fail, "cameras", "no camera found")
            }
            Ok(cameras) => {
                let names = cameras
                    .iter()
                    .map(|cam| format!("{}: {}", cam.index(), cam.human_name()))
                    .collect::<Vec<_>>()
                    .join(", ");
                report.record(Status::Ok, "cameras", names);
            }
            Err(e) => report.record(Status::Warn, "cameras", format_args!("query failed: {e}")),
        }
    }

    let mut source = match camera.open() {
        Ok(source) => source,
        Err(e) => {
            report.record(Status::Fail, "frame", e);
            return;
        }
    };

    match source.capture_frame() {
        Ok(frame) => report.record(
            Status::Ok,
            "frame",
            format_args!("captured {}x{}", frame.width(), frame.height()),
        ),
        Err(e) => report.record(Status::Fail, "frame", e),
    }
    source.release();
}

fn check_dataset(report: &mut Report, root: &Path) {
    let dataset = Dataset::new(root);
    if !dataset.root().is_dir() {
        report.record(
            Status::Warn,
            "dataset",
            format_args!("{} missing (capture-dataset creates it)", root.display()),
        );
        return;
    }

    for partition in Partition::ALL {
        match dataset.census(partition) {
            Ok(census) => {
                let total: usize = census.iter().map(|(_, n)| n).sum();
                let empty = census.iter().filter(|(_, n)| *n == 0).count();
                let status = if empty > 0 { Status::Warn } else { Status::Ok };
                report.record(
                    status,
                    "dataset",
                    format_args!(
                        "{partition}: {total} samples, {empty} of {} classes empty",
                        census.len()
                    ),
                );
            }
            Err(e) => report.record(Status::Fail, "dataset", e),
        }
    }
}
