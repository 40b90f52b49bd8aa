mod cnn;
mod topology;
mod weights;

pub use cnn::SignCnn;
pub use topology::{LayerSummary, Topology};
pub use weights::{LoadError, Weights};

use crate::vision::Sample;
use thiserror::Error;

/// Per-class confidences, non-negative and summing to ~1
pub type Probabilities = Vec<f32>;

#[derive(Error, Debug)]
pub enum InferenceError {
    #[error("sample is {actual:?}, classifier expects {expected:?}")]
    InputShape {
        expected: (usize, usize),
        actual: (usize, usize),
    },
}

/// Trait for gesture classifiers
/// Lets the session run against the trained network or a test double
pub trait Classifier {
    /// Map one processed sample to a probability per trained class
    fn classify(&self, sample: &Sample) -> Result<Probabilities, InferenceError>;

    /// Length of every vector returned by [`classify`](Self::classify)
    fn class_count(&self) -> usize;
}
