use super::topology::Topology;
use super::weights::{LoadError, Weights};
use super::{Classifier, InferenceError, Probabilities};
use crate::vision::Sample;
use ndarray::{s, Array1, Array2, Array3, Array4, ArrayView3, Axis};
use std::path::Path;

/// The sign classifier: a fixed [`Topology`] with its trained [`Weights`].
///
/// Inference borrows the network immutably, so weights never change after
/// loading.
pub struct SignCnn {
    topology: Topology,
    weights: Weights,
}

impl SignCnn {
    /// Build the declared network and attach weights from `weights_path`.
    ///
    /// Fails if the file is absent, unreadable or shaped for another network.
    pub fn load<P: AsRef<Path>>(weights_path: P) -> Result<Self, LoadError> {
        let topology = Topology::sign_cnn();
        let weights = Weights::load(weights_path, &topology)?;

        tracing::info!(
            "Sign classifier ready: {} layers, {} parameters, {} classes",
            topology.summary().len(),
            topology.parameter_count(),
            topology.classes
        );

        Ok(Self { topology, weights })
    }

    /// Pair already-checked weights with their topology
    pub fn new(topology: Topology, weights: Weights) -> Self {
        Self { topology, weights }
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    fn forward(&self, sample: &Sample) -> Array1<f32> {
        let w = &self.weights;
        let pool = self.topology.pool;

        let input = sample.view().insert_axis(Axis(2));

        let x = conv2d_relu(input, &w.conv1_kernel, &w.conv1_bias);
        let x = max_pool(x.view(), pool);
        let x = conv2d_relu(x.view(), &w.conv2_kernel, &w.conv2_bias);
        let x = max_pool(x.view(), pool);

        // Row-major (row, col, channel) flatten, the exporter's order
        let flat = Array1::from_iter(x.iter().copied());

        let hidden = dense(&flat, &w.dense1_kernel, &w.dense1_bias).mapv(relu);
        let logits = dense(&hidden, &w.dense2_kernel, &w.dense2_bias);
        softmax(logits)
    }
}

impl Classifier for SignCnn {
    fn classify(&self, sample: &Sample) -> Result<Probabilities, InferenceError> {
        let _span = tracing::debug_span!("classify").entered();

        let side = self.topology.input_size;
        if sample.dim() != (side, side) {
            return Err(InferenceError::InputShape {
                expected: (side, side),
                actual: sample.dim(),
            });
        }

        Ok(self.forward(sample).to_vec())
    }

    fn class_count(&self) -> usize {
        self.topology.classes
    }
}

fn relu(v: f32) -> f32 {
    v.max(0.0)
}

/// Valid (unpadded) stride-1 convolution followed by ReLU.
///
/// `input` is rows × cols × in, `kernel` is kh × kw × in × out.
fn conv2d_relu(input: ArrayView3<f32>, kernel: &Array4<f32>, bias: &Array1<f32>) -> Array3<f32> {
    let (rows, cols, _) = input.dim();
    let (kh, kw, _, out_channels) = kernel.dim();
    let out_rows = rows + 1 - kh;
    let out_cols = cols + 1 - kw;

    let mut output = Array3::<f32>::zeros((out_rows, out_cols, out_channels));

    for y in 0..out_rows {
        for x in 0..out_cols {
            let mut acc = bias.clone();
            for ky in 0..kh {
                for kx in 0..kw {
                    let pixel = input.slice(s![y + ky, x + kx, ..]);
                    let taps = kernel.slice(s![ky, kx, .., ..]);
                    acc += &pixel.dot(&taps);
                }
            }
            output
                .slice_mut(s![y, x, ..])
                .assign(&acc.mapv(relu));
        }
    }

    output
}

/// Non-overlapping max pooling; trailing rows/cols that do not fill a window are dropped
fn max_pool(input: ArrayView3<f32>, size: usize) -> Array3<f32> {
    let (rows, cols, channels) = input.dim();
    let out_rows = rows / size;
    let out_cols = cols / size;

    Array3::from_shape_fn((out_rows, out_cols, channels), |(y, x, c)| {
        input
            .slice(s![y * size..(y + 1) * size, x * size..(x + 1) * size, c])
            .fold(f32::NEG_INFINITY, |m, &v| m.max(v))
    })
}

fn dense(input: &Array1<f32>, kernel: &Array2<f32>, bias: &Array1<f32>) -> Array1<f32> {
    input.dot(kernel) + bias
}

fn softmax(logits: Array1<f32>) -> Array1<f32> {
    let max = logits.fold(f32::NEG_INFINITY, |m, &v| m.max(v));
    let exp = logits.mapv(|v| (v - max).exp());
    let sum = exp.sum();
    exp / sum
}

#[cfg(test)]
mod tests {
    use super::super::weights::testing::uniform_archive;
    use super::*;
    use ndarray::array;

    fn network(fill: f32) -> SignCnn {
        let topology = Topology::sign_cnn();
        let weights =
            Weights::from_bytes(&uniform_archive(&topology, fill), &topology).expect("weights");
        SignCnn::new(topology, weights)
    }

    fn checkerboard() -> Sample {
        Sample::from_shape_fn((64, 64), |(r, c)| ((r / 4 + c / 4) % 2) as f32)
    }

    #[test]
    fn probabilities_have_class_count_and_sum_to_one() {
        let cnn = network(0.01);
        let probs = cnn.classify(&checkerboard()).expect("classify");
        assert_eq!(probs.len(), cnn.class_count());
        assert!(probs.iter().all(|&p| p >= 0.0));
        let total: f32 = probs.iter().sum();
        assert!((total - 1.0).abs() < 1e-4, "sum was {total}");
    }

    #[test]
    fn zero_weights_give_uniform_output() {
        let cnn = network(0.0);
        let probs = cnn.classify(&checkerboard()).expect("classify");
        let uniform = 1.0 / 29.0;
        assert!(probs.iter().all(|&p| (p - uniform).abs() < 1e-6));
    }

    #[test]
    fn inference_is_repeatable() {
        let cnn = network(0.02);
        let a = cnn.classify(&checkerboard()).expect("classify");
        let b = cnn.classify(&checkerboard()).expect("classify");
        assert_eq!(a, b);
    }

    #[test]
    fn wrong_input_size_is_rejected() {
        let cnn = network(0.0);
        let err = cnn.classify(&Sample::zeros((32, 64))).unwrap_err();
        assert!(matches!(
            err,
            InferenceError::InputShape {
                expected: (64, 64),
                actual: (32, 64)
            }
        ));
    }

    #[test]
    fn conv_and_pool_shapes() {
        let input = Array3::<f32>::ones((6, 6, 1));
        let kernel = Array4::<f32>::ones((3, 3, 1, 2));
        let bias = array![0.0, -10.0];
        let out = conv2d_relu(input.view(), &kernel, &bias);
        assert_eq!(out.dim(), (4, 4, 2));
        assert_eq!(out[[0, 0, 0]], 9.0);
        // 9 - 10 clipped by relu
        assert_eq!(out[[0, 0, 1]], 0.0);

        let pooled = max_pool(out.view(), 2);
        assert_eq!(pooled.dim(), (2, 2, 2));

        let odd = max_pool(Array3::<f32>::ones((5, 5, 1)).view(), 2);
        assert_eq!(odd.dim(), (2, 2, 1));
    }

    #[test]
    fn softmax_is_stable_for_large_logits() {
        let out = softmax(array![1000.0, 1000.0]);
        assert!((out[0] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn load_fails_before_any_inference_on_mismatch() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("model-bw.safetensors");
        let other = Topology {
            hidden: 64,
            ..Topology::sign_cnn()
        };
        std::fs::write(&path, uniform_archive(&other, 0.0)).expect("write");

        let err = SignCnn::load(&path).err().expect("mismatch must fail");
        assert!(matches!(err, LoadError::ShapeMismatch { name: "dense1.kernel", .. }));
    }
}
