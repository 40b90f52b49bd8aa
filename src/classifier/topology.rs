use crate::labels::TRAINED_CLASSES;
use crate::vision::SAMPLE_SIZE;

/// Shape of the sign classifier network.
///
/// Two 3×3 convolution + 2×2 max-pool blocks, a flatten, one hidden dense
/// layer and a softmax output layer. Convolutions use no padding and stride 1.
/// Weights trained for one topology never load into another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Topology {
    pub input_size: usize,
    pub input_channels: usize,
    pub filters: usize,
    pub kernel: usize,
    pub pool: usize,
    pub hidden: usize,
    pub classes: usize,
}

/// One row of [`Topology::summary`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerSummary {
    pub name: &'static str,
    pub output_shape: Vec<usize>,
    pub parameters: usize,
}

impl Topology {
    /// The network the demo and the training run agree on
    pub const fn sign_cnn() -> Self {
        Self {
            input_size: SAMPLE_SIZE as usize,
            input_channels: 1,
            filters: 32,
            kernel: 3,
            pool: 2,
            hidden: 128,
            classes: TRAINED_CLASSES,
        }
    }

    fn conv_out(&self, size: usize) -> usize {
        size + 1 - self.kernel
    }

    fn pool_out(&self, size: usize) -> usize {
        size / self.pool
    }

    /// Spatial side length after both convolution blocks
    pub fn feature_size(&self) -> usize {
        let block1 = self.pool_out(self.conv_out(self.input_size));
        self.pool_out(self.conv_out(block1))
    }

    /// Width of the flattened feature vector fed to the hidden layer
    pub fn flatten_len(&self) -> usize {
        self.feature_size() * self.feature_size() * self.filters
    }

    /// Every named parameter tensor and the shape this topology expects.
    ///
    /// Convolution kernels are height × width × in × out, dense kernels in ×
    /// out.
    pub fn parameter_shapes(&self) -> [(&'static str, Vec<usize>); 8] {
        let k = self.kernel;
        [
            ("conv1.kernel", vec![k, k, self.input_channels, self.filters]),
            ("conv1.bias", vec![self.filters]),
            ("conv2.kernel", vec![k, k, self.filters, self.filters]),
            ("conv2.bias", vec![self.filters]),
            ("dense1.kernel", vec![self.flatten_len(), self.hidden]),
            ("dense1.bias", vec![self.hidden]),
            ("dense2.kernel", vec![self.hidden, self.classes]),
            ("dense2.bias", vec![self.classes]),
        ]
    }

    pub fn parameter_count(&self) -> usize {
        self.parameter_shapes()
            .iter()
            .map(|(_, shape)| shape.iter().product::<usize>())
            .sum()
    }

    /// Human-readable description of the weights archive this topology loads.
    ///
    /// One line per tensor, in the order Keras `model.get_weights()` returns
    /// them for the same network, so an exported list maps onto these names
    /// one to one.
    pub fn weights_layout(&self) -> Vec<String> {
        self.parameter_shapes()
            .into_iter()
            .map(|(name, shape)| {
                let layout = match (name.ends_with(".kernel"), shape.len()) {
                    (true, 4) => "height x width x in x out",
                    (true, _) => "in x out",
                    (false, _) => "out",
                };
                format!("{name:<14} f32 {shape:?} ({layout})")
            })
            .collect()
    }

    /// Layer-by-layer output shapes and parameter counts
    pub fn summary(&self) -> Vec<LayerSummary> {
        let k = self.kernel;
        let conv1 = self.conv_out(self.input_size);
        let pool1 = self.pool_out(conv1);
        let conv2 = self.conv_out(pool1);
        let pool2 = self.pool_out(conv2);

        vec![
            LayerSummary {
                name: "conv1",
                output_shape: vec![conv1, conv1, self.filters],
                parameters: k * k * self.input_channels * self.filters + self.filters,
            },
            LayerSummary {
                name: "pool1",
                output_shape: vec![pool1, pool1, self.filters],
                parameters: 0,
            },
            LayerSummary {
                name: "conv2",
                output_shape: vec![conv2, conv2, self.filters],
                parameters: k * k * self.filters * self.filters + self.filters,
            },
            LayerSummary {
                name: "pool2",
                output_shape: vec![pool2, pool2, self.filters],
                parameters: 0,
            },
            LayerSummary {
                name: "flatten",
                output_shape: vec![self.flatten_len()],
                parameters: 0,
            },
            LayerSummary {
                name: "dense1",
                output_shape: vec![self.hidden],
                parameters: self.flatten_len() * self.hidden + self.hidden,
            },
            LayerSummary {
                name: "dense2",
                output_shape: vec![self.classes],
                parameters: self.hidden * self.classes + self.classes,
            },
        ]
    }
}

impl Default for Topology {
    fn default() -> Self {
        Self::sign_cnn()
    }
}
