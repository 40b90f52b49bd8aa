use super::topology::Topology;
use ndarray::{Array, Array1, Array2, Array4, Dimension, IxDyn};
use safetensors::{Dtype, SafeTensors};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Why a weights archive could not be attached to the declared topology
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("weights file {} not found", .0.display())]
    Missing(PathBuf),

    #[error("failed to read weights file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed weights archive: {0}")]
    Malformed(String),

    /// Trained weights and declared network disagree, e.g. a different class count
    #[error("tensor {name} has shape {actual:?} but the network declares {expected:?}")]
    ShapeMismatch {
        name: &'static str,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },
}

/// Trained parameters of a [`Topology`], checked against it at load time
#[derive(Debug, Clone)]
pub struct Weights {
    pub conv1_kernel: Array4<f32>,
    pub conv1_bias: Array1<f32>,
    pub conv2_kernel: Array4<f32>,
    pub conv2_bias: Array1<f32>,
    pub dense1_kernel: Array2<f32>,
    pub dense1_bias: Array1<f32>,
    pub dense2_kernel: Array2<f32>,
    pub dense2_bias: Array1<f32>,
}

impl Weights {
    /// Load a safetensors archive from disk
    pub fn load<P: AsRef<Path>>(path: P, topology: &Topology) -> Result<Self, LoadError> {
        let path = path.as_ref();
        tracing::info!("Loading classifier weights from {}", path.display());

        let bytes = std::fs::read(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                LoadError::Missing(path.to_path_buf())
            } else {
                LoadError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

        Self::from_bytes(&bytes, topology)
    }

    /// Parse an in-memory safetensors archive
    pub fn from_bytes(bytes: &[u8], topology: &Topology) -> Result<Self, LoadError> {
        let archive =
            SafeTensors::deserialize(bytes).map_err(|e| LoadError::Malformed(e.to_string()))?;

        let [conv1_k, conv1_b, conv2_k, conv2_b, dense1_k, dense1_b, dense2_k, dense2_b] =
            topology.parameter_shapes();

        Ok(Self {
            conv1_kernel: read_tensor(&archive, conv1_k)?,
            conv1_bias: read_tensor(&archive, conv1_b)?,
            conv2_kernel: read_tensor(&archive, conv2_k)?,
            conv2_bias: read_tensor(&archive, conv2_b)?,
            dense1_kernel: read_tensor(&archive, dense1_k)?,
            dense1_bias: read_tensor(&archive, dense1_b)?,
            dense2_kernel: read_tensor(&archive, dense2_k)?,
            dense2_bias: read_tensor(&archive, dense2_b)?,
        })
    }
}

fn read_tensor<D: Dimension>(
    archive: &SafeTensors<'_>,
    (name, expected): (&'static str, Vec<usize>),
) -> Result<Array<f32, D>, LoadError> {
    let view = archive
        .tensor(name)
        .map_err(|_| LoadError::Malformed(format!("missing tensor {name}")))?;

    if view.dtype() != Dtype::F32 {
        return Err(LoadError::Malformed(format!(
            "tensor {name} is {:?}, expected F32",
            view.dtype()
        )));
    }

    if view.shape() != expected.as_slice() {
        return Err(LoadError::ShapeMismatch {
            name,
            expected,
            actual: view.shape().to_vec(),
        });
    }

    let values: Vec<f32> = view
        .data()
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect();

    if values.iter().any(|v| !v.is_finite()) {
        return Err(LoadError::Malformed(format!(
            "tensor {name} has non-finite values"
        )));
    }

    Array::from_shape_vec(IxDyn(&expected), values)
        .and_then(|a| a.into_dimensionality::<D>())
        .map_err(|e| LoadError::Malformed(format!("tensor {name}: {e}")))
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    #[test]
    fn loads_matching_archive() {
        let topology = Topology::sign_cnn();
        let weights = Weights::from_bytes(&uniform_archive(&topology, 0.5), &topology)
            .expect("weights should load");
        assert_eq!(weights.dense1_kernel.dim(), (6272, 128));
        assert_eq!(weights.conv2_kernel.dim(), (3, 3, 32, 32));
        assert!(weights.dense2_bias.iter().all(|&v| v == 0.5));
    }

    #[test]
    fn class_count_drift_is_a_shape_mismatch() {
        let trained = Topology {
            classes: 45,
            ..Topology::sign_cnn()
        };
        let bytes = uniform_archive(&trained, 0.0);

        let err = Weights::from_bytes(&bytes, &Topology::sign_cnn()).unwrap_err();
        match &err {
            LoadError::ShapeMismatch {
                name,
                expected,
                actual,
            } => {
                assert_eq!(*name, "dense2.kernel");
                assert_eq!(expected, &vec![128, 29]);
                assert_eq!(actual, &vec![128, 45]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().contains("dense2.kernel"));
    }

    #[test]
    fn missing_tensor_is_malformed() {
        let topology = Topology::sign_cnn();
        let tensors: Vec<(&str, Vec<usize>, f32)> = topology
            .parameter_shapes()
            .into_iter()
            .filter(|(name, _)| *name != "conv2.bias")
            .map(|(name, shape)| (name, shape, 0.0))
            .collect();

        let err = Weights::from_bytes(&archive(&tensors), &topology).unwrap_err();
        assert!(matches!(err, LoadError::Malformed(ref m) if m.contains("conv2.bias")));
    }

    #[test]
    fn non_finite_parameters_are_rejected() {
        let topology = Topology::sign_cnn();
        let err = Weights::from_bytes(&uniform_archive(&topology, f32::NAN), &topology)
            .unwrap_err();
        assert!(matches!(err, LoadError::Malformed(ref m) if m.contains("non-finite")));

        let tensors: Vec<(&str, Vec<usize>, f32)> = topology
            .parameter_shapes()
            .into_iter()
            .map(|(name, shape)| {
                let fill = if name == "dense1.bias" { f32::INFINITY } else { 0.1 };
                (name, shape, fill)
            })
            .collect();
        let err = Weights::from_bytes(&archive(&tensors), &topology).unwrap_err();
        assert!(matches!(err, LoadError::Malformed(ref m) if m.contains("dense1.bias")));
    }

    #[test]
    fn garbage_is_malformed() {
        let err = Weights::from_bytes(b"definitely not an archive", &Topology::sign_cnn())
            .unwrap_err();
        assert!(matches!(err, LoadError::Malformed(_)));
    }

    #[test]
    fn absent_file_is_missing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("model-bw.safetensors");
        let err = Weights::load(&path, &Topology::sign_cnn()).unwrap_err();
        assert!(matches!(err, LoadError::Missing(p) if p == path));
    }
}
