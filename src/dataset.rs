//! Labeled sample folders: `<root>/<partition>/<class>/<n>.jpg`.

use crate::labels::DATASET_CLASSES;
use image::GrayImage;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

const SAMPLE_EXTENSION: &str = "jpg";

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("unknown class {0}")]
    UnknownClass(String),

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write sample {}: {source}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Training or evaluation split
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Partition {
    Train,
    Test,
}

impl Partition {
    pub const ALL: [Partition; 2] = [Partition::Train, Partition::Test];

    pub fn dir_name(self) -> &'static str {
        match self {
            Partition::Train => "train",
            Partition::Test => "test",
        }
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// The on-disk dataset tree
#[derive(Debug, Clone)]
pub struct Dataset {
    root: PathBuf,
}

impl Dataset {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn class_dir(&self, partition: Partition, class: &str) -> PathBuf {
        self.root.join(partition.dir_name()).join(class)
    }

    /// Create every partition/class folder that does not exist yet.
    ///
    /// # Returns
    /// Number of folders created
    pub fn ensure_layout(&self) -> Result<usize, DatasetError> {
        let mut created = 0;
        for partition in Partition::ALL {
            for class in DATASET_CLASSES {
                let dir = self.class_dir(partition, class);
                if !dir.is_dir() {
                    std::fs::create_dir_all(&dir).map_err(|source| DatasetError::Io {
                        path: dir.clone(),
                        source,
                    })?;
                    created += 1;
                }
            }
        }

        tracing::info!(
            "Dataset layout ready at {} ({} classes, {} folders created)",
            self.root.display(),
            DATASET_CLASSES.len(),
            created
        );
        Ok(created)
    }

    /// Number of samples already saved for `class`; 0 if the folder is absent
    pub fn count(&self, partition: Partition, class: &str) -> Result<usize, DatasetError> {
        let dir = self.class_dir(partition, class);
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(source) => return Err(DatasetError::Io { path: dir, source }),
        };

        Ok(entries
            .filter_map(Result::ok)
            .filter(|entry| {
                entry
                    .path()
                    .extension()
                    .is_some_and(|ext| ext == SAMPLE_EXTENSION)
            })
            .count())
    }

    /// Save `sample` as the next numbered file of `class`.
    ///
    /// # Returns
    /// Path of the written file
    pub fn save_sample(
        &self,
        partition: Partition,
        class: &str,
        sample: &GrayImage,
    ) -> Result<PathBuf, DatasetError> {
        if !DATASET_CLASSES.contains(&class) {
            return Err(DatasetError::UnknownClass(class.to_string()));
        }

        let dir = self.class_dir(partition, class);
        std::fs::create_dir_all(&dir).map_err(|source| DatasetError::Io {
            path: dir.clone(),
            source,
        })?;

        let index = self.count(partition, class)?;
        let path = dir.join(format!("{index}.{SAMPLE_EXTENSION}"));
        sample
            .save(&path)
            .map_err(|source| DatasetError::Encode {
                path: path.clone(),
                source,
            })?;

        tracing::debug!("Saved sample {}", path.display());
        Ok(path)
    }

    /// Sample count per class for one partition, in class order
    pub fn census(&self, partition: Partition) -> Result<Vec<(&'static str, usize)>, DatasetError> {
        DATASET_CLASSES
            .iter()
            .map(|&class| self.count(partition, class).map(|n| (class, n)))
            .collect()
    }
}
