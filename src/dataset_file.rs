// src/dataset_file.rs
//
// The four logical dataset files and the paths/URLs derived from them.

use std::fmt;
use std::path::PathBuf;

use crate::config::{ArchiveKind, MnistConfig};
use crate::constants::{
    COMPRESSED_SUFFIX, TEST_IMAGES_FILE, TEST_LABELS_FILE, TRAIN_IMAGES_FILE, TRAIN_LABELS_FILE,
};

/// One of the four logical dataset files.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DatasetSplit {
    TrainImages,
    TrainLabels,
    TestImages,
    TestLabels,
}

impl DatasetSplit {
    pub const ALL: [DatasetSplit; 4] = [
        DatasetSplit::TrainImages,
        DatasetSplit::TrainLabels,
        DatasetSplit::TestImages,
        DatasetSplit::TestLabels,
    ];

    /// Logical identifier; also the decompressed file name in the cache.
    pub fn logical_name(self) -> &'static str {
        match self {
            DatasetSplit::TrainImages => TRAIN_IMAGES_FILE,
            DatasetSplit::TrainLabels => TRAIN_LABELS_FILE,
            DatasetSplit::TestImages => TEST_IMAGES_FILE,
            DatasetSplit::TestLabels => TEST_LABELS_FILE,
        }
    }

    pub fn kind(self) -> ArchiveKind {
        match self {
            DatasetSplit::TrainImages | DatasetSplit::TestImages => ArchiveKind::Images,
            DatasetSplit::TrainLabels | DatasetSplit::TestLabels => ArchiveKind::Labels,
        }
    }

    /// Stable position in [`DatasetSplit::ALL`].
    pub fn index(self) -> usize {
        match self {
            DatasetSplit::TrainImages => 0,
            DatasetSplit::TrainLabels => 1,
            DatasetSplit::TestImages => 2,
            DatasetSplit::TestLabels => 3,
        }
    }
}

impl fmt::Display for DatasetSplit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.logical_name())
    }
}

/// Immutable description of where one logical file lives, remotely and locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetFile {
    pub split: DatasetSplit,
    pub remote_url: String,
    pub local_compressed_path: PathBuf,
    pub local_decompressed_path: PathBuf,
}

impl DatasetFile {
    pub fn new(split: DatasetSplit, cfg: &MnistConfig) -> Self {
        let name = split.logical_name();
        let compressed_name = format!("{}{}", name, COMPRESSED_SUFFIX);
        Self {
            split,
            remote_url: cfg.url_for(&compressed_name),
            local_compressed_path: cfg.data_dir.join(&compressed_name),
            local_decompressed_path: cfg.data_dir.join(name),
        }
    }

    pub fn logical_name(&self) -> &'static str {
        self.split.logical_name()
    }

    pub fn kind(&self) -> ArchiveKind {
        self.split.kind()
    }
}
