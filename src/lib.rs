// src/lib.rs
//
// Copyright, 2025.  Signal65 / Futurum Group.
//
// Crate root and public re-exports.

// ===== Acquisition and decoding pipeline =====
pub mod constants;
pub mod config;
pub mod error;
pub mod dataset_file;
pub mod cache_store;
pub mod fetcher;
pub mod http;
pub mod decompress;
pub mod parser;
pub mod pipeline;

// ===== Utilities consumed by training / evaluation =====
pub mod shuffle;
pub mod normalize;

// ===== Sample layer and model seam =====
pub mod data_loader;
pub mod classifier;

pub use config::{ArchiveKind, HttpClientConfig, MnistConfig};
pub use error::{FormatError, MnistError, Result};
pub use dataset_file::{DatasetFile, DatasetSplit};
pub use cache_store::{CacheStatus, CacheStore};
pub use fetcher::{ArchiveFetcher, ArchiveSource, ByteStream, FetchOutcome};
pub use http::HttpArchiveSource;
pub use decompress::{DecompressOutcome, Decompressor};
pub use parser::{IdxArchive, IdxHeader, RecordParser, parse_bytes, parse_chunks, parse_file, parse_reader};
pub use pipeline::{FileReport, Mnist, MnistData};
pub use shuffle::{shuffled_indices, shuffled_indices_seeded, shuffled_indices_with};
pub use normalize::{normalize, normalize_all};

pub use crate::data_loader::dataloader::DataLoader;
pub use crate::data_loader::dataset::{Dataset, DatasetError};
pub use crate::data_loader::options::LoaderOptions;
pub use crate::data_loader::{MnistDataset, Sample};

pub use classifier::{Classifier, Evaluation, ScoreMap, TrainingSample, evaluate, max_score, training_samples};
