// src/data_loader/mod.rs

//! Sample layer on top of the parsed archives.
/// expose the `dataloader` module (file dataloader.rs)
pub mod dataloader;

/// expose the `dataset` module (file dataset.rs)
pub mod dataset;

pub mod mnist_dataset;

/// expose the `options` module (file options.rs)
pub mod options;

pub mod sampler;

// Re‐export the key types at this level:
pub use dataset::{Dataset, DatasetError};
pub use dataloader::DataLoader;
pub use mnist_dataset::{MnistDataset, Sample};
pub use options::LoaderOptions;
pub use sampler::{Sampler, SequentialSampler, ShuffleSampler};
