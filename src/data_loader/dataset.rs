//! Core dataset abstraction for mnistdl's sample layer.
//!
//! A dataset is map-style: a known number of samples, each reachable by
//! index through [`Dataset::get`].

use async_trait::async_trait;
use thiserror::Error;

/// Item-level error type for dataset & loader operations.
#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("index out of range: {0}")]
    IndexOutOfRange(usize),
}

/// A logical collection of **samples**.
#[async_trait]
pub trait Dataset: Send + Sync + 'static {
    /// Concrete type produced for each sample.
    type Item: Send + 'static;

    /// Total number of samples.
    fn len(&self) -> usize;

    /// Retrieve a sample by zero-based index.
    async fn get(&self, index: usize) -> Result<Self::Item, DatasetError>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
