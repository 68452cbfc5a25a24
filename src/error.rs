// src/error.rs
//
// Error taxonomy for the acquisition and decoding pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, MnistError>;

/// Failures while validating the binary layout of a decompressed archive.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("wrong magic number: expected {expected}, found {found}")]
    BadMagic { expected: u32, found: u32 },

    #[error("stream ended inside the header: needed {needed} bytes, got {got}")]
    TruncatedHeader { needed: usize, got: usize },

    #[error("payload ends after {got} records, header announced {expected}")]
    PayloadLength { expected: usize, got: usize },
}

/// Top-level error for every stage of a dataset file's pipeline.
///
/// All variants are fatal to the requesting pipeline; nothing here is retried.
#[derive(Error, Debug)]
pub enum MnistError {
    /// Transport failure or non-success HTTP status.
    #[error("network error fetching {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: anyhow::Error,
    },

    /// The compressed archive is not a valid gzip stream.
    #[error("corrupt compressed archive {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid archive format: {0}")]
    Format(#[from] FormatError),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Two datasets with different per-sample image sizes were combined.
    #[error("record length mismatch: expected {expected} per sample, found {found}")]
    RecordLenMismatch { expected: usize, found: usize },

    /// Image and label archives disagree on the number of samples.
    #[error("sample count mismatch: {images} images vs {labels} labels")]
    SampleCountMismatch { images: usize, labels: usize },
}

impl MnistError {
    pub(crate) fn network(url: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        MnistError::Network { url: url.into(), source: source.into() }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        MnistError::Io { path: path.into(), source }
    }

    pub(crate) fn decode(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        MnistError::Decode { path: path.into(), source }
    }

    /// True when the error is a [`FormatError`] of any kind.
    pub fn is_format(&self) -> bool {
        matches!(self, MnistError::Format(_))
    }
}
