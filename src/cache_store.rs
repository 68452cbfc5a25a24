// src/cache_store.rs
//
// Local cache directory holding the compressed and decompressed archives.
// Writes happen in the fetcher and decompressor, into paths named here.

use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, trace};

use crate::dataset_file::DatasetFile;
use crate::error::{MnistError, Result};

/// Which forms of a dataset file are already on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStatus {
    pub compressed: bool,
    pub decompressed: bool,
}

impl CacheStatus {
    /// Nothing left to do for this file.
    pub fn is_ready(&self) -> bool {
        self.decompressed
    }
}

/// Cache rooted at an explicit directory (no process-global state).
#[derive(Debug, Clone)]
pub struct CacheStore {
    root: PathBuf,
}

impl CacheStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the cache root if missing.
    ///
    /// `create_dir_all` treats an existing directory as success, including one
    /// created by a concurrent caller between its check and its mkdir, so this
    /// may be called redundantly from every pipeline.
    pub async fn ensure_directory(&self) -> Result<()> {
        fs::create_dir_all(&self.root)
            .await
            .map_err(|e| MnistError::io(&self.root, e))?;
        trace!("cache root ready: {}", self.root.display());
        Ok(())
    }

    /// Whether `path` exists. Errors while probing count as "absent".
    pub async fn exists(&self, path: &Path) -> bool {
        match fs::try_exists(path).await {
            Ok(found) => found,
            Err(e) => {
                debug!("cannot stat {}: {}, treating as absent", path.display(), e);
                false
            }
        }
    }

    /// Presence of both forms of `file`.
    pub async fn status(&self, file: &DatasetFile) -> CacheStatus {
        CacheStatus {
            compressed: self.exists(&file.local_compressed_path).await,
            decompressed: self.exists(&file.local_decompressed_path).await,
        }
    }
}
