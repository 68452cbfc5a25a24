// src/fetcher.rs
//
// Archive fetcher: pulls a remote compressed archive into the cache once.

use async_trait::async_trait;
use bytes::Bytes;
use futures_core::stream::Stream;
use futures_util::StreamExt;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::cache_store::CacheStore;
use crate::constants::PARTIAL_SUFFIX;
use crate::dataset_file::DatasetFile;
use crate::error::{MnistError, Result};

/// A boxed, pinned, sendable stream of body chunks.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send + 'static>>;

/// Where compressed archives come from.
///
/// The HTTP implementation lives in [`crate::http`]; tests and offline
/// mirrors plug in their own.
#[async_trait]
pub trait ArchiveSource: Send + Sync {
    /// Issue one request for `url` and return its body as a chunk stream.
    async fn fetch(&self, url: &str) -> Result<ByteStream>;
}

/// What `ensure_compressed` had to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The compressed artifact was already cached; no request was made.
    Cached,
    /// A request was made and this many bytes were written.
    Downloaded { bytes: u64 },
}

#[derive(Clone)]
pub struct ArchiveFetcher {
    source: Arc<dyn ArchiveSource>,
    cache: CacheStore,
}

impl ArchiveFetcher {
    pub fn new(source: Arc<dyn ArchiveSource>, cache: CacheStore) -> Self {
        Self { source, cache }
    }

    /// Raw request, bypassing the cache.
    pub async fn fetch(&self, url: &str) -> Result<ByteStream> {
        self.source.fetch(url).await
    }

    /// Fetch `file` unless its compressed artifact already exists.
    pub async fn ensure_compressed(&self, file: &DatasetFile) -> Result<FetchOutcome> {
        if self.cache.exists(&file.local_compressed_path).await {
            debug!("{}: compressed archive cached, skipping download", file.logical_name());
            return Ok(FetchOutcome::Cached);
        }
        info!("{}: downloading {}", file.logical_name(), file.remote_url);
        let stream = self.fetch(&file.remote_url).await?;
        self.save_compressed(file, stream).await
    }

    /// Write `stream` to the compressed path of `file`.
    ///
    /// Skips entirely (dropping the stream) when the path already exists.
    /// Data lands in a `.part` sibling first and is renamed into place only
    /// once the stream has ended cleanly.
    pub async fn save_compressed(&self, file: &DatasetFile, mut stream: ByteStream) -> Result<FetchOutcome> {
        let dest = &file.local_compressed_path;
        if self.cache.exists(dest).await {
            debug!("{}: {} appeared meanwhile, discarding stream", file.logical_name(), dest.display());
            return Ok(FetchOutcome::Cached);
        }

        let part = partial_path(dest);
        let written = match write_stream(&part, &mut stream).await {
            Ok(n) => n,
            Err(e) => {
                discard(&part).await;
                return Err(e);
            }
        };

        fs::rename(&part, dest)
            .await
            .map_err(|e| MnistError::io(dest, e))?;
        info!("{}: saved {} bytes to {}", file.logical_name(), written, dest.display());
        Ok(FetchOutcome::Downloaded { bytes: written })
    }
}

async fn write_stream(path: &Path, stream: &mut ByteStream) -> Result<u64> {
    let mut out = fs::File::create(path)
        .await
        .map_err(|e| MnistError::io(path, e))?;
    let mut written = 0u64;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        out.write_all(&chunk)
            .await
            .map_err(|e| MnistError::io(path, e))?;
        written += chunk.len() as u64;
    }
    out.flush().await.map_err(|e| MnistError::io(path, e))?;
    Ok(written)
}

/// `<path>.part`
pub(crate) fn partial_path(path: &Path) -> PathBuf {
    let mut s = path.as_os_str().to_owned();
    s.push(PARTIAL_SUFFIX);
    PathBuf::from(s)
}

/// Best-effort removal of a partial artifact.
pub(crate) async fn discard(path: &Path) {
    if let Err(e) = fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!("could not remove partial file {}: {}", path.display(), e);
        }
    }
}
