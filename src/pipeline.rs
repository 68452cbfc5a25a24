// src/pipeline.rs
//
// Glue: cache lookup -> fetch -> decompress -> parse, per logical file,
// and the four-way fan-out the dataset accessors sit on.

use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::cache_store::CacheStore;
use crate::config::MnistConfig;
use crate::data_loader::MnistDataset;
use crate::dataset_file::{DatasetFile, DatasetSplit};
use crate::decompress::{DecompressOutcome, Decompressor};
use crate::error::Result;
use crate::fetcher::{ArchiveFetcher, ArchiveSource, FetchOutcome};
use crate::http::HttpArchiveSource;
use crate::parser::{IdxArchive, parse_file};

/// What one file's pipeline did on this invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileReport {
    pub split: DatasetSplit,
    pub fetch: FetchOutcome,
    pub decompress: DecompressOutcome,
}

impl FileReport {
    /// Nothing was fetched or decompressed.
    pub fn was_cached(&self) -> bool {
        self.fetch == FetchOutcome::Cached && self.decompress == DecompressOutcome::Cached
    }
}

/// All four parsed archives.
#[derive(Debug, Clone)]
pub struct MnistData {
    pub train_images: IdxArchive,
    pub train_labels: IdxArchive,
    pub test_images: IdxArchive,
    pub test_labels: IdxArchive,
}

impl MnistData {
    pub fn train_dataset(&self) -> Result<MnistDataset> {
        MnistDataset::from_archives(&self.train_images, &self.train_labels)
    }

    pub fn test_dataset(&self) -> Result<MnistDataset> {
        MnistDataset::from_archives(&self.test_images, &self.test_labels)
    }
}

/// Entry point for collaborators: owns the cache, the fetcher and the
/// decompressor, and exposes one accessor per logical file.
pub struct Mnist {
    config: MnistConfig,
    cache: CacheStore,
    fetcher: ArchiveFetcher,
    decompressor: Decompressor,
    /// One lock per split so concurrent callers cannot both see "absent"
    /// and both fetch the same file.
    locks: [Mutex<()>; 4],
}

impl Mnist {
    /// Pipeline over the HTTP transport described by `config.http`.
    pub fn new(config: MnistConfig) -> anyhow::Result<Self> {
        let source = HttpArchiveSource::new(config.http.clone())?;
        Ok(Self::with_source(config, Arc::new(source)))
    }

    /// Pipeline over any archive source.
    pub fn with_source(config: MnistConfig, source: Arc<dyn ArchiveSource>) -> Self {
        let cache = CacheStore::new(&config.data_dir);
        Self {
            fetcher: ArchiveFetcher::new(source, cache.clone()),
            decompressor: Decompressor::new(cache.clone()),
            cache,
            config,
            locks: std::array::from_fn(|_| Mutex::new(())),
        }
    }

    pub fn config(&self) -> &MnistConfig {
        &self.config
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    pub fn file(&self, split: DatasetSplit) -> DatasetFile {
        DatasetFile::new(split, &self.config)
    }

    /// Make sure the decompressed artifact for `split` exists. Stages run
    /// strictly in order; a cached stage is skipped.
    pub async fn ensure_file(&self, split: DatasetSplit) -> Result<FileReport> {
        let _guard = self.locks[split.index()].lock().await;
        let file = self.file(split);

        self.cache.ensure_directory().await?;
        if self.cache.exists(&file.local_decompressed_path).await {
            debug!("{}: ready in cache", split);
            return Ok(FileReport {
                split,
                fetch: FetchOutcome::Cached,
                decompress: DecompressOutcome::Cached,
            });
        }

        let fetch = self.fetcher.ensure_compressed(&file).await?;
        let decompress = self.decompressor.ensure_decompressed(&file).await?;
        Ok(FileReport { split, fetch, decompress })
    }

    /// Run all four pipelines concurrently.
    ///
    /// Every pipeline runs to completion even if another fails; the first
    /// failure to complete is the one reported.
    pub async fn download_all(&self) -> Result<Vec<FileReport>> {
        let mut pending: FuturesUnordered<_> = DatasetSplit::ALL
            .iter()
            .map(|&split| self.ensure_file(split))
            .collect();

        let mut reports = Vec::with_capacity(DatasetSplit::ALL.len());
        let mut first_err = None;
        while let Some(res) = pending.next().await {
            match res {
                Ok(report) => reports.push(report),
                Err(e) => {
                    warn!("dataset pipeline failed: {}", e);
                    if first_err.is_none() {
                        first_err = Some(e);
                    }
                }
            }
        }

        match first_err {
            Some(e) => Err(e),
            None => {
                reports.sort_by_key(|r| r.split.index());
                Ok(reports)
            }
        }
    }

    /// Ensure every file is present, then parse `split`.
    pub async fn load(&self, split: DatasetSplit) -> Result<IdxArchive> {
        self.download_all().await?;
        self.parse(split).await
    }

    /// Parse a split that is already present in the cache.
    async fn parse(&self, split: DatasetSplit) -> Result<IdxArchive> {
        let file = self.file(split);
        let archive = parse_file(&file.local_decompressed_path, split.kind(), self.config.read_chunk_size).await?;
        info!("{}: {} records ({} samples)", split, archive.records.len(), archive.header.count);
        Ok(archive)
    }

    /// Flat training image records, 784 per sample.
    pub async fn train_images(&self) -> Result<Vec<u8>> {
        Ok(self.load(DatasetSplit::TrainImages).await?.into_records())
    }

    pub async fn train_labels(&self) -> Result<Vec<u8>> {
        Ok(self.load(DatasetSplit::TrainLabels).await?.into_records())
    }

    /// Flat test image records, 784 per sample.
    pub async fn test_images(&self) -> Result<Vec<u8>> {
        Ok(self.load(DatasetSplit::TestImages).await?.into_records())
    }

    pub async fn test_labels(&self) -> Result<Vec<u8>> {
        Ok(self.load(DatasetSplit::TestLabels).await?.into_records())
    }

    /// Download once, then parse all four files concurrently.
    pub async fn load_all(&self) -> Result<MnistData> {
        self.download_all().await?;
        let (train_images, train_labels, test_images, test_labels) = tokio::try_join!(
            self.parse(DatasetSplit::TrainImages),
            self.parse(DatasetSplit::TrainLabels),
            self.parse(DatasetSplit::TestImages),
            self.parse(DatasetSplit::TestLabels),
        )?;
        Ok(MnistData { train_images, train_labels, test_images, test_labels })
    }
}

impl std::fmt::Debug for Mnist {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mnist")
            .field("data_dir", &self.config.data_dir)
            .field("base_url", &self.config.base_url)
            .finish()
    }
}
