// tests/common/mod.rs
//
// Common test utilities: synthetic IDX archives and an in-memory archive source.

#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use flate2::Compression;
use flate2::write::GzEncoder;
use futures_util::stream;
use std::collections::HashMap;
use std::io::Write;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use mnistdl::{ArchiveSource, ByteStream, DatasetSplit, MnistConfig, MnistError};

pub const BASE_URL: &str = "http://mirror.test/mnist/";

pub fn label_archive(labels: &[u8]) -> Vec<u8> {
    let mut v = 2049u32.to_be_bytes().to_vec();
    v.extend_from_slice(&(labels.len() as u32).to_be_bytes());
    v.extend_from_slice(labels);
    v
}

pub fn image_archive(count: u32, rows: u32, cols: u32, pixels: &[u8]) -> Vec<u8> {
    let mut v = Vec::new();
    for w in [2051u32, count, rows, cols] {
        v.extend_from_slice(&w.to_be_bytes());
    }
    v.extend_from_slice(pixels);
    v
}

pub fn gzip(data: &[u8]) -> Vec<u8> {
    let mut enc = GzEncoder::new(Vec::new(), Compression::default());
    enc.write_all(data).unwrap();
    enc.finish().unwrap()
}

/// Raw (decompressed) archives for all four splits, 2x2 images.
pub struct Fixture {
    pub train_pixels: Vec<u8>,
    pub train_labels: Vec<u8>,
    pub test_pixels: Vec<u8>,
    pub test_labels: Vec<u8>,
}

impl Fixture {
    pub fn small() -> Self {
        Self {
            train_pixels: vec![0, 255, 10, 0, 1, 2, 3, 4, 128, 128, 128, 128],
            train_labels: vec![7, 2, 9],
            test_pixels: vec![255, 0, 0, 255],
            test_labels: vec![4],
        }
    }

    pub fn raw(&self, split: DatasetSplit) -> Vec<u8> {
        match split {
            DatasetSplit::TrainImages => {
                image_archive(self.train_labels.len() as u32, 2, 2, &self.train_pixels)
            }
            DatasetSplit::TrainLabels => label_archive(&self.train_labels),
            DatasetSplit::TestImages => {
                image_archive(self.test_labels.len() as u32, 2, 2, &self.test_pixels)
            }
            DatasetSplit::TestLabels => label_archive(&self.test_labels),
        }
    }
}

pub fn url_of(split: DatasetSplit) -> String {
    format!("{}{}.gz", BASE_URL, split.logical_name())
}

/// Serves fixed bodies per URL in `chunk` sized pieces and counts requests.
pub struct MockSource {
    bodies: HashMap<String, Vec<u8>>,
    failing: Vec<String>,
    chunk: usize,
    pub calls: Mutex<HashMap<String, usize>>,
    pub total: AtomicUsize,
}

impl MockSource {
    pub fn new(chunk: usize) -> Self {
        Self {
            bodies: HashMap::new(),
            failing: Vec::new(),
            chunk: chunk.max(1),
            calls: Mutex::new(HashMap::new()),
            total: AtomicUsize::new(0),
        }
    }

    /// All four splits from `fixture`, gzipped.
    pub fn serving(fixture: &Fixture, chunk: usize) -> Self {
        let mut src = Self::new(chunk);
        for split in DatasetSplit::ALL {
            src = src.with_body(&url_of(split), gzip(&fixture.raw(split)));
        }
        src
    }

    pub fn with_body(mut self, url: &str, body: Vec<u8>) -> Self {
        self.bodies.insert(url.to_string(), body);
        self
    }

    /// Requests to `url` fail as a transport error.
    pub fn failing(mut self, url: &str) -> Self {
        self.failing.push(url.to_string());
        self
    }

    pub fn calls_for(&self, url: &str) -> usize {
        self.calls.lock().unwrap().get(url).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ArchiveSource for MockSource {
    async fn fetch(&self, url: &str) -> Result<ByteStream, MnistError> {
        self.total.fetch_add(1, Ordering::SeqCst);
        *self.calls.lock().unwrap().entry(url.to_string()).or_insert(0) += 1;

        // yield so concurrent pipelines interleave
        tokio::task::yield_now().await;

        if self.failing.iter().any(|u| u == url) {
            return Err(MnistError::Network {
                url: url.to_string(),
                source: anyhow::anyhow!("connection refused"),
            });
        }
        let body = self.bodies.get(url).cloned().unwrap_or_default();
        let chunks: Vec<Result<Bytes, MnistError>> = body
            .chunks(self.chunk)
            .map(|c| Ok(Bytes::copy_from_slice(c)))
            .collect();
        Ok(Box::pin(stream::iter(chunks)))
    }
}

pub fn config_for(dir: &std::path::Path) -> MnistConfig {
    MnistConfig::default()
        .with_data_dir(dir)
        .with_base_url(BASE_URL)
}
