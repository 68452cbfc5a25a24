// src/config.rs
//
// Runtime configuration: where archives come from, where they are cached,
// and how the cached files are read back.

use std::path::PathBuf;

use crate::constants::{
    DEFAULT_BASE_URL, DEFAULT_DATA_DIR, DEFAULT_READ_CHUNK_SIZE, ENV_BASE_URL, ENV_DATA_DIR,
    ENV_READ_CHUNK,
};

pub use crate::http::HttpClientConfig;

/// Archive kind, which fixes header layout and magic number.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ArchiveKind {
    Labels,
    Images,
}

/// Top-level configuration handed to [`crate::Mnist`].
#[derive(Debug, Clone)]
pub struct MnistConfig {
    /// Cache root holding compressed and decompressed archives
    pub data_dir: PathBuf,
    /// Base URL the four archive names are appended to
    pub base_url: String,
    /// Chunk size used when streaming a cached archive into the parser
    pub read_chunk_size: usize,
    pub http: HttpClientConfig,
}

impl Default for MnistConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            base_url: DEFAULT_BASE_URL.to_string(),
            read_chunk_size: DEFAULT_READ_CHUNK_SIZE,
            http: HttpClientConfig::default(),
        }
    }
}

impl MnistConfig {
    /// Defaults overlaid with `MNISTDL_DATA_DIR`, `MNISTDL_BASE_URL` and
    /// `MNISTDL_READ_CHUNK`. Unparseable or zero chunk sizes are ignored.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(dir) = std::env::var(ENV_DATA_DIR) {
            cfg.data_dir = PathBuf::from(dir);
        }
        if let Ok(url) = std::env::var(ENV_BASE_URL) {
            cfg.base_url = url;
        }
        if let Some(chunk) = std::env::var(ENV_READ_CHUNK)
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .filter(|&n| n > 0)
        {
            cfg.read_chunk_size = chunk;
        }
        cfg
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the parser read chunk size. Zero is clamped to 1.
    pub fn with_read_chunk_size(mut self, size: usize) -> Self {
        self.read_chunk_size = size.max(1);
        self
    }

    pub fn with_http(mut self, http: HttpClientConfig) -> Self {
        self.http = http;
        self
    }

    /// Join the base URL and a remote file name, tolerating a missing `/`.
    pub fn url_for(&self, remote_name: &str) -> String {
        if self.base_url.ends_with('/') {
            format!("{}{}", self.base_url, remote_name)
        } else {
            format!("{}/{}", self.base_url, remote_name)
        }
    }
}
