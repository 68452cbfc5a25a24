// src/decompress.rs
//
// Streams a cached .gz archive into its decompressed sibling.

use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{BufReader, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

use crate::cache_store::CacheStore;
use crate::constants::DEFAULT_DECOMPRESS_BUFFER_SIZE;
use crate::dataset_file::DatasetFile;
use crate::error::{MnistError, Result};
use crate::fetcher::{discard, partial_path};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecompressOutcome {
    /// Decompressed artifact already present; nothing was read.
    Cached,
    Decompressed { bytes: u64 },
}

#[derive(Debug, Clone)]
pub struct Decompressor {
    cache: CacheStore,
    buffer_size: usize,
}

impl Decompressor {
    pub fn new(cache: CacheStore) -> Self {
        Self { cache, buffer_size: DEFAULT_DECOMPRESS_BUFFER_SIZE }
    }

    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size.max(1);
        self
    }

    /// Decompress `file` unless its decompressed artifact already exists.
    pub async fn ensure_decompressed(&self, file: &DatasetFile) -> Result<DecompressOutcome> {
        if self.cache.exists(&file.local_decompressed_path).await {
            debug!("{}: decompressed archive cached", file.logical_name());
            return Ok(DecompressOutcome::Cached);
        }
        let bytes = self
            .decompress(&file.local_compressed_path, &file.local_decompressed_path)
            .await?;
        info!("{}: decompressed {} bytes", file.logical_name(), bytes);
        Ok(DecompressOutcome::Decompressed { bytes })
    }

    /// Gunzip `compressed` into `target`, returning the decompressed size.
    ///
    /// Output goes to `<target>.part` and is renamed on success; on any
    /// failure the partial output is removed so a corrupt download never
    /// masquerades as a finished artifact.
    pub async fn decompress(&self, compressed: &Path, target: &Path) -> Result<u64> {
        let src = compressed.to_path_buf();
        let part = partial_path(target);
        let part_for_task = part.clone();
        let buffer_size = self.buffer_size;

        let res = tokio::task::spawn_blocking(move || gunzip_file(&src, &part_for_task, buffer_size))
            .await
            .map_err(|e| MnistError::io(target, std::io::Error::other(e)))
            .and_then(|r| r);

        match res {
            Ok(bytes) => {
                fs::rename(&part, target)
                    .await
                    .map_err(|e| MnistError::io(target, e))?;
                Ok(bytes)
            }
            Err(e) => {
                discard(&part).await;
                Err(e)
            }
        }
    }
}

/// Convenience wrapper returning the decompressed path, for callers that
/// manage their own paths.
pub async fn decompress(compressed: &Path, target: &Path) -> Result<PathBuf> {
    let parent = target.parent().map(Path::to_path_buf).unwrap_or_default();
    Decompressor::new(CacheStore::new(parent))
        .decompress(compressed, target)
        .await?;
    Ok(target.to_path_buf())
}

/// Blocking gunzip copy of the file at `src` into `dst`.
fn gunzip_file(src: &Path, dst: &Path, buffer_size: usize) -> Result<u64> {
    let input = File::open(src).map_err(|e| MnistError::io(src, e))?;
    let output = File::create(dst).map_err(|e| MnistError::io(dst, e))?;
    gunzip(BufReader::new(input), src, output, dst, buffer_size)
}

/// Failure reading the compressed source itself, as opposed to the
/// deflate stream inside it.
#[derive(Debug)]
struct SourceReadError(std::io::Error);

impl std::fmt::Display for SourceReadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for SourceReadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

/// Tags every error from the wrapped reader as a [`SourceReadError`] so it
/// can be told apart from decoder errors once it comes out of `GzDecoder`.
struct TaggedReader<R>(R);

impl<R: Read> Read for TaggedReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.0.read(buf).map_err(|e| {
            if e.kind() == ErrorKind::Interrupted {
                e
            } else {
                std::io::Error::new(e.kind(), SourceReadError(e))
            }
        })
    }
}

/// Deflate, header and CRC failures are decode errors against `src_path`;
/// failures of the source reader are I/O errors against `src_path`, and
/// write failures are I/O errors against `dst_path`.
fn gunzip<R: Read, W: Write>(
    input: R,
    src_path: &Path,
    mut output: W,
    dst_path: &Path,
    buffer_size: usize,
) -> Result<u64> {
    let mut decoder = GzDecoder::new(TaggedReader(input));
    let mut buf = vec![0u8; buffer_size.max(1)];
    let mut total = 0u64;
    loop {
        let n = match decoder.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(classify_read_error(src_path, e)),
        };
        output
            .write_all(&buf[..n])
            .map_err(|e| MnistError::io(dst_path, e))?;
        total += n as u64;
    }
    output.flush().map_err(|e| MnistError::io(dst_path, e))?;
    Ok(total)
}

fn classify_read_error(src: &Path, e: std::io::Error) -> MnistError {
    let from_source = e
        .get_ref()
        .is_some_and(|inner| inner.is::<SourceReadError>());
    if !from_source {
        return MnistError::decode(src, e);
    }
    let kind = e.kind();
    let cause = e
        .into_inner()
        .and_then(|inner| inner.downcast::<SourceReadError>().ok())
        .map(|tagged| tagged.0)
        .unwrap_or_else(|| std::io::Error::from(kind));
    MnistError::io(src, cause)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MnistConfig;
    use crate::dataset_file::DatasetSplit;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use tempfile::TempDir;

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut enc = GzEncoder::new(Vec::new(), Compression::default());
        enc.write_all(data).unwrap();
        enc.finish().unwrap()
    }

    fn fixture(tmp: &TempDir) -> (Decompressor, DatasetFile) {
        let cfg = MnistConfig::default().with_data_dir(tmp.path());
        let file = DatasetFile::new(DatasetSplit::TrainImages, &cfg);
        (Decompressor::new(CacheStore::new(tmp.path())).with_buffer_size(7), file)
    }

    #[tokio::test]
    async fn round_trips_and_skips_second_time() {
        let tmp = TempDir::new().unwrap();
        let (dec, file) = fixture(&tmp);
        let payload: Vec<u8> = (0..1000u32).map(|i| (i % 251) as u8).collect();
        std::fs::write(&file.local_compressed_path, gzip(&payload)).unwrap();

        let out = dec.ensure_decompressed(&file).await.unwrap();
        assert_eq!(out, DecompressOutcome::Decompressed { bytes: 1000 });
        assert_eq!(std::fs::read(&file.local_decompressed_path).unwrap(), payload);

        assert_eq!(dec.ensure_decompressed(&file).await.unwrap(), DecompressOutcome::Cached);
        assert_eq!(std::fs::read(&file.local_decompressed_path).unwrap(), payload);
    }

    #[tokio::test]
    async fn corrupt_input_is_a_decode_error() {
        let tmp = TempDir::new().unwrap();
        let (dec, file) = fixture(&tmp);
        std::fs::write(&file.local_compressed_path, b"<html>404 Not Found</html>").unwrap();

        let err = dec.ensure_decompressed(&file).await.unwrap_err();
        assert!(matches!(err, MnistError::Decode { .. }), "got {err:?}");
        assert!(!file.local_decompressed_path.exists());
        assert!(!partial_path(&file.local_decompressed_path).exists());
    }

    #[tokio::test]
    async fn missing_input_is_an_io_error() {
        let tmp = TempDir::new().unwrap();
        let (dec, file) = fixture(&tmp);
        let err = dec.ensure_decompressed(&file).await.unwrap_err();
        assert!(matches!(err, MnistError::Io { .. }));
    }

    /// Yields `prefix`, then fails like a disk read error.
    struct FailingReader {
        prefix: Vec<u8>,
        pos: usize,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.pos < self.prefix.len() {
                let n = buf.len().min(self.prefix.len() - self.pos);
                buf[..n].copy_from_slice(&self.prefix[self.pos..self.pos + n]);
                self.pos += n;
                return Ok(n);
            }
            Err(std::io::Error::new(ErrorKind::PermissionDenied, "device gone"))
        }
    }

    #[test]
    fn source_read_failure_is_an_io_error() {
        let payload: Vec<u8> = (0..4096u32).map(|i| (i * 31 % 256) as u8).collect();
        let gz = gzip(&payload);
        let reader = FailingReader { prefix: gz[..gz.len() / 2].to_vec(), pos: 0 };
        let src = Path::new("train.gz");

        let err = gunzip(reader, src, Vec::new(), Path::new("train"), 64).unwrap_err();
        match err {
            MnistError::Io { path, source } => {
                assert_eq!(path, src);
                assert_eq!(source.kind(), ErrorKind::PermissionDenied);
            }
            other => panic!("expected Io, got {other:?}"),
        }
    }

    #[test]
    fn truncated_stream_is_still_a_decode_error() {
        let gz = gzip(&[7u8; 2048]);
        let truncated = &gz[..gz.len() - 6];
        let err = gunzip(truncated, Path::new("t.gz"), Vec::new(), Path::new("t"), 64).unwrap_err();
        assert!(matches!(err, MnistError::Decode { .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn free_function_returns_target_path() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("x.gz");
        let dst = tmp.path().join("x");
        std::fs::write(&src, gzip(b"hello")).unwrap();
        let out = decompress(&src, &dst).await.unwrap();
        assert_eq!(out, dst);
        assert_eq!(std::fs::read(&dst).unwrap(), b"hello");
    }
}
