// src/parser.rs
//
// IDX binary record parser.
//
// A decompressed archive is a big-endian header followed by a flat payload
// of unsigned bytes:
//
//   labels  magic(2049) count                 | count bytes
//   images  magic(2051) count rows cols       | count * rows * cols bytes
//
// Input arrives in chunks whose sizes have nothing to do with the header
// size, so the parser tracks a running byte offset and keeps consuming
// header bytes across as many chunks as it takes before the first payload
// byte is appended.

use std::path::{Path, PathBuf};
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{debug, warn};

use crate::config::ArchiveKind;
use crate::constants::{
    IMAGE_HEADER_LEN, IMAGE_MAGIC, LABEL_HEADER_LEN, LABEL_MAGIC, MAX_HEADER_LEN,
    MAX_PREALLOCATED_RECORDS,
};
use crate::error::{FormatError, MnistError, Result};

impl ArchiveKind {
    pub fn magic(self) -> u32 {
        match self {
            ArchiveKind::Labels => LABEL_MAGIC,
            ArchiveKind::Images => IMAGE_MAGIC,
        }
    }

    pub fn header_len(self) -> usize {
        match self {
            ArchiveKind::Labels => LABEL_HEADER_LEN,
            ArchiveKind::Images => IMAGE_HEADER_LEN,
        }
    }
}

/// Decoded archive header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdxHeader {
    pub kind: ArchiveKind,
    pub magic: u32,
    /// Number of samples
    pub count: u32,
    /// `(rows, cols)` for image archives, `None` for labels
    pub dims: Option<(u32, u32)>,
}

impl IdxHeader {
    /// Records per sample: rows × cols for images, 1 for labels.
    pub fn record_len(&self) -> usize {
        match self.dims {
            Some((r, c)) => r as usize * c as usize,
            None => 1,
        }
    }

    /// Total payload records the header announces, if it fits in `usize`.
    pub fn expected_payload_len(&self) -> Option<usize> {
        (self.count as usize).checked_mul(self.record_len())
    }

    fn decode(kind: ArchiveKind, bytes: &[u8]) -> Self {
        let word = |i: usize| u32::from_be_bytes([bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]]);
        let dims = match kind {
            ArchiveKind::Images => Some((word(8), word(12))),
            ArchiveKind::Labels => None,
        };
        Self { kind, magic: word(0), count: word(4), dims }
    }
}

/// A fully parsed archive: its header plus the flat record sequence in
/// on-disk order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdxArchive {
    pub header: IdxHeader,
    pub records: Vec<u8>,
}

impl IdxArchive {
    pub fn into_records(self) -> Vec<u8> {
        self.records
    }

    /// Number of samples actually present in the payload.
    pub fn sample_count(&self) -> usize {
        self.records.len() / self.header.record_len().max(1)
    }

    /// Fixed-size windows of `record_len()` records, one per sample.
    pub fn samples(&self) -> std::slice::ChunksExact<'_, u8> {
        self.records.chunks_exact(self.header.record_len().max(1))
    }
}

/// Incremental parser state. Feed chunks in arrival order with
/// [`RecordParser::push_chunk`], then call [`RecordParser::finish`].
#[derive(Debug)]
pub struct RecordParser {
    kind: ArchiveKind,
    header_buf: [u8; MAX_HEADER_LEN],
    /// Bytes consumed so far, header included
    offset: usize,
    header: Option<IdxHeader>,
    records: Vec<u8>,
    failed: Option<FormatError>,
}

impl RecordParser {
    pub fn new(kind: ArchiveKind) -> Self {
        Self {
            kind,
            header_buf: [0u8; MAX_HEADER_LEN],
            offset: 0,
            header: None,
            records: Vec::new(),
            failed: None,
        }
    }

    pub fn kind(&self) -> ArchiveKind {
        self.kind
    }

    /// Header, once all of its bytes have arrived.
    pub fn header(&self) -> Option<&IdxHeader> {
        self.header.as_ref()
    }

    /// Total bytes consumed so far.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Consume one chunk. The magic number is checked as soon as its four
    /// bytes are available; a mismatch poisons the parser and every later
    /// call returns the same error.
    pub fn push_chunk(&mut self, chunk: &[u8]) -> std::result::Result<(), FormatError> {
        if let Some(e) = &self.failed {
            return Err(e.clone());
        }

        let header_len = self.kind.header_len();
        let mut rest = chunk;

        if self.offset < header_len {
            let take = (header_len - self.offset).min(rest.len());
            let before = self.offset;
            self.header_buf[before..before + take].copy_from_slice(&rest[..take]);
            self.offset += take;
            rest = &rest[take..];

            if before < 4 && self.offset >= 4 {
                let found = u32::from_be_bytes([
                    self.header_buf[0],
                    self.header_buf[1],
                    self.header_buf[2],
                    self.header_buf[3],
                ]);
                let expected = self.kind.magic();
                if found != expected {
                    let e = FormatError::BadMagic { expected, found };
                    self.failed = Some(e.clone());
                    return Err(e);
                }
            }

            if self.offset == header_len {
                let header = IdxHeader::decode(self.kind, &self.header_buf[..header_len]);
                if let Some(n) = header.expected_payload_len() {
                    self.records.reserve(n.min(MAX_PREALLOCATED_RECORDS));
                }
                self.header = Some(header);
            }
        }

        self.records.extend_from_slice(rest);
        self.offset += rest.len();
        Ok(())
    }

    /// End of stream: the header must be complete and the payload must hold
    /// at least the records the header announced. Bytes past that are kept
    /// as records.
    pub fn finish(self) -> std::result::Result<IdxArchive, FormatError> {
        if let Some(e) = self.failed {
            return Err(e);
        }
        let header = self.header.ok_or(FormatError::TruncatedHeader {
            needed: self.kind.header_len(),
            got: self.offset,
        })?;
        let expected = header.expected_payload_len().unwrap_or(usize::MAX);
        let got = self.records.len();
        if got < expected {
            return Err(FormatError::PayloadLength { expected, got });
        }
        if got > expected {
            warn!("{:?} archive carries {} bytes past its {} announced records", self.kind, got - expected, expected);
        }
        Ok(IdxArchive { header, records: self.records })
    }
}

/// Parse an in-memory archive delivered as a single chunk.
pub fn parse_bytes(kind: ArchiveKind, data: &[u8]) -> Result<IdxArchive> {
    parse_chunks(kind, std::iter::once(data))
}

/// Parse an archive delivered as an arbitrary sequence of chunks.
pub fn parse_chunks<'a, I>(kind: ArchiveKind, chunks: I) -> Result<IdxArchive>
where
    I: IntoIterator<Item = &'a [u8]>,
{
    let mut parser = RecordParser::new(kind);
    for chunk in chunks {
        parser.push_chunk(chunk)?;
    }
    Ok(parser.finish()?)
}

/// Stream `reader` through the parser `chunk_size` bytes at a time.
/// `origin` only labels I/O errors.
pub async fn parse_reader<R>(mut reader: R, kind: ArchiveKind, chunk_size: usize, origin: &Path) -> Result<IdxArchive>
where
    R: AsyncRead + Unpin,
{
    let mut parser = RecordParser::new(kind);
    let mut buf = vec![0u8; chunk_size.max(1)];
    let mut chunks = 0usize;
    loop {
        let n = reader
            .read(&mut buf)
            .await
            .map_err(|e| MnistError::io(origin, e))?;
        if n == 0 {
            break;
        }
        parser.push_chunk(&buf[..n])?;
        chunks += 1;
    }
    let archive = parser.finish()?;
    debug!(
        "{}: {:?} archive, count={}, dims={:?}, {} records in {} chunks",
        origin.display(),
        kind,
        archive.header.count,
        archive.header.dims,
        archive.records.len(),
        chunks
    );
    Ok(archive)
}

/// Parse a decompressed archive on disk.
pub async fn parse_file(path: impl Into<PathBuf>, kind: ArchiveKind, chunk_size: usize) -> Result<IdxArchive> {
    let path = path.into();
    let file = tokio::fs::File::open(&path)
        .await
        .map_err(|e| MnistError::io(&path, e))?;
    parse_reader(file, kind, chunk_size, &path).await
}
