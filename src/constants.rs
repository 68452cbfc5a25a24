// src/constants.rs
//
// Centralized constants for mnistdl to avoid hardcoded values throughout the codebase

/// Magic number opening every label archive (big-endian u32)
pub const LABEL_MAGIC: u32 = 2049;

/// Magic number opening every image archive (big-endian u32)
pub const IMAGE_MAGIC: u32 = 2051;

/// Label header: magic + count
pub const LABEL_HEADER_LEN: usize = 8;

/// Image header: magic + count + rows + columns
pub const IMAGE_HEADER_LEN: usize = 16;

/// Largest header of any archive kind
pub const MAX_HEADER_LEN: usize = IMAGE_HEADER_LEN;

/// Side length of one digit image in pixels
pub const IMAGE_SIDE: usize = 28;

/// Number of records (pixels) making up one image sample (784)
pub const IMAGE_SIZE: usize = IMAGE_SIDE * IMAGE_SIDE;

/// Number of digit classes
pub const NUM_CLASSES: usize = 10;

// ============================================================================
// Remote archive layout
// ============================================================================

/// Default base URL the four archives are fetched from.
///
/// The original host (yann.lecun.com/exdb/mnist/) now rejects anonymous
/// downloads; this mirror serves byte-identical archives.
pub const DEFAULT_BASE_URL: &str = "https://ossci-datasets.s3.amazonaws.com/mnist/";

/// Suffix carried by every compressed archive, both remote and in the cache
pub const COMPRESSED_SUFFIX: &str = ".gz";

/// Suffix for in-progress downloads and decompressions
pub const PARTIAL_SUFFIX: &str = ".part";

pub const TRAIN_IMAGES_FILE: &str = "train-images-idx3-ubyte";
pub const TRAIN_LABELS_FILE: &str = "train-labels-idx1-ubyte";
pub const TEST_IMAGES_FILE: &str = "t10k-images-idx3-ubyte";
pub const TEST_LABELS_FILE: &str = "t10k-labels-idx1-ubyte";

// ============================================================================
// Local cache / read tuning
// ============================================================================

/// Default cache directory, relative to the working directory
pub const DEFAULT_DATA_DIR: &str = "./data/";

/// Chunk size used when streaming a decompressed archive into the parser (32 KiB)
pub const DEFAULT_READ_CHUNK_SIZE: usize = 32 * 1024;

/// Buffer size for the gzip copy loop (64 KiB)
pub const DEFAULT_DECOMPRESS_BUFFER_SIZE: usize = 64 * 1024;

/// Upper bound on the up-front allocation a header may request (64 MiB).
/// Larger payloads still parse; the vector simply grows as chunks arrive.
pub const MAX_PREALLOCATED_RECORDS: usize = 64 * 1024 * 1024;

/// Default connect timeout for the archive transport (seconds)
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default whole-request timeout for the archive transport (seconds)
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 300;

// ============================================================================
// Environment overrides
// ============================================================================

pub const ENV_DATA_DIR: &str = "MNISTDL_DATA_DIR";
pub const ENV_BASE_URL: &str = "MNISTDL_BASE_URL";
pub const ENV_READ_CHUNK: &str = "MNISTDL_READ_CHUNK";
