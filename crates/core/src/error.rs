//! Error types for the bandblur pipeline.
//!
//! All operations return structured errors rather than panicking.
//! Every error is fatal to the run: there is no retry and no
//! partial-success mode. A failed run writes no output file.

use thiserror::Error;

/// Top-level error type for all operations in the system.
///
/// Each variant corresponds to a specific failure domain:
/// - Codec: bitmap decoding/encoding failures
/// - Raster: raster construction and row addressing failures
/// - Band: band wire-frame validation failures
/// - Config: invalid run parameters (e.g. zero workers)
/// - Transfer: transport failures between group members
/// - CRC: band payload corruption detected
/// - I/O: file system operations
#[derive(Debug, Error)]
pub enum Error {
    /// Bitmap decode or encode failed (bad header, truncated data)
    #[error("bitmap codec error: {0}")]
    Codec(#[from] CodecError),

    /// Raster construction or row addressing failed
    #[error("raster error: {0}")]
    Raster(#[from] RasterError),

    /// Band wire frame failed validation
    #[error("band error: {0}")]
    Band(#[from] BandError),

    /// Invalid run configuration
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Transport failure between group members
    #[error("transfer error: {0}")]
    Transfer(#[from] TransferError),

    /// CRC validation failed, indicating band corruption in transit
    #[error("CRC mismatch: expected {expected:#010x}, got {actual:#010x}")]
    Crc { expected: u32, actual: u32 },

    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Bitmap codec errors.
///
/// Any of these aborts the run before a single band is distributed:
/// a partial or degenerate image cannot be safely partitioned.
#[derive(Debug, Error)]
pub enum CodecError {
    /// File does not start with the "BM" marker
    #[error("invalid bitmap magic: expected {expected:?}, got {actual:?}")]
    InvalidMagic { expected: [u8; 2], actual: [u8; 2] },

    /// Buffer ends before the headers do
    #[error("bitmap too short: need at least {required} bytes, got {actual}")]
    TooShort { required: usize, actual: usize },

    /// Only 24-bit pixels are supported
    #[error("unsupported bit depth: {0} (only 24-bit supported)")]
    UnsupportedBitDepth(u16),

    /// Only uncompressed images are supported
    #[error("unsupported compression mode: {0}")]
    UnsupportedCompression(u32),

    /// Declared dimensions are unusable (zero or negative width)
    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: i32, height: i32 },

    /// Pixel data ends before the declared dimensions are satisfied
    #[error("truncated pixel data: need {required} bytes from offset {offset}, got {actual}")]
    TruncatedPixelData {
        required: usize,
        offset: usize,
        actual: usize,
    },
}

/// Raster construction and addressing errors.
#[derive(Debug, Error)]
pub enum RasterError {
    /// Zero width or height
    #[error("empty raster: {width}x{height}")]
    EmptyDimensions { width: usize, height: usize },

    /// width * height does not fit in memory arithmetic
    #[error("raster too large: {width}x{height} overflows pixel count")]
    Oversize { width: usize, height: usize },

    /// Supplied pixel buffer does not match width * height
    #[error("pixel count mismatch: expected {expected}, got {actual}")]
    PixelCountMismatch { expected: usize, actual: usize },

    /// Row range falls outside the raster
    #[error("row range {start}..{end} out of bounds for height {height}")]
    RowsOutOfBounds {
        start: usize,
        end: usize,
        height: usize,
    },

    /// Buffer written into rows is not a whole number of rows
    #[error("row data length {len} is not a multiple of width {width}")]
    RaggedRows { len: usize, width: usize },
}

/// Band wire-frame errors.
#[derive(Debug, Error)]
pub enum BandError {
    /// Invalid magic number in the band header
    #[error("invalid band magic: expected {expected:?}, got {actual:?}")]
    InvalidMagic { expected: [u8; 2], actual: [u8; 2] },

    /// Frame is too short to contain a valid header
    #[error("band frame too short: need at least {required} bytes, got {actual}")]
    FrameTooShort { required: usize, actual: usize },

    /// Payload length doesn't match the header's row_count * width
    #[error("payload length mismatch: header says {expected}, got {actual}")]
    PayloadLengthMismatch { expected: usize, actual: usize },

    /// Header declares a band with no pixels
    #[error("empty band: {rows} rows x {width} columns")]
    EmptyBand { rows: usize, width: usize },

    /// Returned band doesn't match the rows its worker was assigned
    #[error(
        "unexpected band geometry: assigned {expected_rows} rows at row {expected_start}, \
         got {actual_rows} rows at row {actual_start}"
    )]
    UnexpectedGeometry {
        expected_start: usize,
        expected_rows: usize,
        actual_start: usize,
        actual_rows: usize,
    },
}

/// Run configuration errors.
///
/// Checked before any partition arithmetic is attempted.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No workers to assign rows to (would divide by zero)
    #[error("worker count must be at least 1")]
    ZeroWorkers,

    /// More workers than image rows; every band would be empty
    #[error("cannot split {height} rows across {workers} workers")]
    WorkersExceedRows { workers: usize, height: usize },
}

/// Transport errors.
///
/// The reference transfer model is blocking with no timeout, so the only
/// failures are structural: a peer that no longer exists.
#[derive(Debug, Error)]
pub enum TransferError {
    /// Target or source rank is not a member of the group
    #[error("rank {rank} is not a member of a group of {group_size}")]
    InvalidPeer { rank: usize, group_size: usize },

    /// A rank cannot address itself
    #[error("rank {0} attempted a self transfer")]
    SelfTransfer(usize),

    /// Peer's endpoint was dropped; the group is aborting
    #[error("peer {rank} disconnected")]
    Disconnected { rank: usize },
}

/// Type alias for Result with our Error type
pub type Result<T> = std::result::Result<T, Error>;
