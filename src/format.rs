//! Body-format detection for .rec replay files.
//!
//! A .rec file is zstandard-compressed from the first byte: the decompressed
//! stream holds the key/value header section followed by the record body.
//! Two on-disk variants exist:
//!
//! - **Legacy**: a single zstd stream covering the whole file.
//! - **Chunked**: a concatenation of independent zstd frames, each starting
//!   with the standard frame magic.
//!
//! Detection scans for a second frame magic at least
//! [`CHUNK_SCAN_DISTANCE`] bytes past the first; real frames are never that
//! small, so a second magic close to the first would be compressed payload,
//! not a boundary.
//!
//! # Example
//!
//! ```
//! use rec_parser::format::{detect_body_format, BodyFormat, ZSTD_MAGIC};
//!
//! let mut legacy = ZSTD_MAGIC.to_vec();
//! legacy.extend_from_slice(&[0u8; 64]);
//! assert_eq!(detect_body_format(&legacy), BodyFormat::Legacy);
//! ```

/// The zstandard frame magic (0xFD2FB528 little-endian).
pub const ZSTD_MAGIC: [u8; 4] = [0x28, 0xB5, 0x2F, 0xFD];

/// Minimum distance past the first frame magic at which a second magic is
/// treated as a chunk boundary.
pub const CHUNK_SCAN_DISTANCE: usize = 100;

/// The on-disk compression layout of a .rec file.
///
/// Chunk boundaries are invisible to everything above the decompressor;
/// both variants yield one logical byte sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyFormat {
    /// A single zstd stream (older game builds).
    Legacy,
    /// A concatenation of zstd frames flushed during recording.
    Chunked,
}

/// Detects whether the file is a legacy single-stream or chunked replay.
///
/// Files that do not start with the zstd magic are reported as `Legacy`;
/// the decompressor surfaces the real error with frame context.
#[must_use]
pub fn detect_body_format(data: &[u8]) -> BodyFormat {
    if data.len() < ZSTD_MAGIC.len() || data[..ZSTD_MAGIC.len()] != ZSTD_MAGIC {
        return BodyFormat::Legacy;
    }

    let scan_from = CHUNK_SCAN_DISTANCE;
    if data.len() <= scan_from + ZSTD_MAGIC.len() {
        return BodyFormat::Legacy;
    }

    let found = data[scan_from..]
        .windows(ZSTD_MAGIC.len())
        .any(|w| w == ZSTD_MAGIC);
    if found {
        BodyFormat::Chunked
    } else {
        BodyFormat::Legacy
    }
}
