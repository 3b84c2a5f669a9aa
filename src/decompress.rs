//! Zstandard decompression for .rec replay files.
//!
//! The decompressor turns the on-disk byte stream into the one logical byte
//! sequence the header parser and marker dispatcher operate on. Replay
//! bodies are small (tens of megabytes decompressed), so the whole body is
//! buffered and served as a slice; chunk boundaries are invisible to
//! callers.
//!
//! # Usage
//!
//! ```no_run
//! use rec_parser::decompress::decompress_body;
//!
//! let data = std::fs::read("round.rec").unwrap();
//! let body = decompress_body(&data).unwrap();
//! println!("Decompressed {} bytes", body.len());
//! ```

use std::io::Read;

use log::debug;

use crate::error::{ParserError, Result};
use crate::format::{detect_body_format, BodyFormat};

/// Decompresses a .rec file into one contiguous buffer.
///
/// Legacy files hold a single zstd stream; chunked files hold a
/// concatenation of frames flushed during recording. Either way the result
/// is the decompressed header-plus-body sequence, delivered in order with
/// EOF reported exactly once by virtue of being a plain `Vec<u8>`.
///
/// # Errors
///
/// Returns `ParserError::DecompressionError` on a malformed or truncated
/// frame. No partial buffer is produced.
pub fn decompress_body(data: &[u8]) -> Result<Vec<u8>> {
    let format = detect_body_format(data);
    debug!("replay body format: {format:?} ({} bytes on disk)", data.len());

    match format {
        BodyFormat::Legacy => zstd::stream::decode_all(data).map_err(|e| {
            ParserError::DecompressionError {
                reason: format!("legacy stream: {e}"),
            }
        }),
        BodyFormat::Chunked => decompress_chunked(data),
    }
}

/// Decompresses a concatenation of zstd frames into one buffer.
fn decompress_chunked(data: &[u8]) -> Result<Vec<u8>> {
    let mut decoder =
        zstd::stream::read::Decoder::new(data).map_err(|e| ParserError::DecompressionError {
            reason: format!("decoder init: {e}"),
        })?;

    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(|e| ParserError::DecompressionError {
            reason: format!("chunked stream: {e}"),
        })?;

    debug!("decompressed {} bytes from chunked body", out.len());
    Ok(out)
}
