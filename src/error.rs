//! Error types for the .rec replay parser.
//!
//! This module defines the error hierarchy for all failure cases during
//! replay parsing: I/O failures, zstandard decompression failures, malformed
//! fields inside records, and truncated data.
//!
//! Unknown enum identifiers (operators, maps, feedback sub-types) are *not*
//! errors; they degrade to the corresponding `Unknown` variants.

use thiserror::Error;

/// The main error type for .rec replay parsing operations.
///
/// Errors split into two families:
/// - **Terminal**: decompression failures and reader underflow. The scan
///   cannot continue past these.
/// - **Recoverable**: a single malformed record. The dispatcher logs the
///   error with offset context and resumes scanning.
///
/// # Example
///
/// ```
/// use rec_parser::error::{ParserError, Result};
///
/// fn example_operation() -> Result<()> {
///     Err(ParserError::MalformedField {
///         reason: "string length prefix out of range".to_string(),
///     })
/// }
/// ```
#[derive(Error, Debug)]
pub enum ParserError {
    /// An I/O error occurred while reading the replay file.
    ///
    /// This wraps standard library I/O errors for seamless error propagation
    /// using the `?` operator.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The replay header is malformed or contains invalid data.
    ///
    /// Returned when the key/value header section fails validation, for
    /// example when the leading `version` key is missing.
    #[error("Invalid header: {reason}")]
    InvalidHeader {
        /// A description of what makes the header invalid.
        reason: String,
    },

    /// Decompression of the replay body failed.
    ///
    /// The .rec body is one or more concatenated zstandard frames. This
    /// error occurs when a frame is corrupt or truncated. No partial round
    /// document is produced.
    #[error("Decompression failed: {reason}")]
    DecompressionError {
        /// A description of the decompression failure.
        reason: String,
    },

    /// The data ended before the required bytes could be read.
    ///
    /// Inside a record parser this terminates the body scan; everything
    /// collected before the failure is kept and the round still resolves.
    #[error("Unexpected end of data: expected {expected} bytes, but only {available} available")]
    UnexpectedEof {
        /// The number of bytes that were expected to be available.
        expected: usize,
        /// The actual number of bytes available.
        available: usize,
    },

    /// A field inside a record failed a sanity check.
    ///
    /// Length prefixes outside bounds, non-UTF-8 string payloads and numeric
    /// values past their sanity caps all land here. Recoverable at record
    /// granularity: the dispatcher skips the record and resumes scanning.
    #[error("Malformed field: {reason}")]
    MalformedField {
        /// A description of the failed sanity check.
        reason: String,
    },
}

impl ParserError {
    /// Creates an `UnexpectedEof` error with the given sizes.
    #[must_use]
    pub fn unexpected_eof(expected: usize, available: usize) -> Self {
        ParserError::UnexpectedEof {
            expected,
            available,
        }
    }

    /// Creates a `MalformedField` error from anything displayable.
    #[must_use]
    pub fn malformed(reason: impl Into<String>) -> Self {
        ParserError::MalformedField {
            reason: reason.into(),
        }
    }

    /// Returns whether the body scan may continue after this error.
    ///
    /// Malformed records are skipped; underflow, decompression and I/O
    /// failures end the scan.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ParserError::MalformedField { .. } | ParserError::InvalidHeader { .. }
        )
    }
}

/// A specialized Result type for .rec parsing operations.
///
/// This is a convenience alias that uses `ParserError` as the error type.
pub type Result<T> = std::result::Result<T, ParserError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parser_error_display() {
        let err = ParserError::IoError(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "file not found",
        ));
        assert!(err.to_string().contains("I/O error"));

        let err = ParserError::InvalidHeader {
            reason: "missing version key".to_string(),
        };
        assert!(err.to_string().contains("Invalid header"));
        assert!(err.to_string().contains("missing version key"));

        let err = ParserError::DecompressionError {
            reason: "invalid zstd frame".to_string(),
        };
        assert!(err.to_string().contains("Decompression failed"));

        let err = ParserError::unexpected_eof(128, 64);
        assert!(err.to_string().contains("expected 128 bytes"));
        assert!(err.to_string().contains("64 available"));

        let err = ParserError::malformed("length prefix 70000 exceeds cap");
        assert!(err.to_string().contains("Malformed field"));
    }

    #[test]
    fn test_recoverability_split() {
        assert!(ParserError::malformed("bad length").is_recoverable());
        assert!(ParserError::InvalidHeader {
            reason: "x".to_string()
        }
        .is_recoverable());

        assert!(!ParserError::unexpected_eof(4, 0).is_recoverable());
        assert!(!ParserError::DecompressionError {
            reason: "x".to_string()
        }
        .is_recoverable());
    }

    #[test]
    fn test_error_is_send_sync() {
        // Rounds of one match may be parsed in parallel.
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ParserError>();
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::Other, "test error");
        let parser_err: ParserError = io_err.into();
        assert!(matches!(parser_err, ParserError::IoError(_)));
    }

    #[test]
    fn test_result_type_alias() {
        fn returns_result() -> Result<u32> {
            Ok(42)
        }
        assert_eq!(returns_result().unwrap(), 42);
    }
}
