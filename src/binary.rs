//! Binary reading utilities for parsing decompressed .rec replay data.
//!
//! This module provides [`ByteReader`], a cursor over the decompressed
//! replay body. It decodes little-endian integers and floats, 4-byte
//! length-prefixed UTF-8 strings, and raw byte slices, while tracking the
//! current absolute offset. Record parsers use the offset for the
//! marker-local arithmetic the ammo and position records require, and
//! [`ByteReader::peek_back`] to read the bytes that preceded the marker they
//! were invoked on.
//!
//! # Endianness
//!
//! All multi-byte values in a .rec replay are little-endian. The reader
//! handles the conversion automatically.
//!
//! # Example
//!
//! ```
//! use rec_parser::binary::ByteReader;
//!
//! let data = [0x05, 0x00, 0x00, 0x00, b'H', b'e', b'l', b'l', b'o', 0x2A];
//! let mut reader = ByteReader::new(&data);
//!
//! assert_eq!(reader.read_string().unwrap(), "Hello");
//! assert_eq!(reader.read_u8().unwrap(), 0x2A);
//! assert_eq!(reader.offset(), 10);
//! ```

use crate::error::{ParserError, Result};

/// Maximum accepted string length prefix.
///
/// Anything larger is treated as a corrupt prefix rather than a real string;
/// the longest legitimate strings in a replay are usernames and role
/// portrait URLs, far below this bound.
pub const MAX_STRING_LEN: usize = 4096;

/// A bounds-checked cursor over the decompressed replay body.
///
/// The reader is single-threaded; no operation suspends. Every read either
/// consumes the requested bytes or fails with
/// [`ParserError::UnexpectedEof`] without advancing.
#[derive(Debug)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> ByteReader<'a> {
    /// Creates a reader positioned at the start of `data`.
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    /// Returns the current absolute offset.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Returns the number of bytes left to read.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    /// Returns whether the reader has consumed all input.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.offset >= self.data.len()
    }

    /// Returns the underlying buffer.
    #[must_use]
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Moves the cursor to an absolute offset.
    ///
    /// # Errors
    ///
    /// Returns `ParserError::UnexpectedEof` if `offset` is past the end of
    /// the buffer.
    pub fn seek(&mut self, offset: usize) -> Result<()> {
        if offset > self.data.len() {
            return Err(ParserError::unexpected_eof(offset, self.data.len()));
        }
        self.offset = offset;
        Ok(())
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(ParserError::unexpected_eof(n, self.remaining()));
        }
        let slice = &self.data[self.offset..self.offset + n];
        self.offset += n;
        Ok(slice)
    }

    /// Reads a single byte.
    ///
    /// # Errors
    ///
    /// Returns `ParserError::UnexpectedEof` at end of input.
    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    /// Reads a little-endian u16.
    ///
    /// # Errors
    ///
    /// Returns `ParserError::UnexpectedEof` if fewer than 2 bytes remain.
    pub fn read_u16(&mut self) -> Result<u16> {
        let s = self.take(2)?;
        Ok(u16::from_le_bytes([s[0], s[1]]))
    }

    /// Reads a little-endian u32.
    ///
    /// # Errors
    ///
    /// Returns `ParserError::UnexpectedEof` if fewer than 4 bytes remain.
    pub fn read_u32(&mut self) -> Result<u32> {
        let s = self.take(4)?;
        Ok(u32::from_le_bytes([s[0], s[1], s[2], s[3]]))
    }

    /// Reads a little-endian u64.
    ///
    /// # Errors
    ///
    /// Returns `ParserError::UnexpectedEof` if fewer than 8 bytes remain.
    pub fn read_u64(&mut self) -> Result<u64> {
        let s = self.take(8)?;
        Ok(u64::from_le_bytes([
            s[0], s[1], s[2], s[3], s[4], s[5], s[6], s[7],
        ]))
    }

    /// Reads a little-endian IEEE-754 f32.
    ///
    /// NaN and infinity pass through unmodified; callers that feed the
    /// movement pipeline filter them.
    ///
    /// # Errors
    ///
    /// Returns `ParserError::UnexpectedEof` if fewer than 4 bytes remain.
    pub fn read_f32(&mut self) -> Result<f32> {
        let s = self.take(4)?;
        Ok(f32::from_le_bytes([s[0], s[1], s[2], s[3]]))
    }

    /// Reads a 4-byte length prefix followed by that many UTF-8 bytes.
    ///
    /// # Errors
    ///
    /// - `ParserError::UnexpectedEof` if the prefix or payload is truncated
    /// - `ParserError::MalformedField` if the prefix exceeds
    ///   [`MAX_STRING_LEN`] or the payload is not valid UTF-8
    pub fn read_string(&mut self) -> Result<String> {
        let len = self.read_u32()? as usize;
        if len > MAX_STRING_LEN {
            // Do not consume the bogus payload; the prefix itself is the lie.
            self.offset -= 4;
            return Err(ParserError::malformed(format!(
                "string length prefix {len} exceeds cap {MAX_STRING_LEN}"
            )));
        }
        if self.remaining() < len {
            self.offset -= 4;
            return Err(ParserError::unexpected_eof(len, self.remaining()));
        }
        let slice = self.take(len)?;
        String::from_utf8(slice.to_vec()).map_err(|e| {
            ParserError::malformed(format!(
                "invalid UTF-8 string at offset {}: {e}",
                self.offset - len
            ))
        })
    }

    /// Borrows `n` bytes and advances past them.
    ///
    /// # Errors
    ///
    /// Returns `ParserError::UnexpectedEof` on a short read.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        self.take(n)
    }

    /// Advances `n` bytes without copying.
    ///
    /// # Errors
    ///
    /// Returns `ParserError::UnexpectedEof` if fewer than `n` bytes remain.
    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.take(n).map(|_| ())
    }

    /// Returns the `n` bytes immediately before the current offset without
    /// moving the cursor.
    ///
    /// Record parsers are invoked with the cursor just past their marker;
    /// the ammo and position parsers use this to reach the entity id bytes
    /// that precede the marker.
    ///
    /// # Errors
    ///
    /// Returns `ParserError::UnexpectedEof` if fewer than `n` bytes precede
    /// the cursor.
    pub fn peek_back(&self, n: usize) -> Result<&'a [u8]> {
        if self.offset < n {
            return Err(ParserError::unexpected_eof(n, self.offset));
        }
        Ok(&self.data[self.offset - n..self.offset])
    }
}
