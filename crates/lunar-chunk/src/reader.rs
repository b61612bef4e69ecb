//! Cursor over an in-memory chunk buffer
//!
//! All multi-byte reads are little-endian, matching the on-disk format.
//! Every read is bounds-checked; running past the end of the buffer yields
//! [`ChunkError::TruncatedInput`] instead of panicking.

use crate::error::{ChunkError, Result};

/// Read cursor over an immutable byte buffer
///
/// The buffer is borrowed, never copied; the cursor only advances an offset.
/// Independent readers over shared buffers are safe to run concurrently.
#[derive(Debug)]
pub struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    /// Create a reader positioned at the start of `data`
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current read offset from the start of the buffer
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left in the buffer
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Read and consume the next `n` bytes
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self.pos.checked_add(n).ok_or(ChunkError::TruncatedInput)?;
        if end > self.data.len() {
            return Err(ChunkError::TruncatedInput);
        }
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    /// Read one byte
    pub fn read_byte(&mut self) -> Result<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    /// Read a little-endian u32
    pub fn read_u32(&mut self) -> Result<u32> {
        let bytes = self.read_bytes(4)?;
        Ok(u32::from_le_bytes(bytes.try_into().unwrap()))
    }

    /// Read a little-endian u64
    pub fn read_u64(&mut self) -> Result<u64> {
        let bytes = self.read_bytes(8)?;
        Ok(u64::from_le_bytes(bytes.try_into().unwrap()))
    }

    /// Read an 8-byte signed integer (the u64 bits reinterpreted)
    pub fn read_i64(&mut self) -> Result<i64> {
        Ok(self.read_u64()? as i64)
    }

    /// Read an 8-byte IEEE-754 double (the u64 bits reinterpreted)
    pub fn read_f64(&mut self) -> Result<f64> {
        Ok(f64::from_bits(self.read_u64()?))
    }

    /// Read a length-prefixed string
    ///
    /// One prefix byte: 0 is the empty string, 0xFF means the real length
    /// follows as a little-endian u64, anything else encodes the length
    /// directly. The encoded length counts one byte more than the payload
    /// (the format reserves space for a trailing NUL it never writes).
    pub fn read_string(&mut self) -> Result<String> {
        let mut size = self.read_byte()? as u64;
        if size == 0 {
            return Ok(String::new());
        }
        if size == 0xFF {
            size = self.read_u64()?;
        }
        // An encoded length of 0 after the escape byte cannot describe any
        // payload; a length near u64::MAX cannot fit in memory either way.
        let n = size
            .checked_sub(1)
            .and_then(|n| usize::try_from(n).ok())
            .ok_or(ChunkError::TruncatedInput)?;
        let bytes = self.read_bytes(n)?;
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }
}
