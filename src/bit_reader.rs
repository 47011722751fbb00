//! Bit-level reader for DEFLATE decoding.
//!
//! DEFLATE packs header fields and extra bits least-significant-bit first,
//! while Huffman codes are walked one bit at a time by the caller. The
//! reader therefore exposes single-bit reads alongside multi-bit reads.

use crate::error::{Error, ErrorKind, Position, Result};

/// Bit reader for LSB-first bit streams.
///
/// The cursor advances eagerly: once bit 7 of a byte is consumed the cursor
/// points at bit 0 of the next byte. Reads past the end of the input yield
/// zero bits without failing; callers that need real data check
/// [`BitReader::at_end`] or use the length-checked byte reads.
pub struct BitReader<'a> {
    data: &'a [u8],
    byte: usize,
    bit: u8,
}

impl<'a> BitReader<'a> {
    /// Create a new bit reader from a byte slice.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            byte: 0,
            bit: 0,
        }
    }

    /// Read a single bit (0 or 1).
    #[inline]
    pub fn read_bit(&mut self) -> u32 {
        let value = match self.data.get(self.byte) {
            Some(&b) => u32::from((b >> self.bit) & 1),
            None => 0,
        };
        self.bit += 1;
        if self.bit == 8 {
            self.bit = 0;
            self.byte += 1;
        }
        value
    }

    /// Read `n` bits LSB-first; the first bit read is bit 0 of the result.
    #[inline]
    pub fn read_bits(&mut self, n: u8) -> u32 {
        debug_assert!(n <= 32);
        let mut value = 0u32;
        for shift in 0..n {
            value |= self.read_bit() << shift;
        }
        value
    }

    /// Whether the cursor has moved past the last input byte.
    #[inline]
    pub fn at_end(&self) -> bool {
        self.byte >= self.data.len()
    }

    /// Align to byte boundary (discard remaining bits in current byte).
    pub fn align_to_byte(&mut self) {
        if self.bit > 0 {
            self.bit = 0;
            self.byte += 1;
        }
    }

    /// Read a little-endian u16 directly (assumes byte-aligned).
    pub fn read_u16_le(&mut self) -> Result<u16> {
        let bytes = self.read_bytes(2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    /// Borrow the next `len` bytes directly (assumes byte-aligned).
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        debug_assert_eq!(self.bit, 0, "byte read on unaligned cursor");
        if self.remaining_bytes() < len {
            return Err(self.error(ErrorKind::UnexpectedEndOfStream));
        }
        let data = self.data;
        let bytes = &data[self.byte..self.byte + len];
        self.byte += len;
        Ok(bytes)
    }

    /// Current cursor position.
    pub fn position(&self) -> Position {
        Position {
            byte: self.byte,
            bit: self.bit,
        }
    }

    /// Whole bytes at or after the cursor, counting a partially read byte.
    pub fn remaining_bytes(&self) -> usize {
        self.data.len().saturating_sub(self.byte)
    }

    /// Build an error of `kind` at the current cursor.
    pub fn error(&self, kind: ErrorKind) -> Error {
        Error::new(kind, self.position())
    }
}
