//! Canonical Huffman decoding tables.
//!
//! A table is described entirely by the code length of each symbol. Codes of
//! equal length are assigned consecutively in increasing symbol order, so the
//! decoder only needs the number of codes per length and the symbols sorted
//! by (length, symbol). Decoding walks the code one bit at a time, which
//! keeps construction cheap enough to redo for every dynamic block.

use crate::bit_reader::BitReader;
use crate::error::{Error, ErrorKind, Position, Result};

/// Maximum code length for DEFLATE Huffman codes.
pub const MAX_BITS: usize = 15;

/// Maximum number of symbols in one table. Symbols and per-length counts are
/// stored as `u16`.
pub const MAX_SYMBOLS: usize = u16::MAX as usize;

/// How much of the code space a table assigns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completeness {
    /// No symbol has a code. Valid for unused alphabets.
    Empty,
    /// Every bit pattern up to the longest length maps to a symbol.
    Complete,
    /// Some code space is unassigned; those patterns fail to decode.
    Incomplete,
}

/// Huffman decoding table in canonical `count`/`symbol` form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanTable {
    /// Number of symbols per code length. `count[0]` holds unused symbols.
    count: [u16; MAX_BITS + 1],
    /// Used symbols ordered by (code length, symbol value).
    symbol: Vec<u16>,
    completeness: Completeness,
}

impl HuffmanTable {
    /// Build a table from per-symbol code lengths (0 = unused).
    ///
    /// Fails with [`ErrorKind::OversubscribedCode`] if the lengths claim
    /// more codes than fit, or if any length exceeds [`MAX_BITS`], and with
    /// [`ErrorKind::TooManySymbols`] for more than [`MAX_SYMBOLS`] lengths.
    /// Errors carry [`Position::default`] since no input is involved.
    pub fn from_lengths(lengths: &[u8]) -> Result<Self> {
        Self::build(lengths, Position::default())
    }

    /// Like [`HuffmanTable::from_lengths`], but reports the error at `position`.
    pub(crate) fn build(lengths: &[u8], position: Position) -> Result<Self> {
        let fail = |kind| Error::new(kind, position);

        if lengths.len() > MAX_SYMBOLS {
            return Err(fail(ErrorKind::TooManySymbols {
                count: lengths.len(),
            }));
        }

        let mut count = [0u16; MAX_BITS + 1];
        for &len in lengths {
            let len = len as usize;
            if len > MAX_BITS {
                return Err(fail(ErrorKind::OversubscribedCode));
            }
            count[len] += 1;
        }

        if code_space_left(&count) < 0 {
            return Err(fail(ErrorKind::OversubscribedCode));
        }

        // Offset of the first symbol of each length in `symbol`
        let mut offsets = [0usize; MAX_BITS + 1];
        for len in 1..MAX_BITS {
            offsets[len + 1] = offsets[len] + count[len] as usize;
        }

        let used = lengths.len() - count[0] as usize;
        let mut symbol = vec![0u16; used];
        for (sym, &len) in lengths.iter().enumerate() {
            if len > 0 {
                symbol[offsets[len as usize]] = sym as u16;
                offsets[len as usize] += 1;
            }
        }

        Ok(Self::from_canonical(count, symbol))
    }

    /// Assemble a table from per-length counts and symbols already in
    /// canonical order.
    ///
    /// The caller guarantees the counts fit the code space and sum (from
    /// length 1) to `symbol.len()`.
    pub(crate) fn from_canonical(count: [u16; MAX_BITS + 1], symbol: Vec<u16>) -> Self {
        let completeness = if symbol.is_empty() {
            Completeness::Empty
        } else if code_space_left(&count) > 0 {
            Completeness::Incomplete
        } else {
            Completeness::Complete
        };

        Self {
            count,
            symbol,
            completeness,
        }
    }

    /// Decode one symbol, consuming one bit per code length step.
    ///
    /// Codes are read most-significant-bit first, the reverse of the order
    /// used for header fields.
    pub fn decode(&self, reader: &mut BitReader) -> Result<u16> {
        let mut code: i32 = 0; // bits read so far
        let mut first: i32 = 0; // first code of the current length
        let mut index: i32 = 0; // index of that code in `symbol`

        for len in 1..=MAX_BITS {
            code |= reader.read_bit() as i32;
            let count = self.count[len] as i32;
            if code - count < first {
                return Ok(self.symbol[(index + code - first) as usize]);
            }
            index += count;
            first += count;
            first <<= 1;
            code <<= 1;
        }

        Err(reader.error(ErrorKind::InvalidHuffmanCode))
    }

    /// Whether the table is empty, complete or incomplete.
    pub fn completeness(&self) -> Completeness {
        self.completeness
    }

    /// Number of codes of each length, indexed by length.
    pub fn counts(&self) -> &[u16; MAX_BITS + 1] {
        &self.count
    }

    /// Symbols in canonical order.
    pub fn symbols(&self) -> &[u16] {
        &self.symbol
    }

    /// Whether no symbol has a code.
    pub fn is_empty(&self) -> bool {
        self.symbol.is_empty()
    }
}

/// Unassigned codes left after giving each length its `count` codes.
/// Negative when the lengths are oversubscribed.
fn code_space_left(count: &[u16; MAX_BITS + 1]) -> i32 {
    // Each extra bit doubles the available codes
    let mut left: i32 = 1;
    for &n in &count[1..] {
        left = (left << 1) - n as i32;
        if left < 0 {
            return left;
        }
    }
    left
}
