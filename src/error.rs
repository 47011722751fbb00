//! Error types for the rinflate library.

use std::fmt;

use thiserror::Error;

/// Result type alias for rinflate operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Cursor location inside the compressed input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    /// Index of the byte holding the next unread bit.
    pub byte: usize,
    /// Bit within that byte, 0 being the least significant.
    pub bit: u8,
}

impl Position {
    /// Absolute bit offset from the start of the input.
    pub fn bit_offset(&self) -> usize {
        self.byte * 8 + self.bit as usize
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "byte {}, bit {}", self.byte, self.bit)
    }
}

/// The reason a decode failed.
///
/// Every kind is fatal: DEFLATE has no resynchronization points, so the
/// session stops at the first violation.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Bits or bytes were required but the input is exhausted.
    #[error("unexpected end of stream")]
    UnexpectedEndOfStream,
    /// Block header carried the reserved type `11`.
    #[error("invalid block type 3")]
    InvalidBlockType,
    /// Stored block `NLEN` is not the one's complement of `LEN`.
    #[error("stored block LEN/NLEN mismatch")]
    LengthMismatch,
    /// Code lengths claim more codes than the bit budget allows.
    #[error("oversubscribed Huffman code")]
    OversubscribedCode,
    /// Bit sequence matches no code in the table.
    #[error("invalid Huffman code")]
    InvalidHuffmanCode,
    /// Literal/length symbol 286/287 or distance symbol 30/31.
    #[error("invalid symbol {0}")]
    InvalidSymbol(u16),
    /// Back-reference reaches before the start of the output.
    #[error("distance {distance} exceeds output length {available}")]
    DistanceExceedsOutput {
        /// Decoded distance.
        distance: usize,
        /// Bytes produced so far.
        available: usize,
    },
    /// Repeat-previous instruction with no previous length.
    #[error("repeat instruction with no preceding length")]
    NoPrecedingLength,
    /// Code-length repeats overflow the declared `HLIT + HDIST` total.
    #[error("too many code lengths")]
    TooManyLengths,
    /// Dynamic block assigns no code to the end-of-block symbol.
    #[error("missing end-of-block symbol")]
    MissingEndOfBlockSymbol,
    /// `HLIT` or `HDIST` is above the format maximum.
    #[error("invalid table size: {literals} literal/length, {distances} distance codes")]
    InvalidTableSize {
        /// Declared literal/length code count.
        literals: usize,
        /// Declared distance code count.
        distances: usize,
    },
    /// More code lengths than a table can index.
    #[error("too many symbols for a Huffman table: {count}")]
    TooManySymbols {
        /// Number of code lengths supplied.
        count: usize,
    },
    /// Output would grow beyond the configured limit.
    #[error("output exceeds limit of {limit} bytes")]
    OutputLimitExceeded {
        /// Configured maximum output size.
        limit: usize,
    },
}

/// A failed decode: what went wrong and where in the input.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("{kind} at {position}")]
pub struct Error {
    kind: ErrorKind,
    position: Position,
}

impl Error {
    /// Create an error of `kind` detected at `position`.
    pub fn new(kind: ErrorKind, position: Position) -> Self {
        Self { kind, position }
    }

    /// The reason for the failure.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Cursor position when the failure was detected.
    pub fn position(&self) -> Position {
        self.position
    }
}
