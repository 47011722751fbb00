//! DEFLATE decompression (RFC 1951).
//!
//! Decodes a complete raw DEFLATE stream held in memory. Container formats
//! (zlib, gzip) are left to the caller.

use crate::bit_reader::BitReader;
use crate::dynamic::read_dynamic_tables;
use crate::error::{ErrorKind, Result};
use crate::huffman::HuffmanTable;
use crate::tables::{distance_for_symbol, fixed_tables, length_for_symbol, END_OF_BLOCK};

/// Block compression type from the 2-bit `BTYPE` header field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockType {
    /// Uncompressed bytes preceded by `LEN`/`NLEN`.
    Stored,
    /// Huffman coded with the fixed tables.
    Fixed,
    /// Huffman coded with tables sent in the block header.
    Dynamic,
}

impl BlockType {
    /// Map the `BTYPE` field; the reserved value 3 has no block type.
    pub fn from_bits(bits: u32) -> Option<Self> {
        match bits {
            0 => Some(BlockType::Stored),
            1 => Some(BlockType::Fixed),
            2 => Some(BlockType::Dynamic),
            _ => None,
        }
    }
}

/// Options for [`Inflater`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InflateOptions {
    /// Expected decompressed size, used to pre-allocate the output.
    ///
    /// Defaults to four times the input length. Only affects allocation:
    /// the reservation is capped at 64 MiB and at `max_output`.
    pub size_hint: Option<usize>,
    /// Maximum number of output bytes before decoding fails with
    /// [`ErrorKind::OutputLimitExceeded`]. Unlimited by default.
    pub max_output: Option<usize>,
}

impl InflateOptions {
    /// Set the expected decompressed size.
    pub fn with_size_hint(mut self, size: usize) -> Self {
        self.size_hint = Some(size);
        self
    }

    /// Cap the decompressed size.
    pub fn with_max_output(mut self, limit: usize) -> Self {
        self.max_output = Some(limit);
        self
    }
}

/// Counters collected while decoding one stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InflateStats {
    /// Number of stored blocks.
    pub stored_blocks: usize,
    /// Number of fixed Huffman blocks.
    pub fixed_blocks: usize,
    /// Number of dynamic Huffman blocks.
    pub dynamic_blocks: usize,
    /// Literal bytes decoded from Huffman blocks.
    pub literals: usize,
    /// Length/distance back-references expanded.
    pub matches: usize,
    /// Input bytes up to and including the byte holding the last bit of
    /// the final block.
    pub consumed_bytes: usize,
    /// Input bytes after the final block. Not validated.
    pub trailing_bytes: usize,
}

impl InflateStats {
    /// Total number of blocks in the stream.
    pub fn blocks(&self) -> usize {
        self.stored_blocks + self.fixed_blocks + self.dynamic_blocks
    }
}

/// Reusable DEFLATE decoder configuration.
///
/// Each call to [`Inflater::inflate`] runs an independent session; an
/// `Inflater` can be shared across threads.
#[derive(Debug, Clone, Default)]
pub struct Inflater {
    options: InflateOptions,
}

impl Inflater {
    /// Create a decoder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a decoder with the given options.
    pub fn with_options(options: InflateOptions) -> Self {
        Self { options }
    }

    /// The options in effect.
    pub fn options(&self) -> &InflateOptions {
        &self.options
    }

    /// Decompress a complete raw DEFLATE stream.
    pub fn inflate(&self, data: &[u8]) -> Result<Vec<u8>> {
        self.inflate_with_stats(data).map(|(output, _)| output)
    }

    /// Decompress a complete raw DEFLATE stream and report block statistics.
    pub fn inflate_with_stats(&self, data: &[u8]) -> Result<(Vec<u8>, InflateStats)> {
        let mut session = Session::new(data, &self.options);
        session.run()?;
        Ok((session.output, session.stats))
    }

    /// Decompress independent streams, in parallel with the `parallel`
    /// feature. Results are in input order.
    pub fn inflate_all<S>(&self, streams: &[S]) -> Vec<Result<Vec<u8>>>
    where
        S: AsRef<[u8]> + Sync,
    {
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;

            streams
                .par_iter()
                .map(|stream| self.inflate(stream.as_ref()))
                .collect()
        }

        #[cfg(not(feature = "parallel"))]
        {
            streams
                .iter()
                .map(|stream| self.inflate(stream.as_ref()))
                .collect()
        }
    }
}

/// Decompress a complete raw DEFLATE stream with default options.
///
/// # Example
///
/// ```rust
/// let data = [0x4B, 0x4C, 0x4A, 0x4E, 0x49, 0x4D, 0x03];
/// assert_eq!(rinflate::inflate(&data).unwrap(), b"abcdef");
/// ```
pub fn inflate(data: &[u8]) -> Result<Vec<u8>> {
    Inflater::new().inflate(data)
}

/// Upper bound on the output capacity reserved before decoding starts.
const MAX_PREALLOCATION: usize = 64 * 1024 * 1024;

/// State of one decode: the input cursor and the growing output.
struct Session<'a> {
    reader: BitReader<'a>,
    output: Vec<u8>,
    max_output: Option<usize>,
    stats: InflateStats,
    input_len: usize,
}

impl<'a> Session<'a> {
    fn new(data: &'a [u8], options: &InflateOptions) -> Self {
        let mut capacity = options
            .size_hint
            .unwrap_or(data.len().saturating_mul(4))
            .min(MAX_PREALLOCATION);
        if let Some(limit) = options.max_output {
            capacity = capacity.min(limit);
        }

        // The hint only sizes the first allocation; the output still grows
        // on demand if it cannot be reserved up front
        let mut output = Vec::new();
        if output.try_reserve(capacity).is_err() {
            tracing::debug!(capacity, "output pre-allocation failed");
        }

        Self {
            reader: BitReader::new(data),
            output,
            max_output: options.max_output,
            stats: InflateStats::default(),
            input_len: data.len(),
        }
    }

    /// Decode blocks until the final one completes.
    fn run(&mut self) -> Result<()> {
        loop {
            if self.reader.at_end() {
                return Err(self.reader.error(ErrorKind::UnexpectedEndOfStream));
            }

            let position = self.reader.position();
            let is_final = self.reader.read_bit() == 1;
            let btype = self.reader.read_bits(2);
            tracing::debug!(is_final, btype, %position, "block header");

            match BlockType::from_bits(btype) {
                Some(BlockType::Stored) => {
                    self.stats.stored_blocks += 1;
                    self.inflate_stored()?;
                }
                Some(BlockType::Fixed) => {
                    self.stats.fixed_blocks += 1;
                    let tables = fixed_tables();
                    self.inflate_block(&tables.literal, &tables.distance)?;
                }
                Some(BlockType::Dynamic) => {
                    self.stats.dynamic_blocks += 1;
                    let tables = read_dynamic_tables(&mut self.reader)?;
                    self.inflate_block(&tables.literal, &tables.distance)?;
                }
                None => return Err(self.reader.error(ErrorKind::InvalidBlockType)),
            }

            if is_final {
                break;
            }
        }

        // Bits left in the last byte and any bytes after it are ignored
        let end = self.reader.position();
        let consumed = end.byte + usize::from(end.bit > 0);
        self.stats.consumed_bytes = consumed.min(self.input_len);
        self.stats.trailing_bytes = self.input_len.saturating_sub(consumed);
        tracing::debug!(
            %end,
            output = self.output.len(),
            trailing = self.stats.trailing_bytes,
            "stream complete"
        );

        Ok(())
    }

    /// Copy a stored (uncompressed) block.
    fn inflate_stored(&mut self) -> Result<()> {
        // Align to byte boundary
        self.reader.align_to_byte();

        // Read LEN and NLEN
        let len = self.reader.read_u16_le()?;
        let nlen = self.reader.read_u16_le()?;

        // Verify NLEN is one's complement of LEN
        if len ^ nlen != 0xFFFF {
            return Err(self.reader.error(ErrorKind::LengthMismatch));
        }
        tracing::debug!(len, "stored block");

        self.reserve_output(len as usize)?;
        let bytes = self.reader.read_bytes(len as usize)?;
        self.output.extend_from_slice(bytes);

        Ok(())
    }

    /// Decode literals and back-references until end of block.
    fn inflate_block(&mut self, literal: &HuffmanTable, distance: &HuffmanTable) -> Result<()> {
        loop {
            if self.reader.at_end() {
                return Err(self.reader.error(ErrorKind::UnexpectedEndOfStream));
            }

            let symbol = literal.decode(&mut self.reader)?;
            match symbol {
                0..=255 => {
                    // Literal byte
                    self.reserve_output(1)?;
                    self.output.push(symbol as u8);
                    self.stats.literals += 1;
                }
                END_OF_BLOCK => return Ok(()),
                _ => {
                    let length = self.read_length(symbol)?;
                    let dist_symbol = distance.decode(&mut self.reader)?;
                    let dist = self.read_distance(dist_symbol)?;
                    self.copy_match(dist, length)?;
                    self.stats.matches += 1;
                }
            }
        }
    }

    /// Match length for a length symbol, including its extra bits.
    fn read_length(&mut self, symbol: u16) -> Result<usize> {
        let Some((base, extra)) = length_for_symbol(symbol) else {
            return Err(self.reader.error(ErrorKind::InvalidSymbol(symbol)));
        };
        Ok(base as usize + self.reader.read_bits(extra) as usize)
    }

    /// Match distance for a distance symbol, including its extra bits.
    fn read_distance(&mut self, symbol: u16) -> Result<usize> {
        let Some((base, extra)) = distance_for_symbol(symbol) else {
            return Err(self.reader.error(ErrorKind::InvalidSymbol(symbol)));
        };
        Ok(base as usize + self.reader.read_bits(extra) as usize)
    }

    /// Append `length` bytes starting `distance` bytes back.
    ///
    /// When `distance < length` the source overlaps the bytes being written,
    /// which repeats the last `distance` bytes.
    fn copy_match(&mut self, distance: usize, length: usize) -> Result<()> {
        let available = self.output.len();
        if distance > available {
            return Err(self.reader.error(ErrorKind::DistanceExceedsOutput {
                distance,
                available,
            }));
        }
        self.reserve_output(length)?;
        tracing::trace!(distance, length, "match");

        let start = available - distance;
        if distance >= length {
            self.output.extend_from_within(start..start + length);
        } else {
            for i in start..start + length {
                let byte = self.output[i];
                self.output.push(byte);
            }
        }
        Ok(())
    }

    /// Fail if appending `additional` bytes would pass the output limit.
    fn reserve_output(&self, additional: usize) -> Result<()> {
        match self.max_output {
            Some(limit) if self.output.len() + additional > limit => {
                Err(self.reader.error(ErrorKind::OutputLimitExceeded { limit }))
            }
            _ => Ok(()),
        }
    }
}
