//! Dynamic Huffman table header (RFC 1951 section 3.2.7).

use crate::bit_reader::BitReader;
use crate::error::{ErrorKind, Result};
use crate::huffman::HuffmanTable;
use crate::tables::{CODE_LENGTH_ORDER, END_OF_BLOCK, MAX_DISTANCE_CODES, MAX_LITERAL_CODES};

/// Literal/length and distance tables decoded from a dynamic block header.
#[derive(Debug)]
pub struct DynamicTables {
    /// Literal/length table (`HLIT` symbols).
    pub literal: HuffmanTable,
    /// Distance table (`HDIST` symbols).
    pub distance: HuffmanTable,
}

/// Read a dynamic block header and build its two tables.
///
/// The header holds the lengths of a 19-symbol meta-code, followed by the
/// literal/length and distance code lengths encoded with that meta-code.
pub fn read_dynamic_tables(reader: &mut BitReader) -> Result<DynamicTables> {
    // Read code counts
    let hlit = reader.read_bits(5) as usize + 257; // 257-288
    let hdist = reader.read_bits(5) as usize + 1; // 1-32
    let hclen = reader.read_bits(4) as usize + 4; // 4-19
    tracing::debug!(hlit, hdist, hclen, "dynamic block header");

    if hlit > MAX_LITERAL_CODES || hdist > MAX_DISTANCE_CODES {
        return Err(reader.error(ErrorKind::InvalidTableSize {
            literals: hlit,
            distances: hdist,
        }));
    }

    // Read code length code lengths
    let mut cl_lengths = [0u8; 19];
    for &symbol in CODE_LENGTH_ORDER.iter().take(hclen) {
        cl_lengths[symbol] = reader.read_bits(3) as u8;
    }
    let cl_table = HuffmanTable::build(&cl_lengths, reader.position())?;

    let lengths = read_code_lengths(reader, &cl_table, hlit + hdist)?;

    if lengths[END_OF_BLOCK as usize] == 0 {
        return Err(reader.error(ErrorKind::MissingEndOfBlockSymbol));
    }

    let position = reader.position();
    Ok(DynamicTables {
        literal: HuffmanTable::build(&lengths[..hlit], position)?,
        distance: HuffmanTable::build(&lengths[hlit..], position)?,
    })
}

/// Decode `total` run-length compressed code lengths with the meta-code.
fn read_code_lengths(
    reader: &mut BitReader,
    cl_table: &HuffmanTable,
    total: usize,
) -> Result<Vec<u8>> {
    let mut lengths = Vec::with_capacity(total);

    while lengths.len() < total {
        let symbol = cl_table.decode(reader)?;

        let (value, repeat) = match symbol {
            0..=15 => {
                lengths.push(symbol as u8);
                continue;
            }
            16 => {
                // Repeat previous length 3-6 times
                let Some(&prev) = lengths.last() else {
                    return Err(reader.error(ErrorKind::NoPrecedingLength));
                };
                (prev, reader.read_bits(2) as usize + 3)
            }
            // Repeat zero 3-10 times
            17 => (0, reader.read_bits(3) as usize + 3),
            // Repeat zero 11-138 times
            _ => (0, reader.read_bits(7) as usize + 11),
        };

        if lengths.len() + repeat > total {
            return Err(reader.error(ErrorKind::TooManyLengths));
        }
        lengths.resize(lengths.len() + repeat, value);
    }

    Ok(lengths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Position;

    /// LSB-first bit packer for hand-built headers.
    #[derive(Default)]
    struct BitWriter {
        out: Vec<u8>,
        acc: u32,
        nbits: u8,
    }

    impl BitWriter {
        fn bits(&mut self, value: u32, n: u8) -> &mut Self {
            for i in 0..n {
                self.acc |= ((value >> i) & 1) << self.nbits;
                self.nbits += 1;
                if self.nbits == 8 {
                    self.out.push(self.acc as u8);
                    self.acc = 0;
                    self.nbits = 0;
                }
            }
            self
        }

        /// Huffman codes go out MSB first.
        fn code(&mut self, code: u32, len: u8) -> &mut Self {
            for i in (0..len).rev() {
                self.bits((code >> i) & 1, 1);
            }
            self
        }

        fn finish(&mut self) -> Vec<u8> {
            let mut out = std::mem::take(&mut self.out);
            if self.nbits > 0 {
                out.push(self.acc as u8);
            }
            out
        }
    }

    /// Header declaring `hlit`/`hdist` and a meta-code where symbols
    /// 0, 1, 2, 16 and 18 have 3-bit codes and symbol 8 a 2-bit code.
    ///
    /// Canonical codes: 8=00, 0=010, 1=011, 2=100, 16=101, 18=110.
    fn header(w: &mut BitWriter, hlit: u32, hdist: u32) {
        w.bits(hlit - 257, 5).bits(hdist - 1, 5).bits(19 - 4, 4);
        let mut cl = [0u32; 19];
        cl[0] = 3;
        cl[1] = 3;
        cl[2] = 3;
        cl[8] = 2;
        cl[16] = 3;
        cl[18] = 3;
        for &sym in CODE_LENGTH_ORDER.iter() {
            w.bits(cl[sym], 3);
        }
    }

    const SYM_8: (u32, u8) = (0b00, 2);
    const SYM_0: (u32, u8) = (0b010, 3);
    const SYM_1: (u32, u8) = (0b011, 3);
    const SYM_2: (u32, u8) = (0b100, 3);
    const SYM_16: (u32, u8) = (0b101, 3);
    const SYM_18: (u32, u8) = (0b110, 3);

    /// Emit 255 zero lengths (138 + 117).
    fn zeros_255(w: &mut BitWriter) {
        w.code(SYM_18.0, SYM_18.1).bits(127, 7);
        w.code(SYM_18.0, SYM_18.1).bits(106, 7);
    }

    #[test]
    fn test_read_dynamic_tables() {
        // Literals 0-254 unused, 255 and end-of-block get 1-bit codes, one
        // distance code of length 1
        let mut w = BitWriter::default();
        header(&mut w, 257, 1);
        zeros_255(&mut w);
        w.code(SYM_1.0, SYM_1.1);
        w.code(SYM_1.0, SYM_1.1);
        w.code(SYM_1.0, SYM_1.1);
        let data = w.finish();

        let mut reader = BitReader::new(&data);
        let tables = read_dynamic_tables(&mut reader).unwrap();
        assert_eq!(tables.literal.symbols(), &[255, 256]);
        assert_eq!(tables.distance.symbols(), &[0]);
        assert_eq!(tables.distance.counts()[1], 1);
    }

    #[test]
    fn test_repeat_previous_crosses_into_distances() {
        // Literal 255 has length 1, end-of-block length 2, then the
        // repeat-previous instruction fills all three distance lengths
        let mut w = BitWriter::default();
        header(&mut w, 257, 3);
        zeros_255(&mut w);
        w.code(SYM_1.0, SYM_1.1);
        w.code(SYM_2.0, SYM_2.1);
        w.code(SYM_16.0, SYM_16.1).bits(0, 2);
        let data = w.finish();

        let mut reader = BitReader::new(&data);
        let tables = read_dynamic_tables(&mut reader).unwrap();
        assert_eq!(tables.literal.symbols(), &[255, 256]);
        assert_eq!(tables.distance.symbols(), &[0, 1, 2]);
        assert_eq!(tables.distance.counts()[2], 3);
    }

    #[test]
    fn test_repeat_with_no_preceding_length() {
        let mut w = BitWriter::default();
        header(&mut w, 257, 1);
        w.code(SYM_16.0, SYM_16.1).bits(0, 2);
        let data = w.finish();

        let mut reader = BitReader::new(&data);
        let err = read_dynamic_tables(&mut reader).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoPrecedingLength);
    }

    #[test]
    fn test_too_many_lengths() {
        // 138 + 138 = 276 > 258
        let mut w = BitWriter::default();
        header(&mut w, 257, 1);
        w.code(SYM_18.0, SYM_18.1).bits(127, 7);
        w.code(SYM_18.0, SYM_18.1).bits(127, 7);
        let data = w.finish();

        let mut reader = BitReader::new(&data);
        let err = read_dynamic_tables(&mut reader).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TooManyLengths);
    }

    #[test]
    fn test_missing_end_of_block() {
        // Every literal/length gets 8 bits except 256, then one distance
        let mut w = BitWriter::default();
        header(&mut w, 257, 1);
        for _ in 0..256 {
            w.code(SYM_8.0, SYM_8.1);
        }
        w.code(SYM_0.0, SYM_0.1);
        w.code(SYM_1.0, SYM_1.1);
        let data = w.finish();

        let mut reader = BitReader::new(&data);
        let err = read_dynamic_tables(&mut reader).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingEndOfBlockSymbol);
    }

    #[test]
    fn test_invalid_table_size() {
        // HLIT = 29 + 257 = 286 is fine, 30 + 257 = 287 is not
        let data = BitWriter::default().bits(30, 5).bits(0, 5).finish();
        let mut reader = BitReader::new(&data);
        let err = read_dynamic_tables(&mut reader).unwrap_err();
        assert_eq!(
            err.kind(),
            ErrorKind::InvalidTableSize {
                literals: 287,
                distances: 1
            }
        );
        assert_eq!(err.position(), Position { byte: 1, bit: 6 });

        let data = BitWriter::default().bits(0, 5).bits(30, 5).finish();
        let mut reader = BitReader::new(&data);
        assert!(matches!(
            read_dynamic_tables(&mut reader).unwrap_err().kind(),
            ErrorKind::InvalidTableSize { distances: 31, .. }
        ));
    }

    #[test]
    fn test_oversubscribed_meta_code() {
        // Three code length codes of length 1
        let data = BitWriter::default()
            .bits(0, 5)
            .bits(0, 5)
            .bits(0, 4)
            .bits(1, 3)
            .bits(1, 3)
            .bits(1, 3)
            .bits(0, 3)
            .finish();
        let mut reader = BitReader::new(&data);
        assert_eq!(
            read_dynamic_tables(&mut reader).unwrap_err().kind(),
            ErrorKind::OversubscribedCode
        );
    }
}
