//! Constant tables of the DEFLATE format (RFC 1951 section 3.2.5-3.2.7).

use std::sync::OnceLock;

use crate::huffman::{HuffmanTable, MAX_BITS};

/// Maximum number of literal/length codes in a dynamic block.
pub const MAX_LITERAL_CODES: usize = 286;

/// Maximum number of distance codes in a dynamic block.
pub const MAX_DISTANCE_CODES: usize = 30;

/// Literal/length codes in the fixed code, including the unused 286/287.
pub const FIXED_LITERAL_CODES: usize = 288;

/// Distance codes in the fixed code, including the unused 30/31.
pub const FIXED_DISTANCE_CODES: usize = 32;

/// End-of-block literal/length symbol.
pub const END_OF_BLOCK: u16 = 256;

/// Order of code length codes for dynamic Huffman.
pub const CODE_LENGTH_ORDER: [usize; 19] = [
    16, 17, 18, 0, 8, 7, 9, 6, 10, 5, 11, 4, 12, 3, 13, 2, 14, 1, 15,
];

/// The fixed literal/length and distance tables used by block type 1.
#[derive(Debug)]
pub struct FixedTables {
    /// Literal/length table (288 symbols).
    pub literal: HuffmanTable,
    /// Distance table (32 symbols).
    pub distance: HuffmanTable,
}

static FIXED_TABLES: OnceLock<FixedTables> = OnceLock::new();

/// The fixed tables, built on first use and shared by every session.
pub fn fixed_tables() -> &'static FixedTables {
    FIXED_TABLES.get_or_init(build_fixed_tables)
}

/// Both fixed codes are complete, so their canonical order can be written
/// down directly: shorter codes first, symbols ascending within a length.
fn build_fixed_tables() -> FixedTables {
    tracing::debug!("building fixed Huffman tables");

    let mut count = [0u16; MAX_BITS + 1];
    count[7] = 24; // 256-279
    count[8] = 152; // 0-143, 280-287
    count[9] = 112; // 144-255
    let symbol = (256..280).chain(0..144).chain(280..288).chain(144..256).collect();
    let literal = HuffmanTable::from_canonical(count, symbol);

    let mut count = [0u16; MAX_BITS + 1];
    count[5] = FIXED_DISTANCE_CODES as u16;
    let symbol = (0..FIXED_DISTANCE_CODES as u16).collect();
    let distance = HuffmanTable::from_canonical(count, symbol);

    FixedTables { literal, distance }
}

/// Base match length and extra bit count for a length symbol (257-285).
///
/// Returns `None` for symbols outside that range, including the encodable
/// but invalid 286 and 287.
pub fn length_for_symbol(symbol: u16) -> Option<(u16, u8)> {
    match symbol {
        257..=260 => Some((symbol - 254, 0)),
        261..=284 => {
            let v = symbol - 261;
            let extra = v / 4;
            let base = 3 + (4 << extra) + ((v % 4) << extra);
            Some((base, extra as u8))
        }
        285 => Some((258, 0)),
        _ => None,
    }
}

/// Base distance and extra bit count for a distance symbol (0-29).
///
/// Returns `None` for 30 and 31.
pub fn distance_for_symbol(symbol: u16) -> Option<(u16, u8)> {
    match symbol {
        0 | 1 => Some((symbol + 1, 0)),
        2..=29 => {
            let extra = symbol / 2 - 1;
            let base = 1 + (2 << extra) + ((symbol % 2) << extra);
            Some((base, extra as u8))
        }
        _ => None,
    }
}
