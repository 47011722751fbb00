//! # rinflate
//!
//! A small, dependable decoder for raw DEFLATE streams (RFC 1951).
//!
//! The whole stream is decoded from an in-memory buffer into a freshly
//! allocated `Vec<u8>`. Any violation of the format aborts the decode with a
//! typed [`Error`] that records where in the input it was detected; partial
//! output is never returned.
//!
//! ## Features
//!
//! - **Stored, fixed and dynamic blocks**, including overlapping
//!   back-references
//! - **Typed errors** with byte/bit positions
//! - **Output limits** via [`InflateOptions::max_output`]
//! - Optional parallel decoding of independent streams via the `parallel`
//!   feature
//! - Optional `rinflate` command-line tool via the `cli` feature
//!
//! ## Example
//!
//! ```rust
//! use rinflate::{inflate, ErrorKind};
//!
//! let data = [0x73, 0x49, 0x4D, 0xCB, 0x49, 0x2C, 0x49, 0x55, 0x00, 0x11, 0x00];
//! assert_eq!(inflate(&data).unwrap(), b"Deflate late");
//!
//! // Reserved block type
//! let err = inflate(&[0x07]).unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::InvalidBlockType);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod bit_reader;
pub mod dynamic;
pub mod error;
pub mod huffman;
pub mod inflate;
pub mod tables;

pub use error::{Error, ErrorKind, Position, Result};
pub use inflate::{inflate, BlockType, InflateOptions, InflateStats, Inflater};
