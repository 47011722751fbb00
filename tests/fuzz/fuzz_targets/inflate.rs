//! Fuzz target for raw DEFLATE decoding.
//!
//! Arbitrary input must decode or fail with an error, never panic. Streams
//! that do decode must decode identically with stats collection enabled.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use rinflate::{InflateOptions, Inflater};

/// Structured input for inflate fuzzing.
#[derive(Arbitrary, Debug)]
struct InflateInput {
    /// Output cap in KiB (0 means 1 MiB)
    max_output_kib: u16,
    /// Raw DEFLATE bytes
    data: Vec<u8>,
}

fuzz_target!(|input: InflateInput| {
    // Limit output size to avoid OOM on decompression bombs
    let limit = match input.max_output_kib {
        0 => 1024 * 1024,
        kib => kib as usize * 1024,
    };
    let inflater = Inflater::with_options(InflateOptions::default().with_max_output(limit));

    let plain = inflater.inflate(&input.data);
    let with_stats = inflater.inflate_with_stats(&input.data);

    match (plain, with_stats) {
        (Ok(output), Ok((stats_output, stats))) => {
            assert!(output.len() <= limit);
            assert_eq!(output, stats_output);
            assert_eq!(stats.consumed_bytes + stats.trailing_bytes, input.data.len());
        }
        (Err(a), Err(b)) => assert_eq!(a, b),
        (a, b) => panic!("decoders disagree: {a:?} vs {b:?}"),
    }
});
