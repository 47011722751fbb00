//! rinflate CLI - raw DEFLATE decompression tool
//!
//! Decodes one or more raw DEFLATE (RFC 1951) files and writes the
//! decompressed bytes to stdout or a file. Container formats (gzip, zlib)
//! must be stripped beforehand.

use std::fs;
use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use rinflate::{InflateOptions, InflateStats, Inflater};

/// Built-in streams decoded when no input is given.
const SAMPLES: [&[u8]; 2] = [
    // "abcdef", fixed Huffman
    &[0x4B, 0x4C, 0x4A, 0x4E, 0x49, 0x4D, 0x03],
    // "Deflate late", fixed Huffman with a back-reference
    &[
        0x73, 0x49, 0x4D, 0xCB, 0x49, 0x2C, 0x49, 0x55, 0x00, 0x11, 0x00,
    ],
];

/// Decompress raw DEFLATE streams.
///
/// With no INPUT, decodes two built-in sample streams.
#[derive(Parser, Debug)]
#[command(name = "rinflate")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Raw DEFLATE input files
    #[arg(value_name = "INPUT")]
    inputs: Vec<PathBuf>,

    /// Output file path (single input only; defaults to stdout)
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Fail if a stream decompresses to more than this many bytes
    #[arg(long, value_name = "BYTES")]
    max_output: Option<usize>,

    /// Log filter, e.g. "rinflate=debug" (overrides RUST_LOG)
    #[arg(long, value_name = "FILTER")]
    log: Option<String>,

    /// Show verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log.as_deref())?;

    let mut options = InflateOptions::default();
    if let Some(limit) = args.max_output {
        options = options.with_max_output(limit);
    }
    let inflater = Inflater::with_options(options);

    if args.inputs.is_empty() {
        for sample in SAMPLES {
            let output = inflater.inflate(sample).context("decoding built-in sample")?;
            println!("{:?}", String::from_utf8_lossy(&output));
        }
        return Ok(());
    }

    if args.output.is_some() && args.inputs.len() > 1 {
        bail!("--output requires a single input file");
    }

    let inputs = args
        .inputs
        .iter()
        .map(|path| fs::read(path).with_context(|| format!("reading {}", path.display())))
        .collect::<Result<Vec<_>>>()?;

    let start = Instant::now();
    // Stats are only gathered when they will be reported
    let results: Vec<_> = if args.verbose {
        inputs
            .iter()
            .map(|data| inflater.inflate_with_stats(data))
            .collect()
    } else {
        inflater
            .inflate_all(&inputs)
            .into_iter()
            .map(|result| result.map(|output| (output, InflateStats::default())))
            .collect()
    };
    let decode_time = start.elapsed();

    let mut stdout = io::stdout().lock();
    for ((path, data), result) in args.inputs.iter().zip(&inputs).zip(results) {
        let (output, stats) = result
            .with_context(|| format!("decoding {}", path.display()))?;

        if args.verbose {
            report(path, data.len(), &output, &stats);
        }

        match &args.output {
            Some(out_path) => fs::write(out_path, &output)
                .with_context(|| format!("writing {}", out_path.display()))?,
            None if stdout.is_terminal() => {
                writeln!(stdout, "{:?}", String::from_utf8_lossy(&output))?
            }
            None => stdout.write_all(&output)?,
        }
    }
    stdout.flush()?;

    if args.verbose {
        eprintln!("Decode time: {:.2?}", decode_time);
    }

    Ok(())
}

/// Install a stderr subscriber; `--log` wins over `RUST_LOG`.
fn init_logging(filter: Option<&str>) -> Result<()> {
    let filter = match filter {
        Some(directives) => EnvFilter::try_new(directives)
            .with_context(|| format!("invalid log filter {directives:?}"))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
    Ok(())
}

fn report(path: &Path, input_size: usize, output: &[u8], stats: &InflateStats) {
    eprintln!("Decoded: {:?}", path);
    eprintln!(
        "  Blocks: {} (stored {}, fixed {}, dynamic {})",
        stats.blocks(),
        stats.stored_blocks,
        stats.fixed_blocks,
        stats.dynamic_blocks
    );
    eprintln!("  Literals: {}, matches: {}", stats.literals, stats.matches);
    eprintln!(
        "  Size: {} -> {}",
        format_size(input_size as u64),
        format_size(output.len() as u64)
    );
    if stats.trailing_bytes > 0 {
        eprintln!("  Trailing bytes ignored: {}", stats.trailing_bytes);
    }
}

fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
