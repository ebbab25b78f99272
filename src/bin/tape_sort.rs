//! tape-sort
//!
//! Sorts a file tape into another file tape with a bounded RAM budget

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::fs::{self, File};
use std::path::PathBuf;
use tape_sort::{render, sort, FileTape, FileTapeFactory, TapeReader, TimingsConfig};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "tape-sort")]
#[command(about = "Sort integers stored on a file tape using limited memory")]
struct Args {
    /// Input tape file
    input: PathBuf,

    /// Number of elements on the input tape
    count: usize,

    /// Output tape file (overwritten)
    output: PathBuf,

    /// Maximum number of elements sorted in memory at once
    #[arg(short = 'm', long, default_value_t = 10_000_000)]
    cutoff: usize,

    /// Timings sidecar file, created with defaults if missing
    #[arg(short = 'c', long, default_value = "file_tape.cfg")]
    config: PathBuf,

    /// Directory for scratch tapes
    #[arg(long, default_value = "tmp")]
    scratch_dir: PathBuf,

    /// Print the input and output tapes
    #[arg(short = 'p', long)]
    print: bool,

    /// Print sort statistics as JSON
    #[arg(long)]
    stats: bool,

    /// Leave scratch tapes on disk
    #[arg(long)]
    keep_scratch: bool,

    /// Enable debug logging
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() -> Result<()> {
    // Usage errors exit with 1 like every other failure; help and version exit with 0
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    let default_level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    if args.count == 0 {
        bail!("count must be a positive integer");
    }
    if args.cutoff == 0 {
        bail!("cutoff must be a positive integer");
    }

    let timings = TimingsConfig::load_or_create(&args.config)
        .with_context(|| format!("Failed to load timings from {:?}", args.config))?;
    if !timings.is_zero() {
        info!("Emulating tape latency: {}", timings);
    }

    // The output is truncated before sorting, so it must not be the input
    if let (Ok(input), Ok(output)) = (
        fs::canonicalize(&args.input),
        fs::canonicalize(&args.output),
    ) {
        if input == output {
            bail!("input and output refer to the same file {:?}", input);
        }
    }

    let src = FileTape::open_with_timings(&args.input, args.count, timings)
        .with_context(|| format!("Failed to open input tape {:?}", args.input))?;

    File::create(&args.output)
        .with_context(|| format!("Failed to create output tape {:?}", args.output))?;
    let mut dst = FileTape::open_with_timings(&args.output, args.count, timings)
        .with_context(|| format!("Failed to open output tape {:?}", args.output))?;

    if args.print {
        println!("input:  {}", render(&src)?);
        src.rewind();
    }

    let scratch = FileTapeFactory::with_timings(&args.scratch_dir, timings);
    let result = sort(&src, args.count, &mut dst, args.cutoff, &scratch);

    if !args.keep_scratch {
        scratch
            .remove_scratch()
            .context("Failed to remove scratch tapes")?;
    }
    let stats = result.context("Sort failed")?;

    if args.print {
        println!("output: {}", render(&dst)?);
    }
    if args.stats {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    }

    dst.sync()?;
    Ok(())
}
