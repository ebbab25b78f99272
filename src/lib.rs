//! # tape-sort - External Merge Sort on Tape Devices
//!
//! `tape-sort` sorts integer sequences that do not fit in memory. Data lives
//! on *tapes*: fixed-length, sequential storage with a single movable head.
//! The sort holds at most `cutoff` elements in RAM and uses three scratch
//! tapes.
//!
//! - **[`Tape`] / [`TapeReader`]**: the contract every backend implements
//! - **[`InMemoryTape`]**: array-backed reference backend
//! - **[`FileTape`]**: fixed-width text file with optional emulated latency
//! - **[`sort`]**: split into sorted blocks, then merge pairs of blocks
//!
//! ## Quick Start
//!
//! ```rust
//! use tape_sort::{memory_factory, sort, InMemoryTape, Result, TapeReader};
//!
//! # fn main() -> Result<()> {
//! let src = InMemoryTape::from_vec(vec![3, 1, 2])?;
//! let mut dst = InMemoryTape::new(3)?;
//!
//! sort(&src, 3, &mut dst, 2, &memory_factory)?;
//!
//! assert_eq!(dst.read()?, 1);
//! # Ok(())
//! # }
//! ```
//!
//! ## File-Backed Tapes
//!
//! ```rust,no_run
//! use tape_sort::{sort, FileTape, FileTapeFactory, Result};
//!
//! # fn main() -> Result<()> {
//! let src = FileTape::open_with_config("input.txt", 1000, "file_tape.cfg")?;
//! let mut dst = FileTape::open("output.txt", 1000)?;
//! let scratch = FileTapeFactory::with_timings("tmp", *src.timings());
//!
//! sort(&src, 1000, &mut dst, 100, &scratch)?;
//! scratch.remove_scratch()?;
//! # Ok(())
//! # }
//! ```

pub mod core;

// Re-export core modules internally so crate:: paths in core still work
#[allow(unused_imports)]
pub(crate) use self::core::{error, factory, file_tape, memory, tape, timings, transfer};

pub use crate::core::{
    error::{Result, TapeError},
    factory::{memory_factory, FileTapeFactory},
    file_tape::{FileTape, FIELD_WIDTH, RECORD_WIDTH},
    memory::InMemoryTape,
    sort::{sort, SortStats},
    tape::{Element, Tape, TapeFactory, TapeReader},
    timings::TimingsConfig,
    transfer::{read_forward, render, write_all},
};
