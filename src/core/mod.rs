//! Tape abstraction, storage backends and the sort engine

pub mod error;
pub mod factory;
pub mod file_tape;
pub mod memory;
pub mod sort;
pub mod tape;
pub mod timings;
pub mod transfer;
