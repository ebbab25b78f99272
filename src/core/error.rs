use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TapeError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Cannot open {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt tape data: {0}")]
    CorruptData(String),

    #[error("Read of empty slot at position {position}")]
    EmptySlot { position: usize },
}

pub type Result<T> = std::result::Result<T, TapeError>;
