//! File-backed tape emulation
//!
//! The file holds one fixed-width text record per slot: the value
//! right-justified in [`FIELD_WIDTH`] characters followed by a single space.
//! A field of spaces only is an empty slot. Fixed width makes the byte offset
//! of slot `i` simply `i * RECORD_WIDTH`, so a write never disturbs its
//! neighbours.
//!
//! ```text
//!         123         456
//! ```
//!
//! Head movement never touches the file. When a [`TimingsConfig`] is attached,
//! every operation sleeps for its configured delay first, which models a
//! physical drive with slow seeks and rewinds.

use crate::error::{Result, TapeError};
use crate::tape::{Element, Tape, TapeReader};
use crate::timings::TimingsConfig;
use std::cell::Cell;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Characters needed to print `Element::MIN`, sign included
pub const FIELD_WIDTH: usize = 11;

/// Field plus its trailing separator
pub const RECORD_WIDTH: usize = FIELD_WIDTH + 1;

const SEPARATOR: u8 = b' ';

/// Tape stored in a text file
#[derive(Debug)]
pub struct FileTape {
    file: File,
    path: PathBuf,
    size: usize,
    pos: Cell<usize>,
    timings: TimingsConfig,
}

impl FileTape {
    /// Open a tape of `size` slots without any emulated latency
    pub fn open<P: AsRef<Path>>(path: P, size: usize) -> Result<Self> {
        Self::open_with_timings(path, size, TimingsConfig::default())
    }

    /// Open a tape, loading timings from `config_path`
    ///
    /// The sidecar is created with default timings when it does not exist.
    pub fn open_with_config<P: AsRef<Path>, C: AsRef<Path>>(
        path: P,
        size: usize,
        config_path: C,
    ) -> Result<Self> {
        let timings = TimingsConfig::load_or_create(config_path)?;
        Self::open_with_timings(path, size, timings)
    }

    /// Open a tape with explicit timings
    ///
    /// A missing or empty file is initialized with `size` empty records.
    /// A non-empty file must hold at least `size` records; a shorter one is
    /// reported as corrupt. Longer content is left untouched.
    pub fn open_with_timings<P: AsRef<Path>>(
        path: P,
        size: usize,
        timings: TimingsConfig,
    ) -> Result<Self> {
        let path = path.as_ref();
        if size == 0 {
            return Err(TapeError::InvalidArgument(
                "size of a tape cannot be zero".to_string(),
            ));
        }
        let expected = Self::expected_len(size)?;

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(|source| TapeError::Open {
                path: path.to_path_buf(),
                source,
            })?;

        let actual = file.metadata()?.len();
        if actual == 0 {
            info!("Initializing empty tape {:?} with {} slots", path, size);
            Self::fill_empty(&mut file, size)?;
        } else if actual < expected {
            return Err(TapeError::CorruptData(format!(
                "tape file {:?} is {} bytes, a tape of {} slots needs at least {}",
                path, actual, size, expected
            )));
        }

        debug!(
            "Opened tape {:?} ({} slots, timings: {})",
            path, size, timings
        );

        Ok(FileTape {
            file,
            path: path.to_path_buf(),
            size,
            pos: Cell::new(0),
            timings,
        })
    }

    /// Minimum byte length of a valid file; the last separator is optional
    ///
    /// Fails with `InvalidArgument` when `size` is zero or the file would not
    /// be addressable.
    pub fn expected_len(size: usize) -> Result<u64> {
        size
            .checked_mul(RECORD_WIDTH)
            .and_then(|len| len.checked_sub(1))
            .map(|len| len as u64)
            .ok_or_else(|| {
                TapeError::InvalidArgument(format!("tape of {} slots is too large", size))
            })
    }

    fn fill_empty(file: &mut File, size: usize) -> Result<()> {
        let mut writer = BufWriter::new(file);
        let record = [SEPARATOR; RECORD_WIDTH];
        for _ in 0..size {
            writer.write_all(&record)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Backing file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of slots
    pub fn size(&self) -> usize {
        self.size
    }

    /// Current head position
    pub fn position(&self) -> usize {
        self.pos.get()
    }

    pub fn timings(&self) -> &TimingsConfig {
        &self.timings
    }

    fn offset(&self) -> u64 {
        (self.pos.get() * RECORD_WIDTH) as u64
    }

    fn read_field(&self) -> Result<Option<Element>> {
        let mut field = [0u8; FIELD_WIDTH];
        let mut file = &self.file;
        file.seek(SeekFrom::Start(self.offset()))?;
        file.read_exact(&mut field)?;
        decode_field(&field, self.pos.get())
    }

    /// Flush buffered writes to disk
    pub fn sync(&self) -> Result<()> {
        self.file.sync_all()?;
        Ok(())
    }
}

/// Decode one fixed-width field
fn decode_field(field: &[u8], position: usize) -> Result<Option<Element>> {
    if field.iter().all(|&b| b == SEPARATOR) {
        return Ok(None);
    }

    let text = std::str::from_utf8(field).map_err(|_| {
        TapeError::CorruptData(format!("slot {} is not valid text", position))
    })?;
    text.trim().parse::<Element>().map(Some).map_err(|_| {
        TapeError::CorruptData(format!(
            "slot {} holds {:?}, which is not an integer",
            position, text
        ))
    })
}

/// Encode `value` as a right-justified field plus separator
fn encode_record(value: Element) -> String {
    format!("{:>width$} ", value, width = FIELD_WIDTH)
}

impl TapeReader for FileTape {
    fn read(&self) -> Result<Element> {
        TimingsConfig::pause(self.timings.read);
        self.read_field()?.ok_or(TapeError::EmptySlot {
            position: self.pos.get(),
        })
    }

    fn read_safe(&self) -> Result<Option<Element>> {
        TimingsConfig::pause(self.timings.read);
        self.read_field()
    }

    fn move_left(&self) -> bool {
        TimingsConfig::pause(self.timings.move_left);
        match self.pos.get() {
            0 => false,
            pos => {
                self.pos.set(pos - 1);
                true
            }
        }
    }

    fn move_right(&self) -> bool {
        TimingsConfig::pause(self.timings.move_right);
        let pos = self.pos.get();
        if pos + 1 < self.size {
            self.pos.set(pos + 1);
            true
        } else {
            false
        }
    }

    fn rewind(&self) {
        TimingsConfig::pause(self.timings.rewind);
        self.pos.set(0);
    }
}

impl Tape for FileTape {
    fn write(&mut self, value: Element) -> Result<()> {
        TimingsConfig::pause(self.timings.write);
        let offset = self.offset();
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.write_all(encode_record(value).as_bytes())?;
        Ok(())
    }
}
