//! Scratch tape factories
//!
//! The sort engine asks for three scratch tapes per call. [`memory_factory`]
//! hands out in-memory tapes; [`FileTapeFactory`] creates numbered files in a
//! scratch directory and remembers them so they can be removed afterwards.

use crate::error::{Result, TapeError};
use crate::file_tape::FileTape;
use crate::memory::InMemoryTape;
use crate::tape::{Tape, TapeFactory};
use crate::timings::TimingsConfig;
use parking_lot::Mutex;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Create an in-memory scratch tape of `size` slots
pub fn memory_factory(size: usize) -> Result<Box<dyn Tape>> {
    Ok(Box::new(InMemoryTape::new(size)?))
}

/// Creates file-backed scratch tapes `tape1.txt`, `tape2.txt`, ... in a directory
#[derive(Debug)]
pub struct FileTapeFactory {
    dir: PathBuf,
    timings: TimingsConfig,
    created: Mutex<Vec<PathBuf>>,
}

impl FileTapeFactory {
    /// Scratch tapes without emulated latency
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self::with_timings(dir, TimingsConfig::default())
    }

    /// Scratch tapes sharing one set of timings
    pub fn with_timings<P: AsRef<Path>>(dir: P, timings: TimingsConfig) -> Self {
        FileTapeFactory {
            dir: dir.as_ref().to_path_buf(),
            timings,
            created: Mutex::new(Vec::new()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Paths of every scratch tape created so far
    pub fn created(&self) -> Vec<PathBuf> {
        self.created.lock().clone()
    }

    /// Delete every scratch tape created so far
    ///
    /// Files that are already gone are skipped.
    pub fn remove_scratch(&self) -> Result<()> {
        let mut created = self.created.lock();
        for path in created.drain(..) {
            match fs::remove_file(&path) {
                Ok(()) => debug!("Removed scratch tape {:?}", path),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    warn!("Scratch tape {:?} already removed", path);
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}

impl TapeFactory for FileTapeFactory {
    fn create(&self, size: usize) -> Result<Box<dyn Tape>> {
        fs::create_dir_all(&self.dir).map_err(|source| TapeError::Open {
            path: self.dir.clone(),
            source,
        })?;

        let mut created = self.created.lock();
        let path = self.dir.join(format!("tape{}.txt", created.len() + 1));

        // A leftover file from an earlier run may belong to a tape of another size
        File::create(&path).map_err(|source| TapeError::Open {
            path: path.clone(),
            source,
        })?;
        let tape = FileTape::open_with_timings(&path, size, self.timings)?;

        debug!("Created scratch tape {:?} with {} slots", path, size);
        created.push(path);
        Ok(Box::new(tape))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tape::TapeReader;
    use tempfile::TempDir;

    #[test]
    fn test_memory_factory() {
        let tape = memory_factory(2).unwrap();
        assert_eq!(tape.read_safe().unwrap(), None);
        assert!(memory_factory(0).is_err());
    }

    #[test]
    fn test_file_factory_numbers_tapes() {
        let dir = TempDir::new().unwrap();
        let scratch = dir.path().join("tmp");
        let factory = FileTapeFactory::new(&scratch);

        let mut first = factory.create(3).unwrap();
        let _second = factory.create(3).unwrap();
        first.write(11).unwrap();

        assert_eq!(
            factory.created(),
            vec![scratch.join("tape1.txt"), scratch.join("tape2.txt")]
        );
        assert_eq!(
            fs::metadata(scratch.join("tape2.txt")).unwrap().len(),
            FileTape::expected_len(3).unwrap() + 1
        );
    }

    #[test]
    fn test_file_factory_truncates_stale_tapes() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("tape1.txt"), "          5 ").unwrap();

        let factory = FileTapeFactory::new(dir.path());
        let tape = factory.create(4).unwrap();
        for _ in 0..4 {
            assert_eq!(tape.read_safe().unwrap(), None);
            tape.move_right();
        }
    }

    #[test]
    fn test_remove_scratch() {
        let dir = TempDir::new().unwrap();
        let factory = FileTapeFactory::new(dir.path());
        drop(factory.create(2).unwrap());
        drop(factory.create(2).unwrap());

        let paths = factory.created();
        fs::remove_file(&paths[1]).unwrap();

        factory.remove_scratch().unwrap();
        assert!(paths.iter().all(|p| !p.exists()));
        assert!(factory.created().is_empty());
    }
}
