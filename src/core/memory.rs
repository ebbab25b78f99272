//! Array-backed tape
//!
//! Head movement is O(1) and there is no I/O, which makes this the reference
//! backend for tests and a cost-free scratch tape for the sort engine.

use crate::error::{Result, TapeError};
use crate::tape::{Element, Tape, TapeReader};
use std::cell::Cell;

/// Tape held entirely in memory
#[derive(Debug, Clone)]
pub struct InMemoryTape {
    values: Vec<Element>,
    /// Per-slot written flags; `None` when built from existing content,
    /// in which case every slot counts as written
    written: Option<Vec<bool>>,
    pos: Cell<usize>,
}

impl InMemoryTape {
    /// Create a tape of `size` empty slots
    pub fn new(size: usize) -> Result<Self> {
        if size == 0 {
            return Err(TapeError::InvalidArgument(
                "size of a tape cannot be zero".to_string(),
            ));
        }

        Ok(InMemoryTape {
            values: vec![0; size],
            written: Some(vec![false; size]),
            pos: Cell::new(0),
        })
    }

    /// Create a tape whose slots are all written with `content`
    pub fn from_vec(content: Vec<Element>) -> Result<Self> {
        if content.is_empty() {
            return Err(TapeError::InvalidArgument(
                "size of a tape cannot be zero".to_string(),
            ));
        }

        Ok(InMemoryTape {
            values: content,
            written: None,
            pos: Cell::new(0),
        })
    }

    /// Number of slots
    pub fn size(&self) -> usize {
        self.values.len()
    }

    /// Current head position
    pub fn position(&self) -> usize {
        self.pos.get()
    }

    /// Raw slot contents, ignoring emptiness
    pub fn as_slice(&self) -> &[Element] {
        &self.values
    }

    pub fn into_vec(self) -> Vec<Element> {
        self.values
    }
}

impl TapeReader for InMemoryTape {
    fn read(&self) -> Result<Element> {
        Ok(self.values[self.pos.get()])
    }

    fn read_safe(&self) -> Result<Option<Element>> {
        let pos = self.pos.get();
        match &self.written {
            Some(written) if !written[pos] => Ok(None),
            _ => Ok(Some(self.values[pos])),
        }
    }

    fn move_left(&self) -> bool {
        match self.pos.get() {
            0 => false,
            pos => {
                self.pos.set(pos - 1);
                true
            }
        }
    }

    fn move_right(&self) -> bool {
        let pos = self.pos.get();
        if pos + 1 < self.values.len() {
            self.pos.set(pos + 1);
            true
        } else {
            false
        }
    }

    fn rewind(&self) {
        self.pos.set(0);
    }
}

impl Tape for InMemoryTape {
    fn write(&mut self, value: Element) -> Result<()> {
        let pos = self.pos.get();
        self.values[pos] = value;
        if let Some(written) = &mut self.written {
            written[pos] = true;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_size_rejected() {
        assert!(matches!(
            InMemoryTape::new(0),
            Err(TapeError::InvalidArgument(_))
        ));
        assert!(matches!(
            InMemoryTape::from_vec(Vec::new()),
            Err(TapeError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_fresh_tape_is_empty() {
        let tape = InMemoryTape::new(4).unwrap();
        loop {
            assert_eq!(tape.read_safe().unwrap(), None);
            if !tape.move_right() {
                break;
            }
        }
        assert_eq!(tape.position(), 3);
    }

    #[test]
    fn test_write_marks_only_one_slot() {
        let mut tape = InMemoryTape::new(3).unwrap();
        assert!(tape.move_right());
        tape.write(-7).unwrap();

        tape.rewind();
        assert_eq!(tape.read_safe().unwrap(), None);
        assert!(tape.move_right());
        assert_eq!(tape.read_safe().unwrap(), Some(-7));
        assert!(tape.move_right());
        assert_eq!(tape.read_safe().unwrap(), None);
    }

    #[test]
    fn test_from_vec_counts_as_written() {
        let tape = InMemoryTape::from_vec(vec![5, 6]).unwrap();
        assert_eq!(tape.read_safe().unwrap(), Some(5));
        assert!(tape.move_right());
        assert_eq!(tape.read().unwrap(), 6);
    }

    #[test]
    fn test_head_bounds() {
        let tape = InMemoryTape::from_vec(vec![1, 2, 3]).unwrap();
        assert!(!tape.move_left());
        assert_eq!(tape.position(), 0);

        assert!(tape.move_right());
        assert!(tape.move_right());
        assert!(!tape.move_right());
        assert_eq!(tape.position(), 2);
        assert!(!tape.move_right());
        assert_eq!(tape.read().unwrap(), 3);

        assert!(tape.move_left());
        assert_eq!(tape.read().unwrap(), 2);
        tape.rewind();
        assert_eq!(tape.position(), 0);
        assert!(!tape.move_left());
    }

    #[test]
    fn test_overwrite() {
        let mut tape = InMemoryTape::from_vec(vec![1, 2]).unwrap();
        tape.write(i32::MIN).unwrap();
        assert_eq!(tape.read().unwrap(), i32::MIN);
        assert_eq!(tape.into_vec(), vec![i32::MIN, 2]);
    }
}
