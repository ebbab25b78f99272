//! Tape contract shared by every storage backend
//!
//! A tape is a fixed-length sequence of slots with a single head. Reading and
//! head movement go through [`TapeReader`], which takes `&self`: the head is
//! interior state owned by a single caller, so a read-only tape can still be
//! scanned. Writing requires the [`Tape`] capability and `&mut self`.
//!
//! All operations may block, either on real I/O or on emulated device latency.

use crate::error::Result;

/// Value stored in a tape slot
pub type Element = i32;

/// Read-only view of a tape: read at the head and move the head
pub trait TapeReader {
    /// Read the element under the head
    ///
    /// The result for a slot that was never written is backend specific;
    /// use [`TapeReader::read_safe`] when emptiness matters.
    fn read(&self) -> Result<Element>;

    /// Read the element under the head, or `None` if the slot was never written
    fn read_safe(&self) -> Result<Option<Element>>;

    /// Move the head one slot towards index 0
    ///
    /// Returns `false` and leaves the head in place when already at index 0.
    fn move_left(&self) -> bool;

    /// Move the head one slot towards the last index
    ///
    /// Returns `false` and leaves the head in place when already at the end.
    fn move_right(&self) -> bool;

    /// Move the head to index 0
    fn rewind(&self) {
        while self.move_left() {}
    }
}

/// Writable tape
pub trait Tape: TapeReader {
    /// Store `value` in the slot under the head
    fn write(&mut self, value: Element) -> Result<()>;
}

impl<T: TapeReader + ?Sized> TapeReader for Box<T> {
    fn read(&self) -> Result<Element> {
        (**self).read()
    }

    fn read_safe(&self) -> Result<Option<Element>> {
        (**self).read_safe()
    }

    fn move_left(&self) -> bool {
        (**self).move_left()
    }

    fn move_right(&self) -> bool {
        (**self).move_right()
    }

    fn rewind(&self) {
        (**self).rewind()
    }
}

impl<T: Tape + ?Sized> Tape for Box<T> {
    fn write(&mut self, value: Element) -> Result<()> {
        (**self).write(value)
    }
}

/// Source of scratch tapes for the sort engine
///
/// The engine only knows the logical size it needs; where the tape lives
/// (memory, a file in some directory) is up to the factory.
pub trait TapeFactory {
    fn create(&self, size: usize) -> Result<Box<dyn Tape>>;
}

impl<F> TapeFactory for F
where
    F: Fn(usize) -> Result<Box<dyn Tape>>,
{
    fn create(&self, size: usize) -> Result<Box<dyn Tape>> {
        self(size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    /// Minimal tape that only implements movement, to exercise the default rewind
    struct Counter {
        pos: Cell<usize>,
        len: usize,
        left_moves: Cell<usize>,
    }

    impl TapeReader for Counter {
        fn read(&self) -> Result<Element> {
            Ok(self.pos.get() as Element)
        }

        fn read_safe(&self) -> Result<Option<Element>> {
            self.read().map(Some)
        }

        fn move_left(&self) -> bool {
            self.left_moves.set(self.left_moves.get() + 1);
            match self.pos.get() {
                0 => false,
                p => {
                    self.pos.set(p - 1);
                    true
                }
            }
        }

        fn move_right(&self) -> bool {
            if self.pos.get() + 1 < self.len {
                self.pos.set(self.pos.get() + 1);
                true
            } else {
                false
            }
        }
    }

    #[test]
    fn test_default_rewind_walks_left() {
        let tape = Counter {
            pos: Cell::new(0),
            len: 5,
            left_moves: Cell::new(0),
        };
        while tape.move_right() {}
        assert_eq!(tape.read().unwrap(), 4);

        tape.rewind();
        assert_eq!(tape.read().unwrap(), 0);
        // four successful moves plus the one that reports the left edge
        assert_eq!(tape.left_moves.get(), 5);
    }

    #[test]
    fn test_closure_is_a_factory() {
        let factory = |size: usize| -> Result<Box<dyn Tape>> {
            Ok(Box::new(crate::memory::InMemoryTape::new(size)?))
        };
        let tape = factory.create(3).unwrap();
        assert!(tape.move_right());
        assert!(tape.move_right());
        assert!(!tape.move_right());
    }
}
