//! Bulk helpers on top of the tape contract

use crate::error::Result;
use crate::tape::{Element, Tape, TapeReader};
use std::fmt::Write as _;

/// Write `values` forward starting at the head
///
/// The head moves right after every element except the last, so it ends on
/// the last element written.
pub fn write_all(tape: &mut dyn Tape, values: &[Element]) -> Result<()> {
    for (i, &value) in values.iter().enumerate() {
        tape.write(value)?;
        if i + 1 < values.len() {
            tape.move_right();
        }
    }
    Ok(())
}

/// Read `n` elements forward starting at the head
///
/// The head ends on the last element read.
pub fn read_forward(tape: &dyn TapeReader, n: usize) -> Result<Vec<Element>> {
    let mut values = Vec::with_capacity(n);
    for i in 0..n {
        values.push(tape.read()?);
        if i + 1 < n {
            tape.move_right();
        }
    }
    Ok(values)
}

/// Render every slot of the tape as `tape = { 1 _ 3 }`, `_` marking empty slots
///
/// Rewinds first and leaves the head on the last slot.
pub fn render(tape: &dyn TapeReader) -> Result<String> {
    tape.rewind();
    let mut out = String::from("tape = {");
    loop {
        match tape.read_safe()? {
            Some(value) => {
                let _ = write!(out, " {}", value);
            }
            None => out.push_str(" _"),
        }
        if !tape.move_right() {
            break;
        }
    }
    out.push_str(" }");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryTape;

    #[test]
    fn test_write_all_then_read_forward() {
        let mut tape = InMemoryTape::new(5).unwrap();
        write_all(&mut tape, &[4, -1, 9]).unwrap();
        assert_eq!(tape.position(), 2);

        tape.rewind();
        assert_eq!(read_forward(&tape, 3).unwrap(), vec![4, -1, 9]);
        assert_eq!(tape.position(), 2);
    }

    #[test]
    fn test_write_all_empty_slice() {
        let mut tape = InMemoryTape::new(2).unwrap();
        write_all(&mut tape, &[]).unwrap();
        assert_eq!(tape.position(), 0);
        assert_eq!(tape.read_safe().unwrap(), None);
    }

    #[test]
    fn test_render_marks_empty_slots() {
        let mut tape = InMemoryTape::new(4).unwrap();
        tape.write(1).unwrap();
        tape.move_right();
        tape.move_right();
        tape.write(-3).unwrap();

        assert_eq!(render(&tape).unwrap(), "tape = { 1 _ -3 _ }");
        assert_eq!(tape.position(), 3);
    }
}
