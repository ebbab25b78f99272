//! Corruption detection tests for file-backed tapes
//!
//! Verifies that malformed tape files are reported as corrupt, both when a
//! tape is opened and when the sort engine reads a damaged slot.

use std::fs::{self, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use tape_sort::{memory_factory, sort, FileTape, TapeError, TapeReader, RECORD_WIDTH};
use tempfile::TempDir;

/// Helper: overwrite one field of a tape file
fn corrupt_slot(path: &std::path::Path, slot: usize, bytes: &[u8]) {
    let mut file = OpenOptions::new().write(true).open(path).unwrap();
    file.seek(SeekFrom::Start((slot * RECORD_WIDTH) as u64)).unwrap();
    file.write_all(bytes).unwrap();
    file.flush().unwrap();
}

#[test]
fn test_truncated_file_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tape.txt");
    drop(FileTape::open(&path, 10).unwrap());

    let file = OpenOptions::new().write(true).open(&path).unwrap();
    file.set_len(FileTape::expected_len(10).unwrap() - 1).unwrap();
    drop(file);

    match FileTape::open(&path, 10) {
        Err(TapeError::CorruptData(msg)) => assert!(msg.contains("119"), "{}", msg),
        other => panic!("expected CorruptData, got {:?}", other),
    }
}

#[test]
fn test_exact_expected_length_accepted() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tape.txt");
    fs::write(&path, " ".repeat(FileTape::expected_len(4).unwrap() as usize)).unwrap();
    let tape = FileTape::open(&path, 4).unwrap();
    assert_eq!(tape.read_safe().unwrap(), None);
}

#[test]
fn test_reopen_larger_size_is_corrupt() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tape.txt");
    drop(FileTape::open(&path, 3).unwrap());
    assert!(matches!(
        FileTape::open(&path, 4),
        Err(TapeError::CorruptData(_))
    ));
    // a smaller tape over the same file is still fine
    assert!(FileTape::open(&path, 2).is_ok());
}

#[test]
fn test_garbage_field_detected_on_read() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tape.txt");
    drop(FileTape::open(&path, 3).unwrap());
    corrupt_slot(&path, 1, b"   12abc   ");

    let tape = FileTape::open(&path, 3).unwrap();
    assert_eq!(tape.read_safe().unwrap(), None);
    assert!(tape.move_right());
    assert!(matches!(tape.read_safe(), Err(TapeError::CorruptData(_))));
    assert!(matches!(tape.read(), Err(TapeError::CorruptData(_))));
}

#[test]
fn test_sort_propagates_corrupt_source() {
    let dir = TempDir::new().unwrap();
    let src_path = dir.path().join("src.txt");
    {
        let mut src = FileTape::open(&src_path, 4).unwrap();
        tape_sort::write_all(&mut src, &[4, 3, 2, 1]).unwrap();
    }
    corrupt_slot(&src_path, 2, b"XXXXXXXXXXX");

    let src = FileTape::open(&src_path, 4).unwrap();
    let mut dst = FileTape::open(dir.path().join("dst.txt"), 4).unwrap();
    let result = sort(&src, 4, &mut dst, 2, &memory_factory);
    assert!(matches!(result, Err(TapeError::CorruptData(_))));
}

#[test]
fn test_sort_of_empty_slots_fails() {
    let dir = TempDir::new().unwrap();
    let src = FileTape::open(dir.path().join("src.txt"), 3).unwrap();
    let mut dst = FileTape::open(dir.path().join("dst.txt"), 3).unwrap();
    let result = sort(&src, 3, &mut dst, 3, &memory_factory);
    assert!(matches!(result, Err(TapeError::EmptySlot { position: 0 })));
}
