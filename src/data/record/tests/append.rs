//! Tests for RecordStore::append.

use super::*;

/// Expected: rows land after the header in the order given
#[test]
fn appends_rows_in_order() {
    let (_dir, store) = store();
    store.initialize().unwrap();

    store
        .append(&[Entry::new("Judge", 3), Entry::new("Ohtani", 7)])
        .unwrap();
    store.append(&[Entry::new("Betts", 2)]).unwrap();

    assert_eq!(
        store.scan_all().unwrap(),
        vec![
            Entry::new("Judge", 3),
            Entry::new("Ohtani", 7),
            Entry::new("Betts", 2)
        ]
    );
}

/// Expected: appending to an uninitialized store creates it first
#[test]
fn initializes_missing_file() {
    let (_dir, store) = store();

    store.append(&[Entry::new("Judge", 3)]).unwrap();

    assert_eq!(contents(&store), "Name,Count\nJudge,3\n");
}

/// Expected: an empty batch does not touch the filesystem
#[test]
fn empty_batch_is_a_no_op() {
    let (_dir, store) = store();

    store.append(&[]).unwrap();

    assert!(!store.path().exists());
}

/// Expected: a torn trailing line is terminated so the new row stays on its own line
#[test]
fn repairs_torn_trailing_line() {
    let (_dir, store) = store();
    store.initialize().unwrap();
    store.append(&[Entry::new("Judge", 3)]).unwrap();

    let mut file = OpenOptions::new().append(true).open(store.path()).unwrap();
    file.write_all(b"Half,").unwrap();
    drop(file);

    store.append(&[Entry::new("Ohtani", 7)]).unwrap();

    assert_eq!(contents(&store), "Name,Count\nJudge,3\nHalf,\nOhtani,7\n");
    assert_eq!(
        store.scan_all().unwrap(),
        vec![Entry::new("Judge", 3), Entry::new("Ohtani", 7)]
    );
}

/// Expected: values containing commas and quotes survive a write and read
#[test]
fn quotes_special_characters() {
    let (_dir, store) = store();

    store.append(&[Entry::new("Tatis, \"Jr.\"", 5)]).unwrap();

    assert_eq!(
        store.scan_all().unwrap(),
        vec![Entry::new("Tatis, \"Jr.\"", 5)]
    );
}

/// Expected: a torn line cut off inside a quoted field is dropped so later rows stay readable
#[test]
fn drops_torn_quoted_line() {
    let (_dir, store) = store();
    store.append(&[Entry::new("Judge", 3)]).unwrap();

    let mut file = OpenOptions::new().append(true).open(store.path()).unwrap();
    file.write_all(b"\"Witt, J").unwrap();
    drop(file);

    store.append(&[Entry::new("Ohtani", 7)]).unwrap();
    store.append(&[Entry::new("Betts", 2)]).unwrap();

    assert_eq!(contents(&store), "Name,Count\nJudge,3\nOhtani,7\nBetts,2\n");
    assert_eq!(
        store.scan_all().unwrap(),
        vec![
            Entry::new("Judge", 3),
            Entry::new("Ohtani", 7),
            Entry::new("Betts", 2)
        ]
    );
}

/// Expected: a newline inside a quoted field does not count as the end of a line
#[test]
fn torn_line_boundary_respects_quotes() {
    assert_eq!(complete_prefix_len(b"Name,Count\nJudge,3\n"), (19, false));
    assert_eq!(complete_prefix_len(b"Name,Count\n\"Witt,\nJr"), (11, true));
    assert_eq!(complete_prefix_len(b"Name,Count\n\"Say \"\"Hey\"\"\",24\nHa"), (28, false));
}
