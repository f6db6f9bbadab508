use std::path::PathBuf;

use csv::StringRecord;
use tempfile::TempDir;

use super::*;

mod append;

#[derive(Debug, Clone, PartialEq)]
struct Entry {
    name: String,
    count: u32,
}

impl Entry {
    fn new(name: &str, count: u32) -> Self {
        Self {
            name: name.to_string(),
            count,
        }
    }
}

impl Record for Entry {
    const HEADER: &'static [&'static str] = &["Name", "Count"];

    fn to_row(&self) -> Vec<String> {
        vec![self.name.clone(), self.count.to_string()]
    }

    fn from_row(row: &StringRecord) -> Option<Self> {
        Some(Self {
            name: row.get(0)?.to_string(),
            count: row.get(1)?.parse().ok()?,
        })
    }
}

/// Store rooted in a nested, not yet existing directory of a fresh temp dir.
fn store() -> (TempDir, RecordStore<Entry>) {
    let dir = tempfile::tempdir().unwrap();
    let path: PathBuf = dir.path().join("nested").join("entries.csv");
    (dir, RecordStore::new(path))
}

fn contents(store: &RecordStore<Entry>) -> String {
    std::fs::read_to_string(store.path()).unwrap()
}
