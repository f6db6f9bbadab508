//! Append-and-scan persistence over a flat CSV file.
//!
//! A [`RecordStore`] owns exactly one file. The first line is the header declared by the
//! record type; every following line is one record. Appends are flushed and synced before
//! returning, and rewrites go through a temporary sibling file that is renamed over the
//! original so a crash never leaves a half-written store behind.

use std::{
    fs::{self, File, OpenOptions},
    io::{Read, Seek, SeekFrom, Write},
    marker::PhantomData,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard, PoisonError},
};

use csv::{ByteRecord, StringRecord};

use crate::error::storage::StorageError;

/// A type that can be stored as one CSV line.
pub trait Record: Sized {
    /// Column names written as the first line of a fresh file.
    const HEADER: &'static [&'static str];

    fn to_row(&self) -> Vec<String>;

    /// Decodes one line, returning `None` when the line is too short or malformed.
    fn from_row(row: &StringRecord) -> Option<Self>;
}

enum Slot {
    Parsed(usize),
    Raw(ByteRecord),
}

pub struct RecordStore<R> {
    path: PathBuf,
    lock: Mutex<()>,
    _record: PhantomData<fn() -> R>,
}

impl<R: Record> RecordStore<R> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
            _record: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates the parent directory and writes the header if the file is absent or empty.
    ///
    /// Calling this on an already initialized store leaves the file untouched.
    pub fn initialize(&self) -> Result<(), StorageError> {
        let _guard = self.lock();
        self.initialize_locked()
    }

    /// Appends `records` in order, one line each.
    ///
    /// The data is synced to disk before returning. If the file ends in a torn line left by
    /// an earlier crash, the tail is repaired first so the new rows stay separate: a tail
    /// cut off inside a quoted field is dropped, any other tail is terminated.
    ///
    /// # Arguments
    /// - `records` - Records to append, may be empty
    ///
    /// # Returns
    /// - `Ok(())` - Every record was written and synced
    /// - `Err(StorageError)` - The file could not be opened or written
    pub fn append(&self, records: &[R]) -> Result<(), StorageError> {
        if records.is_empty() {
            return Ok(());
        }

        let _guard = self.lock();
        if self.path.exists() {
            self.repair_torn_tail()?;
        }
        self.initialize_locked()?;

        let file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .map_err(|e| StorageError::io(&self.path, "open for append", e))?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_writer(file);

        for record in records {
            writer
                .write_record(record.to_row())
                .map_err(|e| StorageError::csv(&self.path, e))?;
        }

        self.finish(writer, "append")
    }

    /// Reads every record after the header.
    ///
    /// Lines that fail to decode are skipped. A missing file scans as empty.
    ///
    /// # Returns
    /// - `Ok(Vec<R>)` - Decoded records in file order
    /// - `Err(StorageError)` - An I/O error interrupted the scan
    pub fn scan_all(&self) -> Result<Vec<R>, StorageError> {
        let _guard = self.lock();

        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let (records, slots) = self.read_slots()?;
        let skipped = slots.iter().filter(|s| matches!(s, Slot::Raw(_))).count();
        if skipped > 0 {
            tracing::debug!(
                "Skipped {} unreadable row(s) in {}",
                skipped,
                self.path.display()
            );
        }

        Ok(records)
    }

    /// Reads every record, applies `mutate`, and atomically replaces the file.
    ///
    /// Rows that could not be decoded, including rows that are not valid UTF-8, are written
    /// back unchanged at their original position. Records pushed by `mutate` are written after the existing rows.
    ///
    /// # Arguments
    /// - `mutate` - Closure applied to the decoded records
    ///
    /// # Returns
    /// - `Ok(T)` - Whatever `mutate` returned, after the new file is in place
    /// - `Err(StorageError)` - Reading, writing, syncing, or renaming failed; the original
    ///   file is left as it was
    pub fn rewrite_with<T, F>(&self, mutate: F) -> Result<T, StorageError>
    where
        F: FnOnce(&mut Vec<R>) -> T,
    {
        let _guard = self.lock();
        self.initialize_locked()?;

        let (mut records, slots) = self.read_slots()?;
        let parsed_before = records.len();

        let output = mutate(&mut records);

        let tmp_path = self.tmp_path();
        let file =
            File::create(&tmp_path).map_err(|e| StorageError::io(&tmp_path, "create", e))?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_writer(file);

        let mut rows: Vec<ByteRecord> = Vec::with_capacity(slots.len() + 1);
        rows.push(ByteRecord::from(R::HEADER.to_vec()));
        for slot in slots {
            match slot {
                Slot::Parsed(index) => {
                    if let Some(record) = records.get(index) {
                        rows.push(ByteRecord::from(record.to_row()));
                    }
                }
                Slot::Raw(row) => rows.push(row),
            }
        }
        for record in records.iter().skip(parsed_before) {
            rows.push(ByteRecord::from(record.to_row()));
        }

        for row in &rows {
            writer
                .write_byte_record(row)
                .map_err(|e| StorageError::csv(&tmp_path, e))?;
        }
        self.finish(writer, "rewrite")?;

        fs::rename(&tmp_path, &self.path).map_err(|e| StorageError::io(&self.path, "rename", e))?;

        Ok(output)
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }

    fn initialize_locked(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|e| StorageError::io(parent, "create directory", e))?;
            }
        }

        let needs_header = match fs::metadata(&self.path) {
            Ok(metadata) => metadata.len() == 0,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
            Err(e) => return Err(StorageError::io(&self.path, "stat", e)),
        };

        if needs_header {
            let file =
                File::create(&self.path).map_err(|e| StorageError::io(&self.path, "create", e))?;
            let mut writer = csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(file);
            writer
                .write_record(R::HEADER)
                .map_err(|e| StorageError::csv(&self.path, e))?;
            self.finish(writer, "write header")?;

            tracing::debug!("Initialized record file {}", self.path.display());
        }

        Ok(())
    }

    /// Repairs a last line left unfinished by a crash mid-append.
    ///
    /// The file is scanned for the end of the last complete line, counting quotes so a
    /// newline inside a quoted field is not mistaken for one. A tail that stops inside a
    /// quoted field would swallow every later row into that field, so it is cut off. Any
    /// other tail is terminated with a newline and left for `scan_all` to skip.
    fn repair_torn_tail(&self) -> Result<(), StorageError> {
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&self.path)
            .map_err(|e| StorageError::io(&self.path, "open", e))?;

        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)
            .map_err(|e| StorageError::io(&self.path, "read", e))?;

        let (complete, in_quotes) = complete_prefix_len(&bytes);
        if complete == bytes.len() {
            return Ok(());
        }

        if in_quotes {
            tracing::warn!(
                "Record file {} ends inside a quoted field, dropping {} byte(s) of torn line",
                self.path.display(),
                bytes.len() - complete
            );
            file.set_len(complete as u64)
                .map_err(|e| StorageError::io(&self.path, "truncate torn line", e))?;
        } else {
            tracing::warn!(
                "Record file {} ends in a partial line, terminating it before appending",
                self.path.display()
            );
            file.seek(SeekFrom::End(0))
                .and_then(|_| file.write_all(b"\n"))
                .map_err(|e| StorageError::io(&self.path, "repair trailing line", e))?;
        }

        file.sync_all()
            .map_err(|e| StorageError::io(&self.path, "repair trailing line", e))
    }

    fn read_slots(&self) -> Result<(Vec<R>, Vec<Slot>), StorageError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(&self.path)
            .map_err(|e| StorageError::csv(&self.path, e))?;

        let mut records = Vec::new();
        let mut slots = Vec::new();

        for result in reader.byte_records() {
            let raw = result.map_err(|e| StorageError::csv(&self.path, e))?;

            let decoded = match StringRecord::from_byte_record(raw) {
                Ok(row) => match R::from_row(&row) {
                    Some(record) => Ok(record),
                    None => Err(row.into_byte_record()),
                },
                Err(e) => Err(e.into_byte_record()),
            };

            match decoded {
                Ok(record) => {
                    slots.push(Slot::Parsed(records.len()));
                    records.push(record);
                }
                Err(raw) => slots.push(Slot::Raw(raw)),
            }
        }

        Ok((records, slots))
    }

    fn finish(
        &self,
        mut writer: csv::Writer<File>,
        action: &'static str,
    ) -> Result<(), StorageError> {
        writer
            .flush()
            .map_err(|e| StorageError::io(&self.path, action, e))?;
        let file = writer.into_inner().map_err(|e| {
            let source = std::io::Error::new(e.error().kind(), e.error().to_string());
            StorageError::io(&self.path, action, source)
        })?;
        file.sync_all()
            .map_err(|e| StorageError::io(&self.path, action, e))
    }
}

/// Runs synchronous record file work on tokio's blocking thread pool.
///
/// Store operations hold a std mutex and do plain file I/O, so async callers hand them
/// off here instead of running them on a runtime worker.
pub async fn run_blocking<T, E, F>(work: F) -> Result<T, E>
where
    F: FnOnce() -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: From<StorageError> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(StorageError::from)?
}

/// Length of the prefix of `bytes` that ends with a complete line, and whether the
/// remainder stops inside a quoted field.
fn complete_prefix_len(bytes: &[u8]) -> (usize, bool) {
    let mut in_quotes = false;
    let mut complete = 0;

    for (index, byte) in bytes.iter().enumerate() {
        match byte {
            // An escaped `""` flips twice
            b'"' => in_quotes = !in_quotes,
            b'\n' if !in_quotes => complete = index + 1,
            _ => {}
        }
    }

    (complete, in_quotes)
}

#[cfg(test)]
mod tests;
