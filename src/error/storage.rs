//! Record store error types.
//!
//! Storage errors abort the enclosing poll cycle without mutating state; the scheduler
//! logs them and the cycle is retried on the next tick.

use std::path::PathBuf;

use thiserror::Error;

/// Failure while creating, scanning, appending to, or rewriting a record file.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Filesystem operation failed (missing permissions, disk full, ...).
    #[error("I/O error on record file {path:?} while trying to {action}: {source}")]
    Io {
        path: PathBuf,
        action: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// CSV encoder/decoder failed while reading or writing rows.
    #[error("CSV error on record file {path:?}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// The blocking task doing the file work panicked or was cancelled.
    #[error("Record file task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, action: &'static str, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            action,
            source,
        }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Csv {
            path: path.into(),
            source,
        }
    }
}
