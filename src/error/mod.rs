//! Error types for the league assistant.
//!
//! Each domain (configuration, record storage, external sources, row data, waivers,
//! notifications, commands) has its own `thiserror` enum. They are aggregated into the
//! crate-wide [`Error`] so services can propagate with `?` and callers can classify
//! failures with [`Error::to_retry_strategy`].

pub mod command;
pub mod config;
pub mod data;
pub mod notify;
pub mod retry;
pub mod source;
pub mod storage;
pub mod waiver;

use thiserror::Error;

use crate::error::{
    command::CommandError, config::ConfigError, data::DataError, notify::NotifyError,
    source::SourceError, storage::StorageError, waiver::WaiverError,
};

/// Main error type for the league assistant.
///
/// Nothing in the refresh/poll core is fatal to the process: every variant is logged by
/// the scheduler and the affected cycle is retried on the next tick. Only configuration
/// errors at startup terminate the binary.
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or invalid environment variable / directory file.
    #[error(transparent)]
    ConfigError(#[from] ConfigError),
    /// Record file could not be created, read, or written.
    #[error(transparent)]
    StorageError(#[from] StorageError),
    /// Spreadsheet or transactions source failed (network, status, malformed payload).
    #[error(transparent)]
    SourceError(#[from] SourceError),
    /// Fetched data did not have the expected shape.
    #[error(transparent)]
    DataError(#[from] DataError),
    /// Waiver designation or processing failure.
    #[error(transparent)]
    WaiverError(#[from] WaiverError),
    /// Notification could not be handed to the external sender.
    #[error(transparent)]
    NotifyError(#[from] NotifyError),
    /// Command parsing or registry validation failure.
    #[error(transparent)]
    CommandError(#[from] CommandError),
}
