use super::{source::SourceError, Error};

/// Strategy for handling errors in a retry context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorRetryStrategy {
    /// Retry with exponential backoff (network and server errors)
    Retry,
    /// Failed permanently (bad request, bad configuration, bad data)
    Fail,
}

impl Error {
    /// Determine error retry strategy based upon application Error type
    pub fn to_retry_strategy(&self) -> ErrorRetryStrategy {
        match self {
            Self::SourceError(source_error) => match source_error {
                SourceError::Request(reqwest_error) => match reqwest_error.status() {
                    Some(status) if status.is_server_error() => ErrorRetryStrategy::Retry,
                    Some(status) if status.as_u16() == 429 => ErrorRetryStrategy::Retry,
                    Some(_) => ErrorRetryStrategy::Fail,
                    // Network error, timeout or connection issue
                    None => ErrorRetryStrategy::Retry,
                },

                // 500 - the export service is temporarily unavailable
                // 429 - rate limited, back off before asking again
                // 4xx - wrong sheet id or gid, retrying won't help
                SourceError::Status { status, .. } => {
                    if *status >= 500 || *status == 429 {
                        ErrorRetryStrategy::Retry
                    } else {
                        ErrorRetryStrategy::Fail
                    }
                }

                // Exports occasionally come back truncated mid-download
                SourceError::MalformedCsv(_) => ErrorRetryStrategy::Retry,
                SourceError::EmptyExport(_) => ErrorRetryStrategy::Retry,
            },

            // Storage errors - the next tick retries the whole cycle instead
            Self::StorageError(_) => ErrorRetryStrategy::Fail,

            // Data shape errors - permanent until someone edits the sheet
            Self::DataError(_) => ErrorRetryStrategy::Fail,

            // Configuration errors - permanent failures, won't resolve with retry
            Self::ConfigError(_) => ErrorRetryStrategy::Fail,

            // Waiver errors - user input or unknown message id
            Self::WaiverError(_) => ErrorRetryStrategy::Fail,

            // Notification errors - redelivered by the next waiver poll
            Self::NotifyError(_) => ErrorRetryStrategy::Fail,

            Self::CommandError(_) => ErrorRetryStrategy::Fail,
        }
    }
}
