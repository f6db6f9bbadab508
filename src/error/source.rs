use thiserror::Error;

/// Failure fetching from the spreadsheet export or the transactions feed.
#[derive(Error, Debug)]
pub enum SourceError {
    /// Connection, timeout, or body decoding failure reported by the HTTP client.
    #[error(transparent)]
    Request(#[from] reqwest::Error),

    /// The source answered with a non-success status code.
    #[error("Unexpected status code {status} from {url}")]
    Status { url: String, status: u16 },

    /// The spreadsheet export body could not be parsed as CSV.
    #[error("Failed to read CSV export: {0}")]
    MalformedCsv(String),

    /// The spreadsheet export parsed but contained no rows.
    #[error("Spreadsheet export from {0} contained no rows")]
    EmptyExport(String),
}
