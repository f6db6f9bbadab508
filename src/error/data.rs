use thiserror::Error;

/// Fetched data did not have the shape the parsers depend on.
///
/// Row-level variants cause only the offending row to be skipped; sheet-level variants
/// abort the refresh before anything is published.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("Player pool sheet has {found} row(s), expected a title row, a header row and at least one player")]
    InsufficientRows { found: usize },

    #[error("Row {row} has {found} column(s), expected at least {expected}")]
    TooFewColumns {
        row: usize,
        found: usize,
        expected: usize,
    },

    #[error("Unparsable salary {value:?} for {player} in {year}")]
    InvalidSalary {
        player: String,
        year: i32,
        value: String,
    },

    #[error("Player pool refresh produced no players")]
    EmptyPlayerPool,

    /// Nothing is cached and the load that was attempted did not publish a snapshot.
    #[error("Player data is not available")]
    PlayersUnavailable,
}
