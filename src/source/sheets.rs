//! Spreadsheet export client.
//!
//! The league keeps its master player pool in a public spreadsheet. Each tab can be
//! downloaded as CSV from `{base}/spreadsheets/d/{sheet_id}/export?format=csv&gid={gid}`;
//! the player pool tab has a title row, a header row, then one player per row.

use std::{future::Future, time::Duration};

use crate::{
    error::{data::DataError, source::SourceError, Error},
    model::player::PlayerRecord,
    service::retry::RetryContext,
    source::PlayerSource,
};

/// Upper bound on a single export download.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(120);

/// Rows before the first player: sheet title and column headers.
const PLAYER_POOL_HEADER_ROWS: usize = 2;

pub struct SheetsClient {
    http: reqwest::Client,
    base_url: String,
    sheet_id: String,
    player_pool_gid: String,
    retry: RetryContext,
}

impl SheetsClient {
    /// Creates a client for one spreadsheet.
    ///
    /// # Arguments
    /// - `base_url` - Export host, `https://docs.google.com` in production
    /// - `sheet_id` - Spreadsheet id from the sheet URL
    /// - `player_pool_gid` - Tab id of the master player pool
    ///
    /// # Returns
    /// - `Ok(SheetsClient)` - Client with the default retry policy
    /// - `Err(Error)` - The HTTP client could not be built
    pub fn new(base_url: &str, sheet_id: &str, player_pool_gid: &str) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(SourceError::from)?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            sheet_id: sheet_id.to_string(),
            player_pool_gid: player_pool_gid.to_string(),
            retry: RetryContext::default(),
        })
    }

    pub fn with_retry(mut self, retry: RetryContext) -> Self {
        self.retry = retry;
        self
    }

    pub fn export_url(&self, gid: &str) -> String {
        format!(
            "{}/spreadsheets/d/{}/export?format=csv&gid={}",
            self.base_url, self.sheet_id, gid
        )
    }

    /// Downloads one tab as rows of cells, retrying transient failures.
    pub async fn fetch_sheet(&self, gid: &str) -> Result<Vec<Vec<String>>, Error> {
        let url = self.export_url(gid);
        let url = url.as_str();
        let description = format!("sheet export gid={gid}");

        self.retry
            .execute_with_retry(&description, move || self.fetch_once(url))
            .await
    }

    /// Downloads and parses the master player pool.
    pub async fn load_player_pool(&self) -> Result<Vec<PlayerRecord>, Error> {
        let rows = self.fetch_sheet(&self.player_pool_gid).await?;
        let players = parse_player_pool(&rows)?;

        tracing::info!(
            "Parsed {} player(s) from {} player pool row(s)",
            players.len(),
            rows.len().saturating_sub(PLAYER_POOL_HEADER_ROWS)
        );

        Ok(players)
    }

    async fn fetch_once(&self, url: &str) -> Result<Vec<Vec<String>>, Error> {
        let response = self.http.get(url).send().await.map_err(SourceError::from)?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            }
            .into());
        }

        let body = response.bytes().await.map_err(SourceError::from)?;
        let rows = parse_csv(&body)?;
        if rows.is_empty() {
            return Err(SourceError::EmptyExport(url.to_string()).into());
        }

        Ok(rows)
    }
}

impl PlayerSource for SheetsClient {
    fn fetch_players(&self) -> impl Future<Output = Result<Vec<PlayerRecord>, Error>> + Send {
        self.load_player_pool()
    }
}

fn parse_csv(body: &[u8]) -> Result<Vec<Vec<String>>, SourceError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(body);

    reader
        .records()
        .map(|record| {
            record
                .map(|record| record.iter().map(str::to_string).collect())
                .map_err(|e| SourceError::MalformedCsv(e.to_string()))
        })
        .collect()
}

/// Builds player records from the rows of the player pool tab.
///
/// Rows that are too short, have no name, or hold an unparsable salary are skipped.
///
/// # Returns
/// - `Ok(Vec<PlayerRecord>)` - Every player that parsed
/// - `Err(DataError::InsufficientRows)` - Export lacks the title, header, or any data row
pub fn parse_player_pool(rows: &[Vec<String>]) -> Result<Vec<PlayerRecord>, DataError> {
    if rows.len() <= PLAYER_POOL_HEADER_ROWS {
        return Err(DataError::InsufficientRows { found: rows.len() });
    }

    let mut players = Vec::with_capacity(rows.len() - PLAYER_POOL_HEADER_ROWS);
    for (index, row) in rows.iter().enumerate().skip(PLAYER_POOL_HEADER_ROWS) {
        match PlayerRecord::from_sheet_row(index, row) {
            Ok(Some(player)) => players.push(player),
            Ok(None) => {}
            Err(e) => tracing::debug!("Skipping player pool row: {}", e),
        }
    }

    Ok(players)
}

#[cfg(test)]
mod tests {
    use ulb_test_utils::prelude::*;

    use super::*;

    #[test]
    fn builds_export_url() {
        let client = SheetsClient::new("https://docs.google.com/", "abc123", "286507798").unwrap();

        assert_eq!(
            client.export_url("286507798"),
            "https://docs.google.com/spreadsheets/d/abc123/export?format=csv&gid=286507798"
        );
    }

    #[test]
    fn parses_quoted_cells() {
        let rows = parse_csv(b"a,\"$1,000\",c\n\"multi\nline\",x\n").unwrap();

        assert_eq!(rows[0], vec!["a", "$1,000", "c"]);
        assert_eq!(rows[1], vec!["multi\nline", "x"]);
    }

    #[test]
    fn player_pool_needs_a_data_row() {
        let rows = vec![vec!["Title".to_string()], vec!["Header".to_string()]];

        assert!(matches!(
            parse_player_pool(&rows),
            Err(DataError::InsufficientRows { found: 2 })
        ));
    }

    #[test]
    fn player_pool_skips_bad_rows() {
        let mut short = factory::player_row("", "Short Row", "C").build();
        short.truncate(10);
        let rows = vec![
            vec!["Master Player Pool".to_string()],
            factory::player_pool_header(),
            factory::player_row("Oakland Expos", "Mookie Betts", "SS").build(),
            short,
            factory::player_row("", "", "").build(),
            factory::player_row("Havana Bananas", "Bad Salary", "SP")
                .contract(2025, "$abc")
                .build(),
            factory::player_row("", "Pete Alonso", "1B").build(),
        ];

        let players = parse_player_pool(&rows).unwrap();

        let names: Vec<&str> = players.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Mookie Betts", "Pete Alonso"]);
    }

    /// Expect the pool to be fetched from the configured tab and parsed
    #[tokio::test]
    async fn loads_player_pool_from_export() -> Result<(), TestError> {
        let body = factory::player_pool_csv(vec![
            factory::player_row("Oakland Expos", "Mookie Betts", "SS")
                .contract(2025, "$30,000,000")
                .build(),
            factory::player_row("", "Pete Alonso", "1B").build(),
        ]);
        let test = TestBuilder::new()
            .with_player_pool_endpoint(&body, 1)
            .build()
            .await?;

        let client = SheetsClient::new(&test.server_url(), TEST_SHEET_ID, TEST_PLAYER_POOL_GID)
            .unwrap()
            .with_retry(RetryContext::new(4, Duration::from_millis(1)));
        let players = client.fetch_players().await.unwrap();

        assert_eq!(players.len(), 2);
        assert_eq!(players[0].salary(2025), Some(30_000_000));
        test.assert_mocks();

        Ok(())
    }

    /// Expect a server error to be retried until the attempts run out
    #[tokio::test]
    async fn retries_server_errors() -> Result<(), TestError> {
        let test = TestBuilder::new()
            .with_player_pool_status(500, 4)
            .build()
            .await?;

        let client = SheetsClient::new(&test.server_url(), TEST_SHEET_ID, TEST_PLAYER_POOL_GID)
            .unwrap()
            .with_retry(RetryContext::new(4, Duration::from_millis(1)));
        let result = client.load_player_pool().await;

        assert!(matches!(
            result,
            Err(Error::SourceError(SourceError::Status { status: 500, .. }))
        ));
        test.assert_mocks();

        Ok(())
    }

    /// Expect a missing sheet to fail without retrying
    #[tokio::test]
    async fn does_not_retry_not_found() -> Result<(), TestError> {
        let test = TestBuilder::new()
            .with_player_pool_status(404, 1)
            .build()
            .await?;

        let client = SheetsClient::new(&test.server_url(), TEST_SHEET_ID, TEST_PLAYER_POOL_GID)
            .unwrap()
            .with_retry(RetryContext::new(4, Duration::from_millis(1)));
        let result = client.load_player_pool().await;

        assert!(matches!(
            result,
            Err(Error::SourceError(SourceError::Status { status: 404, .. }))
        ));
        test.assert_mocks();

        Ok(())
    }

    /// Expect an empty body to be retried, then reported
    #[tokio::test]
    async fn empty_export_is_an_error() -> Result<(), TestError> {
        let test = TestBuilder::new()
            .with_player_pool_endpoint("", 2)
            .build()
            .await?;

        let client = SheetsClient::new(&test.server_url(), TEST_SHEET_ID, TEST_PLAYER_POOL_GID)
            .unwrap()
            .with_retry(RetryContext::new(2, Duration::from_millis(1)));
        let result = client.load_player_pool().await;

        assert!(matches!(
            result,
            Err(Error::SourceError(SourceError::EmptyExport(_)))
        ));
        test.assert_mocks();

        Ok(())
    }
}
