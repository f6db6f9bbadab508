//! HTTP mock endpoint creation utilities.
//!
//! Endpoints registered here verify they were called the expected number of times when
//! `TestContext::assert_mocks` runs.

use mockito::{Matcher, Mock};

use crate::{
    constant::{TEST_LEAGUE_ID, TEST_PLAYER_POOL_GID, TEST_SHEET_ID},
    error::TestError,
    TestContext,
};

/// Path of the player pool export for the test spreadsheet, without the query.
pub fn player_pool_path() -> String {
    format!("/spreadsheets/d/{TEST_SHEET_ID}/export")
}

pub fn transactions_path(league_id: &str) -> String {
    format!("/leagues/{league_id}/transactions")
}

fn player_pool_query() -> Matcher {
    Matcher::AllOf(vec![
        Matcher::UrlEncoded("format".into(), "csv".into()),
        Matcher::UrlEncoded("gid".into(), TEST_PLAYER_POOL_GID.into()),
    ])
}

impl TestContext {
    /// Create a mock player pool export returning `csv_body`.
    ///
    /// # Arguments
    /// - `csv_body` - Body returned as `text/csv`
    /// - `expected_requests` - Number of times this endpoint should be called
    ///
    /// # Returns
    /// - `Mock` - The created mock endpoint
    pub fn create_player_pool_endpoint(&mut self, csv_body: &str, expected_requests: usize) -> Mock {
        self.server
            .mock("GET", player_pool_path().as_str())
            .match_query(player_pool_query())
            .with_status(200)
            .with_header("content-type", "text/csv")
            .with_body(csv_body)
            .expect(expected_requests)
            .create()
    }

    /// Create a mock player pool export answering with `status` and no body.
    pub fn create_player_pool_status(&mut self, status: usize, expected_requests: usize) -> Mock {
        self.server
            .mock("GET", player_pool_path().as_str())
            .match_query(player_pool_query())
            .with_status(status)
            .expect(expected_requests)
            .create()
    }

    /// Create a mock transactions feed returning `transactions` as a JSON array.
    ///
    /// # Arguments
    /// - `transactions` - Feed entries
    /// - `expected_requests` - Number of times this endpoint should be called
    ///
    /// # Returns
    /// - `Ok(Mock)` - The created mock endpoint
    /// - `Err(TestError)` - The entries could not be serialized
    pub fn create_transactions_endpoint(
        &mut self,
        transactions: &[serde_json::Value],
        expected_requests: usize,
    ) -> Result<Mock, TestError> {
        let body = serde_json::to_string(transactions)?;

        Ok(self
            .server
            .mock("GET", transactions_path(TEST_LEAGUE_ID).as_str())
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .expect(expected_requests)
            .create())
    }

    /// Create a mock transactions feed answering with `status` and no body.
    pub fn create_transactions_status(&mut self, status: usize, expected_requests: usize) -> Mock {
        self.server
            .mock("GET", transactions_path(TEST_LEAGUE_ID).as_str())
            .with_status(status)
            .expect(expected_requests)
            .create()
    }
}
