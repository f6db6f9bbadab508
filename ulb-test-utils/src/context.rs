//! Test context structure and utilities.
//!
//! This module provides the `TestContext` returned by `TestBuilder`. The context owns a
//! temporary data directory for record files and a mock HTTP server standing in for the
//! spreadsheet export and the transactions feed.

use std::path::PathBuf;

use mockito::{Mock, Server, ServerGuard};
use tempfile::TempDir;

use crate::error::TestError;

/// Test context structure returned by `TestBuilder`
///
/// # Usage
///
/// ```ignore
/// let test = TestBuilder::new()
///     .with_player_pool_endpoint(&body, 1)
///     .build()
///     .await?;
///
/// let client = SheetsClient::new(&test.server_url(), TEST_SHEET_ID, TEST_PLAYER_POOL_GID)?;
/// let store_path = test.data_path("waivers.csv");
///
/// // Assert all mocks were called
/// test.assert_mocks();
/// ```
pub struct TestContext {
    /// Temporary directory removed when the context is dropped
    pub data_dir: TempDir,

    /// Mock HTTP server for the spreadsheet export and transactions feed
    pub(crate) server: ServerGuard,
    /// Collection of mock HTTP endpoints for assertion
    pub(crate) mocks: Vec<Mock>,
}

impl TestContext {
    pub async fn new() -> Result<Self, TestError> {
        let server = Server::new_async().await;
        let data_dir = tempfile::tempdir()?;

        Ok(Self {
            data_dir,
            server,
            mocks: Vec::new(),
        })
    }

    /// Base URL of the mock server, usable as both the sheets and transactions base.
    pub fn server_url(&self) -> String {
        self.server.url()
    }

    /// Path of a file inside the temporary data directory.
    pub fn data_path(&self, file_name: &str) -> PathBuf {
        self.data_dir.path().join(file_name)
    }

    /// Writes `contents` to a file inside the data directory.
    pub fn write_data_file(&self, file_name: &str, contents: &str) -> Result<PathBuf, TestError> {
        let path = self.data_path(file_name);
        std::fs::write(&path, contents)?;
        Ok(path)
    }

    pub fn read_data_file(&self, file_name: &str) -> Result<String, TestError> {
        Ok(std::fs::read_to_string(self.data_path(file_name))?)
    }

    /// Assert all mock endpoints were called as expected.
    pub fn assert_mocks(&self) {
        for mock in &self.mocks {
            mock.assert();
        }
    }
}
