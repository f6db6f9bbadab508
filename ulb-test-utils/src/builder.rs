//! Declarative test builder.
//!
//! This module provides the `TestBuilder` API for configuring test environments before
//! execution. Methods can be chained together, with all operations queued and executed
//! during the final `build()` call.

use mockito::{Mock, ServerGuard};

use crate::{error::TestError, TestContext};

/// Builder for declarative test initialization.
///
/// Provides an interface for setting up record files in a temporary data directory and
/// mock HTTP endpoints. Finalize with `build()` to create a complete test context.
#[derive(Default)]
pub struct TestBuilder {
    // Files to create in the data directory
    data_files: Vec<(String, String)>,

    // Mock endpoints to create
    mock_builders: Vec<Box<dyn FnOnce(&mut ServerGuard) -> Mock>>,

    // Pre-configured endpoint shortcuts
    player_pool_endpoints: Vec<(String, usize)>, // (csv body, expected_requests)
    player_pool_statuses: Vec<(usize, usize)>,   // (status, expected_requests)
    transactions_endpoints: Vec<(Vec<serde_json::Value>, usize)>,
    transactions_statuses: Vec<(usize, usize)>,
}

impl TestBuilder {
    /// Create a new TestBuilder.
    ///
    /// # Returns
    /// - `TestBuilder` - A new builder with no files or endpoints configured
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a file in the data directory before the test runs.
    ///
    /// # Arguments
    /// - `file_name` - File name relative to the data directory
    /// - `contents` - Exact file contents
    ///
    /// # Returns
    /// - `Self` - The builder instance for method chaining
    pub fn with_data_file(mut self, file_name: &str, contents: &str) -> Self {
        self.data_files
            .push((file_name.to_string(), contents.to_string()));
        self
    }

    /// Add a custom mock endpoint.
    ///
    /// Custom endpoints are created before the shortcut endpoints.
    ///
    /// # Arguments
    /// - `builder` - Closure creating the mock on the test server
    ///
    /// # Returns
    /// - `Self` - The builder instance for method chaining
    pub fn with_mock_endpoint<F>(mut self, builder: F) -> Self
    where
        F: FnOnce(&mut ServerGuard) -> Mock + 'static,
    {
        self.mock_builders.push(Box::new(builder));
        self
    }

    /// Add a player pool export endpoint returning `csv_body`.
    ///
    /// # Arguments
    /// - `csv_body` - Export body, see `factory::player_pool_csv`
    /// - `expected_requests` - Number of times this endpoint should be called
    ///
    /// # Returns
    /// - `Self` - The builder instance for method chaining
    pub fn with_player_pool_endpoint(mut self, csv_body: &str, expected_requests: usize) -> Self {
        self.player_pool_endpoints
            .push((csv_body.to_string(), expected_requests));
        self
    }

    /// Add a player pool export endpoint failing with `status`.
    pub fn with_player_pool_status(mut self, status: usize, expected_requests: usize) -> Self {
        self.player_pool_statuses.push((status, expected_requests));
        self
    }

    /// Add a transactions feed endpoint returning `transactions` as a JSON array.
    ///
    /// # Arguments
    /// - `transactions` - Feed entries, see `factory::claim_json` and friends
    /// - `expected_requests` - Number of times this endpoint should be called
    ///
    /// # Returns
    /// - `Self` - The builder instance for method chaining
    pub fn with_transactions_endpoint(
        mut self,
        transactions: Vec<serde_json::Value>,
        expected_requests: usize,
    ) -> Self {
        self.transactions_endpoints
            .push((transactions, expected_requests));
        self
    }

    /// Add a transactions feed endpoint failing with `status`.
    pub fn with_transactions_status(mut self, status: usize, expected_requests: usize) -> Self {
        self.transactions_statuses.push((status, expected_requests));
        self
    }

    /// Build the test context.
    ///
    /// Creates the data directory files, then the custom endpoints, then the shortcut
    /// endpoints.
    ///
    /// # Returns
    /// - `Ok(TestContext)` - Context ready for the test body
    /// - `Err(TestError)` - A data file could not be written
    pub async fn build(self) -> Result<TestContext, TestError> {
        let mut setup = TestContext::new().await?;

        // 1. Data files
        for (file_name, contents) in &self.data_files {
            setup.write_data_file(file_name, contents)?;
        }

        // 2. Mock endpoints
        let mut mocks = Vec::new();

        for builder in self.mock_builders {
            mocks.push(builder(&mut setup.server));
        }

        for (body, expected_requests) in self.player_pool_endpoints {
            mocks.push(setup.create_player_pool_endpoint(&body, expected_requests));
        }

        for (status, expected_requests) in self.player_pool_statuses {
            mocks.push(setup.create_player_pool_status(status, expected_requests));
        }

        for (transactions, expected_requests) in self.transactions_endpoints {
            mocks.push(setup.create_transactions_endpoint(&transactions, expected_requests)?);
        }

        for (status, expected_requests) in self.transactions_statuses {
            mocks.push(setup.create_transactions_status(status, expected_requests));
        }

        setup.mocks.extend(mocks);

        Ok(setup)
    }
}
