//! Retry logic with exponential backoff for source fetches.
//!
//! This module provides the `RetryContext` for executing operations with automatic retry
//! logic and exponential backoff. It integrates with the error system to determine which
//! errors are retryable.

use std::{future::Future, time::Duration};

use crate::error::{retry::ErrorRetryStrategy, Error};

/// Context for executing operations with automatic retry logic.
///
/// # Retry Behavior
///
/// - **Max attempts**: 4 (default), the first try plus three retries
/// - **Backoff strategy**: Exponential starting at 5 seconds (5s, 10s, 20s), capped at 5 minutes
/// - **Retry conditions**: Only errors with `ErrorRetryStrategy::Retry` are retried
/// - **Permanent failures**: Errors with `ErrorRetryStrategy::Fail` return immediately
///
/// # Example
///
/// ```ignore
/// let retry = RetryContext::default();
///
/// let rows = retry
///     .execute_with_retry("player pool export", || async {
///         client.fetch_once(&url).await
///     })
///     .await?;
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RetryContext {
    /// Maximum number of attempts before giving up
    max_attempts: u32,
    /// Backoff before the first retry (doubles with each retry)
    initial_backoff: Duration,
}

impl Default for RetryContext {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_ATTEMPTS, Self::DEFAULT_INITIAL_BACKOFF)
    }
}

impl RetryContext {
    const DEFAULT_MAX_ATTEMPTS: u32 = 4;
    const DEFAULT_INITIAL_BACKOFF: Duration = Duration::from_secs(5);
    const MAX_BACKOFF: Duration = Duration::from_secs(300);

    /// Creates a retry context.
    ///
    /// # Arguments
    /// - `max_attempts` - Total attempts including the first one, at least 1
    /// - `initial_backoff` - Delay before the first retry
    ///
    /// # Returns
    /// - `RetryContext` - New retry context
    pub fn new(max_attempts: u32, initial_backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_backoff,
        }
    }

    /// Context that tries exactly once.
    pub fn no_retry() -> Self {
        Self::new(1, Duration::ZERO)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay before retry number `retry` (1-based), doubling each time up to
    /// [`Self::MAX_BACKOFF`].
    fn backoff(&self, retry: u32) -> Duration {
        2_u32
            .checked_pow(retry.saturating_sub(1))
            .and_then(|factor| self.initial_backoff.checked_mul(factor))
            .map_or(Self::MAX_BACKOFF, |backoff| backoff.min(Self::MAX_BACKOFF))
    }

    /// Executes an operation with automatic retry logic and exponential backoff.
    ///
    /// Runs the provided async operation up to `max_attempts` times, retrying on transient
    /// failures with exponential backoff. Errors are evaluated using `to_retry_strategy()`
    /// to determine if they are retryable or permanent failures.
    ///
    /// # Arguments
    /// - `description` - Human-readable description for logging (e.g., "player pool export")
    /// - `operation` - Async function returning `Result<R, Error>`, called once per attempt
    ///
    /// # Returns
    /// - `Ok(R)` - Operation succeeded
    /// - `Err(Error)` - Operation failed permanently or exhausted all retry attempts
    pub async fn execute_with_retry<R, F, Fut>(
        &self,
        description: &str,
        mut operation: F,
    ) -> Result<R, Error>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<R, Error>>,
    {
        let mut attempt_count = 0;

        loop {
            tracing::debug!(
                "Processing {} (attempt {}/{})",
                description,
                attempt_count + 1,
                self.max_attempts
            );

            match operation().await {
                Ok(result) => {
                    if attempt_count > 0 {
                        tracing::info!(
                            "Succeeded {} on attempt {}/{}",
                            description,
                            attempt_count + 1,
                            self.max_attempts
                        );
                    }
                    return Ok(result);
                }
                Err(e) => match e.to_retry_strategy() {
                    ErrorRetryStrategy::Fail => {
                        tracing::error!("Permanent error for {}: {}", description, e);
                        return Err(e);
                    }
                    ErrorRetryStrategy::Retry => {
                        attempt_count += 1;
                        if attempt_count >= self.max_attempts {
                            tracing::error!(
                                "Max attempts ({}) exceeded for {}: {}",
                                self.max_attempts,
                                description,
                                e
                            );
                            return Err(e);
                        }

                        let backoff = self.backoff(attempt_count);

                        tracing::warn!(
                            "Retrying {} (attempt {}/{}) after {:?}: {}",
                            description,
                            attempt_count + 1,
                            self.max_attempts,
                            backoff,
                            e
                        );

                        tokio::time::sleep(backoff).await;
                    }
                },
            }
        }
    }
}
