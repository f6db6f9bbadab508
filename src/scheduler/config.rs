use std::time::Duration;

use crate::config::Config;

/// Intervals for the background loops.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// How often the player pool is re-downloaded.
    pub player_refresh_interval: Duration,

    /// How often the transactions feed is polled.
    pub transaction_poll_interval: Duration,

    /// How often expired waiver claims are looked for.
    pub waiver_poll_interval: Duration,

    /// Maximum time to wait for a loop to exit on shutdown.
    /// If a loop doesn't stop within this time, a warning is logged.
    pub shutdown_timeout: Duration,
}

impl SchedulerConfig {
    /// Takes the poll intervals from the environment configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            player_refresh_interval: config.player_refresh_interval,
            transaction_poll_interval: config.transaction_poll_interval,
            waiver_poll_interval: config.waiver_poll_interval,
            ..Self::default()
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            player_refresh_interval: Duration::from_secs(30 * 60), // 30 minutes
            transaction_poll_interval: Duration::from_secs(2 * 60), // 2 minutes
            waiver_poll_interval: Duration::from_secs(2 * 60),     // 2 minutes
            shutdown_timeout: Duration::from_secs(5),
        }
    }
}
