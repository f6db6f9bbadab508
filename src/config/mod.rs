pub mod league;

use std::{path::PathBuf, str::FromStr, time::Duration};

use crate::error::config::ConfigError;

pub const DEFAULT_SHEETS_BASE_URL: &str = "https://docs.google.com";
/// Sheet tab id of the master player pool.
pub const DEFAULT_PLAYER_POOL_GID: &str = "286507798";

pub struct Config {
    pub google_sheets_id: String,
    pub fantrax_league_id: String,
    pub sheets_base_url: String,
    pub transactions_base_url: String,
    pub player_pool_gid: String,
    pub data_dir: PathBuf,
    pub league_directory_path: Option<PathBuf>,
    pub command_prefix: String,
    pub log_level: String,
    pub player_refresh_interval: Duration,
    pub transaction_poll_interval: Duration,
    pub waiver_poll_interval: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            google_sheets_id: required("GOOGLE_SHEETS_ID")?,
            fantrax_league_id: required("FANTRAX_LEAGUE_ID")?,
            sheets_base_url: or_default("SHEETS_BASE_URL", DEFAULT_SHEETS_BASE_URL),
            transactions_base_url: required("TRANSACTIONS_BASE_URL")?,
            player_pool_gid: or_default("PLAYER_POOL_GID", DEFAULT_PLAYER_POOL_GID),
            data_dir: PathBuf::from(or_default("DATA_DIR", "./data")),
            league_directory_path: optional("LEAGUE_DIRECTORY_PATH").map(PathBuf::from),
            command_prefix: or_default("COMMAND_PREFIX", "!"),
            log_level: or_default("LOG_LEVEL", "info"),
            player_refresh_interval: Duration::from_secs(
                parsed::<u64>("PLAYER_REFRESH_MINUTES", 30)? * 60,
            ),
            transaction_poll_interval: Duration::from_secs(parsed(
                "TRANSACTION_POLL_SECONDS",
                120,
            )?),
            waiver_poll_interval: Duration::from_secs(parsed("WAIVER_POLL_SECONDS", 120)?),
        })
    }

    /// Path of the transaction ledger file inside the data directory.
    pub fn transactions_path(&self) -> PathBuf {
        self.data_dir.join("transactions.csv")
    }

    /// Path of the waiver claim file inside the data directory.
    pub fn waivers_path(&self) -> PathBuf {
        self.data_dir.join("waivers.csv")
    }
}

fn optional(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|value| !value.trim().is_empty())
}

fn required(var: &str) -> Result<String, ConfigError> {
    optional(var).ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
}

fn or_default(var: &str, default: &str) -> String {
    optional(var).unwrap_or_else(|| default.to_string())
}

fn parsed<T>(var: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr + PartialOrd + Default,
    T::Err: std::fmt::Display,
{
    let Some(raw) = optional(var) else {
        return Ok(default);
    };

    let value = raw
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvValue {
            var: var.to_string(),
            reason: e.to_string(),
        })?;

    if value <= T::default() {
        return Err(ConfigError::InvalidEnvValue {
            var: var.to_string(),
            reason: format!("{raw} must be greater than zero"),
        });
    }

    Ok(value)
}
