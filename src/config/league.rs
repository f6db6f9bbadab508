//! League directory: which chat users own which fantasy teams.
//!
//! Loaded once at startup from a JSON file and passed explicitly to the code that needs
//! ownership checks:
//!
//! ```json
//! {
//!   "commissioners": ["leaguecommish"],
//!   "teams": {
//!     "Oakland Expos": ["owner_one", "owner_two"],
//!     "Havana Bananas": ["owner_three"]
//!   }
//! }
//! ```

use std::{collections::BTreeMap, path::Path};

use serde::Deserialize;

use crate::error::config::ConfigError;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LeagueDirectory {
    /// Users allowed to act on any team.
    #[serde(default)]
    commissioners: Vec<String>,
    /// Team name -> chat usernames of its owners. Co-owners are equal.
    #[serde(default)]
    teams: BTreeMap<String, Vec<String>>,
}

impl LeagueDirectory {
    /// Reads and parses the directory file.
    ///
    /// # Arguments
    /// - `path` - Location of the JSON directory file
    ///
    /// # Returns
    /// - `Ok(LeagueDirectory)` - Parsed directory
    /// - `Err(ConfigError::InvalidLeagueDirectory)` - File missing or not valid JSON
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidLeagueDirectory {
            path: path.display().to_string(),
            reason,
        };

        let contents = std::fs::read_to_string(path).map_err(|e| invalid(e.to_string()))?;
        Self::from_json(&contents).map_err(|e| invalid(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn builder() -> LeagueDirectoryBuilder {
        LeagueDirectoryBuilder::default()
    }

    /// Teams on which `username` is listed as an owner (case-insensitive).
    pub fn teams_for_owner(&self, username: &str) -> Vec<&str> {
        self.teams
            .iter()
            .filter(|(_, owners)| owners.iter().any(|o| o.eq_ignore_ascii_case(username)))
            .map(|(team, _)| team.as_str())
            .collect()
    }

    pub fn owners_of(&self, team: &str) -> &[String] {
        self.teams.get(team).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_team_owner(&self, team: &str, username: &str) -> bool {
        self.owners_of(team)
            .iter()
            .any(|o| o.eq_ignore_ascii_case(username))
    }

    pub fn is_commissioner(&self, username: &str) -> bool {
        self.commissioners
            .iter()
            .any(|c| c.eq_ignore_ascii_case(username))
    }

    pub fn team_count(&self) -> usize {
        self.teams.len()
    }
}

#[derive(Default)]
pub struct LeagueDirectoryBuilder {
    directory: LeagueDirectory,
}

impl LeagueDirectoryBuilder {
    pub fn team(mut self, team: &str, owners: &[&str]) -> Self {
        self.directory.teams.insert(
            team.to_string(),
            owners.iter().map(|o| o.to_string()).collect(),
        );
        self
    }

    pub fn commissioner(mut self, username: &str) -> Self {
        self.directory.commissioners.push(username.to_string());
        self
    }

    pub fn build(self) -> LeagueDirectory {
        self.directory
    }
}
