use std::collections::BTreeMap;

use crate::error::data::DataError;

/// Fewest cells a player pool row can have; the contract note sits in the last one.
pub const MIN_ROW_LEN: usize = 28;
/// Season covered by the first contract column.
pub const FIRST_CONTRACT_YEAR: i32 = 2025;
/// Season covered by the last contract column.
pub const LAST_CONTRACT_YEAR: i32 = 2038;

const COL_TEAM: usize = 1;
const COL_SORT: usize = 2;
const COL_NAME: usize = 3;
const COL_AGENCY: usize = 4;
const COL_POSITION: usize = 5;
const COL_MLB_TEAM: usize = 6;
const COL_AGE: usize = 7;
const COL_POINTS: usize = 8;
const COL_OPTIONS: usize = 9;
const COL_OPTION_USED: usize = 10;
const COL_STATUS: usize = 11;
const COL_FIRST_CONTRACT: usize = 12;
const COL_CONTRACT_NOTE: usize = 27;

const FREE_AGENT_MARKER: &str = "FREE AGENT";

/// Value of one contract year cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContractValue {
    /// Salary in whole dollars, written as `$1,234,567` in the sheet.
    Salary(u64),
    /// The player becomes a free agent that year.
    FreeAgent,
    /// Anything else the league writes into a contract cell (`ARB`, `TC`, ...).
    Status(String),
}

impl ContractValue {
    /// Parses a trimmed, non-empty contract cell.
    ///
    /// Returns `None` for text starting with `$` that is not a valid dollar amount.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.contains(FREE_AGENT_MARKER) {
            return Some(Self::FreeAgent);
        }

        match raw.strip_prefix('$') {
            Some(amount) => amount.replace(',', "").trim().parse().ok().map(Self::Salary),
            None => Some(Self::Status(raw.to_string())),
        }
    }
}

/// One row of the master player pool.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerRecord {
    /// League team holding the player's rights; empty when unowned.
    pub team: String,
    pub sort: String,
    pub name: String,
    pub agency: String,
    /// Comma separated eligible positions, e.g. `2B,SS`.
    pub position: String,
    pub mlb_team: String,
    pub age: Option<u32>,
    pub prior_year_points: Option<f64>,
    pub options_left: String,
    pub option_used: String,
    /// Roster status such as `40-Man` or `Minors`.
    pub status: String,
    /// Sparse by year: a missing year means the sheet had nothing for it.
    pub contract: BTreeMap<i32, ContractValue>,
    pub contract_note: String,
}

impl PlayerRecord {
    /// Builds a record from one data row of the player pool export.
    ///
    /// # Arguments
    /// - `row_index` - Zero-based row number in the export, used in error messages
    /// - `row` - Cells of the row
    ///
    /// # Returns
    /// - `Ok(Some(PlayerRecord))` - Row describes a player
    /// - `Ok(None)` - Row has no player name (spacer or section break)
    /// - `Err(DataError)` - Row is too short or holds an unparsable salary
    pub fn from_sheet_row<S: AsRef<str>>(
        row_index: usize,
        row: &[S],
    ) -> Result<Option<Self>, DataError> {
        if row.len() < MIN_ROW_LEN {
            return Err(DataError::TooFewColumns {
                row: row_index,
                found: row.len(),
                expected: MIN_ROW_LEN,
            });
        }

        let cell = |index: usize| row[index].as_ref().trim();

        let name = cell(COL_NAME);
        if name.is_empty() {
            return Ok(None);
        }

        let mut contract = BTreeMap::new();
        for year in FIRST_CONTRACT_YEAR..=LAST_CONTRACT_YEAR {
            let raw = cell(COL_FIRST_CONTRACT + (year - FIRST_CONTRACT_YEAR) as usize);
            if raw.is_empty() {
                continue;
            }

            let value = ContractValue::parse(raw).ok_or_else(|| DataError::InvalidSalary {
                player: name.to_string(),
                year,
                value: raw.to_string(),
            })?;
            contract.insert(year, value);
        }

        Ok(Some(Self {
            team: cell(COL_TEAM).to_string(),
            sort: cell(COL_SORT).to_string(),
            name: name.to_string(),
            agency: cell(COL_AGENCY).to_string(),
            position: cell(COL_POSITION).to_string(),
            mlb_team: cell(COL_MLB_TEAM).to_string(),
            age: cell(COL_AGE).parse().ok(),
            prior_year_points: cell(COL_POINTS).parse().ok(),
            options_left: cell(COL_OPTIONS).to_string(),
            option_used: cell(COL_OPTION_USED).to_string(),
            status: cell(COL_STATUS).to_string(),
            contract,
            contract_note: cell(COL_CONTRACT_NOTE).to_string(),
        }))
    }

    pub fn salary(&self, year: i32) -> Option<u64> {
        match self.contract.get(&year) {
            Some(ContractValue::Salary(amount)) => Some(*amount),
            _ => None,
        }
    }

    pub fn is_free_agent(&self, year: i32) -> bool {
        matches!(self.contract.get(&year), Some(ContractValue::FreeAgent))
    }

    pub fn has_contract(&self) -> bool {
        !self.contract.is_empty()
    }

    pub fn is_owned(&self) -> bool {
        !self.team.is_empty()
    }

    /// Lowercased eligible positions.
    pub fn positions(&self) -> impl Iterator<Item = String> + '_ {
        self.position
            .split(',')
            .map(|p| p.trim().to_lowercase())
            .filter(|p| !p.is_empty())
    }
}

/// Expands composite position names into the positions they cover.
///
/// `mi` covers 2B, SS and players listed as MI; `of` includes generic OF. Any other name
/// stands for itself.
pub fn position_aliases(position: &str) -> Vec<String> {
    let position = position.trim().to_lowercase();
    let covered: &[&str] = match position.as_str() {
        "mi" => &["2b", "ss", "mi"],
        "ci" => &["1b", "3b"],
        "if" => &["1b", "2b", "3b", "ss"],
        "of" => &["lf", "cf", "rf", "of"],
        "ut" => &["ut"],
        _ => return vec![position],
    };

    covered.iter().map(|p| p.to_string()).collect()
}

/// Aggregates over a group of players for one season.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerStats {
    pub count: usize,
    pub total_points: f64,
    pub average_points: f64,
    pub total_salary: u64,
    /// Average over players with a salary that season.
    pub average_salary: u64,
    pub free_agent_count: usize,
}

/// Immutable snapshot of the whole player pool.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerList {
    players: Vec<PlayerRecord>,
}

impl From<Vec<PlayerRecord>> for PlayerList {
    fn from(players: Vec<PlayerRecord>) -> Self {
        Self { players }
    }
}

impl PlayerList {
    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PlayerRecord> {
        self.players.iter()
    }

    /// Case-insensitive substring match on the player name.
    pub fn search_by_name(&self, query: &str) -> Vec<&PlayerRecord> {
        let query = query.trim().to_lowercase();
        self.filter(|p| p.name.to_lowercase().contains(&query))
    }

    /// Case-insensitive exact match; several players can share a name.
    pub fn find_by_exact_name(&self, name: &str) -> Vec<&PlayerRecord> {
        self.filter(|p| p.name.eq_ignore_ascii_case(name.trim()))
    }

    pub fn filter_by_team(&self, team: &str) -> Vec<&PlayerRecord> {
        self.filter(|p| p.team.trim().eq_ignore_ascii_case(team.trim()))
    }

    pub fn filter_by_mlb_team(&self, mlb_team: &str) -> Vec<&PlayerRecord> {
        self.filter(|p| p.mlb_team.eq_ignore_ascii_case(mlb_team.trim()))
    }

    pub fn filter_by_status(&self, status: &str) -> Vec<&PlayerRecord> {
        self.filter(|p| p.status.eq_ignore_ascii_case(status.trim()))
    }

    /// Players eligible at `position`, expanding composite positions.
    pub fn filter_by_position(&self, position: &str) -> Vec<&PlayerRecord> {
        let wanted = position_aliases(position);
        self.filter(|p| p.positions().any(|pos| wanted.contains(&pos)))
    }

    pub fn free_agents(&self, year: i32) -> Vec<&PlayerRecord> {
        self.filter(|p| p.is_free_agent(year))
    }

    pub fn unowned(&self) -> Vec<&PlayerRecord> {
        self.filter(|p| !p.is_owned())
    }

    pub fn team_payroll(&self, team: &str, year: i32) -> u64 {
        self.filter_by_team(team)
            .iter()
            .filter_map(|p| p.salary(year))
            .sum()
    }

    /// Highest paid players for `year`, players without a salary sorting last.
    pub fn top_salaries(&self, year: i32, n: usize) -> Vec<&PlayerRecord> {
        let mut sorted: Vec<&PlayerRecord> = self.players.iter().collect();
        sorted.sort_by(|a, b| b.salary(year).unwrap_or(0).cmp(&a.salary(year).unwrap_or(0)));
        sorted.truncate(n);
        sorted
    }

    pub fn top_performers(&self, n: usize) -> Vec<&PlayerRecord> {
        let mut sorted: Vec<&PlayerRecord> = self.players.iter().collect();
        sorted.sort_by(|a, b| {
            let a = a.prior_year_points.unwrap_or(0.0);
            let b = b.prior_year_points.unwrap_or(0.0);
            b.total_cmp(&a)
        });
        sorted.truncate(n);
        sorted
    }

    /// Owned players keyed by league team.
    pub fn group_by_team(&self) -> BTreeMap<&str, Vec<&PlayerRecord>> {
        let mut grouped: BTreeMap<&str, Vec<&PlayerRecord>> = BTreeMap::new();
        for player in self.players.iter().filter(|p| p.is_owned()) {
            grouped.entry(player.team.as_str()).or_default().push(player);
        }
        grouped
    }

    pub fn stats(&self, year: i32) -> PlayerStats {
        let mut stats = PlayerStats {
            count: self.players.len(),
            ..Default::default()
        };

        let mut salaried = 0u64;
        for player in &self.players {
            stats.total_points += player.prior_year_points.unwrap_or(0.0);
            if let Some(salary) = player.salary(year) {
                stats.total_salary += salary;
                salaried += 1;
            }
            if player.is_free_agent(year) {
                stats.free_agent_count += 1;
            }
        }

        if stats.count > 0 {
            stats.average_points = stats.total_points / stats.count as f64;
        }
        if salaried > 0 {
            stats.average_salary = stats.total_salary / salaried;
        }

        stats
    }

    fn filter<F>(&self, predicate: F) -> Vec<&PlayerRecord>
    where
        F: Fn(&PlayerRecord) -> bool,
    {
        self.players.iter().filter(|p| predicate(p)).collect()
    }
}

impl<'a> IntoIterator for &'a PlayerList {
    type Item = &'a PlayerRecord;
    type IntoIter = std::slice::Iter<'a, PlayerRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.players.iter()
    }
}
