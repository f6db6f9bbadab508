//! Fixture factories.
//!
//! Player pool rows are produced as raw cells in export column order so tests exercise
//! the same parsing path as a real download. Feed entries are produced as JSON values in
//! the feed's camelCase shape.

use serde_json::{json, Value};

use crate::constant::TEST_PROCESSED_DATE;

/// Cells per player pool row, through the contract note column.
pub const PLAYER_ROW_LEN: usize = 28;
const FIRST_CONTRACT_COLUMN: usize = 12;
const FIRST_CONTRACT_YEAR: i32 = 2025;

/// Builder for one player pool row.
pub struct PlayerRowBuilder {
    cells: Vec<String>,
}

impl PlayerRowBuilder {
    fn set(mut self, column: usize, value: &str) -> Self {
        self.cells[column] = value.to_string();
        self
    }

    pub fn sort(self, sort: &str) -> Self {
        self.set(2, sort)
    }

    pub fn agency(self, agency: &str) -> Self {
        self.set(4, agency)
    }

    pub fn mlb_team(self, mlb_team: &str) -> Self {
        self.set(6, mlb_team)
    }

    pub fn age(self, age: &str) -> Self {
        self.set(7, age)
    }

    pub fn points(self, points: &str) -> Self {
        self.set(8, points)
    }

    pub fn options(self, options_left: &str, option_used: &str) -> Self {
        self.set(9, options_left).set(10, option_used)
    }

    pub fn status(self, status: &str) -> Self {
        self.set(11, status)
    }

    /// Sets the contract cell for `year` (2025 through 2039).
    pub fn contract(self, year: i32, value: &str) -> Self {
        let column = FIRST_CONTRACT_COLUMN + (year - FIRST_CONTRACT_YEAR) as usize;
        self.set(column, value)
    }

    pub fn note(self, note: &str) -> Self {
        self.set(27, note)
    }

    pub fn build(self) -> Vec<String> {
        self.cells
    }
}

/// Start a player pool row with the given league team, name and positions.
///
/// # Arguments
/// - `team` - League team, empty for an unowned player
/// - `name` - Player name
/// - `position` - Comma separated positions
///
/// # Returns
/// - `PlayerRowBuilder` - Row builder with every other cell empty
pub fn player_row(team: &str, name: &str, position: &str) -> PlayerRowBuilder {
    let mut cells = vec![String::new(); PLAYER_ROW_LEN];
    cells[1] = team.to_string();
    cells[3] = name.to_string();
    cells[5] = position.to_string();
    PlayerRowBuilder { cells }
}

/// Header row of the player pool tab.
pub fn player_pool_header() -> Vec<String> {
    let mut header: Vec<String> = [
        "", "ULB Team", "Sort", "Player", "Agency", "Pos", "MLB", "Age", "Pts", "Options",
        "Opt Used", "Status",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    header.extend((FIRST_CONTRACT_YEAR..=2039).map(|year| year.to_string()));
    header.push("Notes".to_string());
    header
}

/// Full player pool export body: title row, header row, then `rows`.
pub fn player_pool_csv(rows: Vec<Vec<String>>) -> String {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());

    let _ = writer.write_record(["Master Player Pool"]);
    let _ = writer.write_record(player_pool_header());
    for row in rows {
        let _ = writer.write_record(row);
    }

    writer
        .into_inner()
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .unwrap_or_default()
}

/// Feed entry of the given type with every optional field empty.
pub fn transaction_json(id: &str, kind: &str) -> Value {
    json!({
        "id": id,
        "type": kind,
        "teamName": "",
        "teamId": "",
        "fromTeamName": "",
        "fromTeamId": "",
        "toTeamName": "",
        "toTeamId": "",
        "playerName": "",
        "playerId": "",
        "playerTeam": "",
        "playerPosition": "",
        "bidAmount": "",
        "priority": "",
        "processedDate": TEST_PROCESSED_DATE,
        "period": 1,
        "executed": true,
        "executedBy": "",
        "tradeGroupId": null,
        "tradeGroupSize": 0,
        "claimType": null
    })
}

fn with_fields(mut value: Value, fields: Value) -> Value {
    if let (Some(target), Value::Object(fields)) = (value.as_object_mut(), fields) {
        target.extend(fields);
    }
    value
}

/// Claim feed entry; `claim_type` is `FA` or `WW`.
pub fn claim_json(id: &str, team: &str, player: &str, claim_type: &str) -> Value {
    with_fields(
        transaction_json(id, "CLAIM"),
        json!({
            "teamName": team,
            "playerName": player,
            "claimType": claim_type
        }),
    )
}

pub fn drop_json(id: &str, team: &str, player: &str) -> Value {
    with_fields(
        transaction_json(id, "DROP"),
        json!({
            "teamName": team,
            "playerName": player
        }),
    )
}

/// One leg of a trade: `player` moves from `from_team` to `to_team`.
pub fn trade_leg_json(id: &str, group_id: &str, from_team: &str, to_team: &str, player: &str) -> Value {
    with_fields(
        transaction_json(id, "TRADE"),
        json!({
            "fromTeamName": from_team,
            "toTeamName": to_team,
            "playerName": player,
            "tradeGroupId": group_id
        }),
    )
}
