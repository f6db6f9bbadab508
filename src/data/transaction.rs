use csv::StringRecord;

use crate::{
    data::{format_timestamp, parse_timestamp, record::Record},
    model::transaction::Transaction,
};

/// Columns every ledger row has; rows written before claim types were recorded stop here.
const LEGACY_COLUMNS: usize = 20;

impl Record for Transaction {
    const HEADER: &'static [&'static str] = &[
        "ID",
        "Type",
        "TeamName",
        "TeamID",
        "FromTeamName",
        "FromTeamID",
        "ToTeamName",
        "ToTeamID",
        "PlayerName",
        "PlayerID",
        "PlayerTeam",
        "PlayerPosition",
        "BidAmount",
        "Priority",
        "ProcessedDate",
        "Period",
        "Executed",
        "ExecutedBy",
        "TradeGroupID",
        "TradeGroupSize",
        "ClaimType",
    ];

    fn to_row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.kind.to_string(),
            self.team_name.clone(),
            self.team_id.clone(),
            self.from_team_name.clone(),
            self.from_team_id.clone(),
            self.to_team_name.clone(),
            self.to_team_id.clone(),
            self.player_name.clone(),
            self.player_id.clone(),
            self.player_team.clone(),
            self.player_position.clone(),
            self.bid_amount.clone(),
            self.priority.clone(),
            format_timestamp(&self.processed_date),
            self.period.to_string(),
            self.executed.to_string(),
            self.executed_by.clone(),
            self.trade_group_id.clone().unwrap_or_default(),
            self.trade_group_size.to_string(),
            self.claim_type.clone().unwrap_or_default(),
        ]
    }

    fn from_row(row: &StringRecord) -> Option<Self> {
        if row.len() < LEGACY_COLUMNS {
            return None;
        }

        let cell = |index: usize| row.get(index).unwrap_or_default().to_string();
        let non_empty = |index: usize| Some(cell(index)).filter(|value| !value.is_empty());

        Some(Self {
            id: cell(0),
            kind: cell(1).into(),
            team_name: cell(2),
            team_id: cell(3),
            from_team_name: cell(4),
            from_team_id: cell(5),
            to_team_name: cell(6),
            to_team_id: cell(7),
            player_name: cell(8),
            player_id: cell(9),
            player_team: cell(10),
            player_position: cell(11),
            bid_amount: cell(12),
            priority: cell(13),
            processed_date: parse_timestamp(&cell(14))?,
            period: cell(15).trim().parse().unwrap_or_default(),
            executed: cell(16).trim().eq_ignore_ascii_case("true"),
            executed_by: cell(17),
            trade_group_id: non_empty(18),
            trade_group_size: cell(19).trim().parse().unwrap_or_default(),
            claim_type: non_empty(20),
        })
    }
}
