use std::{collections::BTreeMap, fmt};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Transaction kind as tagged by the fantasy platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TransactionType {
    Claim,
    Drop,
    Trade,
    Other(String),
}

impl TransactionType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Claim => "CLAIM",
            Self::Drop => "DROP",
            Self::Trade => "TRADE",
            Self::Other(tag) => tag,
        }
    }
}

impl From<&str> for TransactionType {
    fn from(tag: &str) -> Self {
        match tag.trim().to_ascii_uppercase().as_str() {
            "CLAIM" => Self::Claim,
            "DROP" => Self::Drop,
            "TRADE" => Self::Trade,
            _ => Self::Other(tag.trim().to_string()),
        }
    }
}

impl From<String> for TransactionType {
    fn from(tag: String) -> Self {
        Self::from(tag.as_str())
    }
}

impl From<TransactionType> for String {
    fn from(kind: TransactionType) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a newly observed transaction should be announced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TransactionRoute {
    /// Free agent signings.
    Signings,
    /// Waiver claims, drops, and anything unclassified.
    Waivers,
    /// Commissioner-executed claims moving a player onto the 40-man roster.
    Promotions,
    Trades,
}

impl TransactionRoute {
    /// Default announcement channel name for the route.
    pub fn channel_name(&self) -> &'static str {
        match self {
            Self::Signings => "signings",
            Self::Waivers => "dfa-waivers",
            Self::Promotions => "40-man-promotions",
            Self::Trades => "trades",
        }
    }
}

/// A single league transaction as reported by the transactions feed.
///
/// Trades arrive as one transaction per player moved ("leg"); the legs of one trade share
/// a trade group id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    #[serde(default)]
    pub team_name: String,
    #[serde(default)]
    pub team_id: String,
    #[serde(default)]
    pub from_team_name: String,
    #[serde(default)]
    pub from_team_id: String,
    #[serde(default)]
    pub to_team_name: String,
    #[serde(default)]
    pub to_team_id: String,
    #[serde(default)]
    pub player_name: String,
    #[serde(default)]
    pub player_id: String,
    /// MLB team of the player.
    #[serde(default)]
    pub player_team: String,
    #[serde(default)]
    pub player_position: String,
    #[serde(default)]
    pub bid_amount: String,
    #[serde(default)]
    pub priority: String,
    pub processed_date: DateTime<Utc>,
    #[serde(default)]
    pub period: i32,
    #[serde(default)]
    pub executed: bool,
    #[serde(default)]
    pub executed_by: String,
    #[serde(default)]
    pub trade_group_id: Option<String>,
    #[serde(default)]
    pub trade_group_size: u32,
    /// `FA` for free agent pickups, `WW` for waiver wire claims.
    #[serde(default)]
    pub claim_type: Option<String>,
}

impl Transaction {
    pub fn is_trade(&self) -> bool {
        self.kind == TransactionType::Trade
    }

    /// Non-empty trade group id, if any.
    pub fn trade_group(&self) -> Option<&str> {
        self.trade_group_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }

    pub fn executed_by_commissioner(&self) -> bool {
        self.executed_by.trim().eq_ignore_ascii_case("commissioner")
    }

    /// Announcement route for this transaction.
    ///
    /// Claims executed by the commissioner are roster promotions. A claim without a known
    /// claim type goes to waivers whoever executed it.
    pub fn route(&self) -> TransactionRoute {
        match self.kind {
            TransactionType::Claim => match self.claim_type.as_deref().map(str::trim) {
                Some("FA") if self.executed_by_commissioner() => TransactionRoute::Promotions,
                Some("FA") => TransactionRoute::Signings,
                Some("WW") if self.executed_by_commissioner() => TransactionRoute::Promotions,
                Some("WW") => TransactionRoute::Waivers,
                _ => TransactionRoute::Waivers,
            },
            TransactionType::Drop => TransactionRoute::Waivers,
            TransactionType::Trade => TransactionRoute::Trades,
            TransactionType::Other(_) => TransactionRoute::Waivers,
        }
    }
}

/// All legs of one trade, in the order the feed reported them.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeGroup {
    pub group_id: String,
    pub legs: Vec<Transaction>,
}

impl TradeGroup {
    /// Legs keyed by the team giving up the player.
    pub fn legs_by_sending_team(&self) -> BTreeMap<&str, Vec<&Transaction>> {
        let mut by_team: BTreeMap<&str, Vec<&Transaction>> = BTreeMap::new();
        for leg in &self.legs {
            by_team
                .entry(leg.from_team_name.as_str())
                .or_default()
                .push(leg);
        }
        by_team
    }
}
