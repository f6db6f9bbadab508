use chrono::{DateTime, SubsecRound, TimeDelta, Utc};
use serde::Serialize;

/// Length of the waiver period started by a designation.
pub const WAIVER_PERIOD_DAYS: i64 = 8;

/// A player placed on waivers by a designation for assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WaiverClaim {
    pub player_name: String,
    /// Team that designated the player.
    pub team_name: String,
    /// Chat user who issued the designation.
    pub user_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Message that started the claim; also identifies the claim.
    pub message_id: String,
    pub channel_id: String,
    pub processed: bool,
}

impl WaiverClaim {
    /// Starts a new, unprocessed claim at `start`.
    ///
    /// Both timestamps are truncated to whole seconds so the claim reads back from storage
    /// exactly as it was created.
    pub fn new(
        player_name: impl Into<String>,
        team_name: impl Into<String>,
        user_id: impl Into<String>,
        message_id: impl Into<String>,
        channel_id: impl Into<String>,
        start: DateTime<Utc>,
    ) -> Self {
        let start_time = start.trunc_subsecs(0);

        Self {
            player_name: player_name.into(),
            team_name: team_name.into(),
            user_id: user_id.into(),
            start_time,
            end_time: start_time + TimeDelta::days(WAIVER_PERIOD_DAYS),
            message_id: message_id.into(),
            channel_id: channel_id.into(),
            processed: false,
        }
    }

    /// True once `now` is strictly past the end of the waiver period.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.end_time
    }
}
