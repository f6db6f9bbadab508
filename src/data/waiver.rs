use csv::StringRecord;

use crate::{
    data::{format_timestamp, parse_timestamp, record::Record},
    model::waiver::WaiverClaim,
};

impl Record for WaiverClaim {
    const HEADER: &'static [&'static str] = &[
        "PlayerName",
        "TeamName",
        "UserID",
        "StartTime",
        "EndTime",
        "MessageID",
        "ChannelID",
        "Processed",
    ];

    fn to_row(&self) -> Vec<String> {
        vec![
            self.player_name.clone(),
            self.team_name.clone(),
            self.user_id.clone(),
            format_timestamp(&self.start_time),
            format_timestamp(&self.end_time),
            self.message_id.clone(),
            self.channel_id.clone(),
            self.processed.to_string(),
        ]
    }

    fn from_row(row: &StringRecord) -> Option<Self> {
        if row.len() < Self::HEADER.len() {
            return None;
        }

        Some(Self {
            player_name: row.get(0)?.to_string(),
            team_name: row.get(1)?.to_string(),
            user_id: row.get(2)?.to_string(),
            start_time: parse_timestamp(row.get(3)?)?,
            end_time: parse_timestamp(row.get(4)?)?,
            message_id: row.get(5)?.to_string(),
            channel_id: row.get(6)?.to_string(),
            processed: row.get(7)?.trim().eq_ignore_ascii_case("true"),
        })
    }
}
