//! Durable record files.
//!
//! [`record::RecordStore`] is the generic append-and-scan store; the sibling modules
//! define how transactions and waiver claims map onto CSV rows.

pub mod record;
pub mod transaction;
pub mod waiver;

use chrono::{DateTime, SecondsFormat, Utc};

pub(crate) fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|timestamp| timestamp.with_timezone(&Utc))
}
