//! Designation and waiver expiry through the record file.

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use tempfile::TempDir;
use ulb_assistant::{
    config::league::LeagueDirectory,
    model::{event::NotificationEvent, player::{PlayerList, PlayerRecord}},
    service::{
        notify::ChannelNotifier,
        waiver::{DesignationRequest, WaiverMonitor, WaiverTracker},
    },
};
use ulb_test_utils::prelude::*;

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
}

fn tracker(dir: &TempDir) -> WaiverTracker {
    WaiverTracker::new(dir.path().join("waivers.csv"))
}

fn players() -> PlayerList {
    let rows = vec![
        factory::player_row("Oakland Expos", "Joey Bart", "C").build(),
        factory::player_row("Havana Bananas", "Joey Gallo", "LF").build(),
    ];
    rows.iter()
        .filter_map(|row| PlayerRecord::from_sheet_row(2, row).ok().flatten())
        .collect::<Vec<_>>()
        .into()
}

fn designate(tracker: &WaiverTracker, query: &str, message_id: &str) {
    let directory = LeagueDirectory::builder()
        .team("Oakland Expos", &["expos_owner"])
        .build();
    let request = DesignationRequest {
        query: query.to_string(),
        username: "expos_owner".to_string(),
        user_id: "1001".to_string(),
        message_id: message_id.to_string(),
        channel_id: "dfa-waivers".to_string(),
    };

    tracker
        .designate(&players(), &directory, &request, start())
        .unwrap();
}

/// Expect a claim to expire exactly once, eight days after the designation
#[tokio::test]
async fn expired_claim_is_announced_once() -> Result<(), TestError> {
    let dir = tempfile::tempdir()?;
    designate(&tracker(&dir), "bart", "m1");

    let (notifier, mut events) = ChannelNotifier::new();
    let monitor = WaiverMonitor::new(tracker(&dir), notifier);

    assert_eq!(monitor.poll(start() + TimeDelta::days(8)).await.unwrap(), 0);
    assert_eq!(
        monitor
            .poll(start() + TimeDelta::days(8) + TimeDelta::seconds(1))
            .await
            .unwrap(),
        1
    );
    assert_eq!(monitor.poll(start() + TimeDelta::days(30)).await.unwrap(), 0);

    match events.try_recv() {
        Ok(NotificationEvent::WaiverExpired(claim)) => {
            assert_eq!(claim.player_name, "Joey Bart");
            assert_eq!(claim.user_id, "1001");
            assert_eq!(claim.message_id, "m1");
            assert_eq!(claim.end_time, start() + TimeDelta::days(8));
        }
        other => panic!("expected a waiver expiry, got {other:?}"),
    }
    assert!(events.try_recv().is_err());
    assert!(monitor.tracker().active_claims().unwrap().is_empty());

    Ok(())
}

/// Expect a claim whose notification failed to stay active and be retried
#[tokio::test]
async fn failed_delivery_is_retried_next_poll() -> Result<(), TestError> {
    let dir = tempfile::tempdir()?;
    designate(&tracker(&dir), "bart", "m1");
    let later = start() + TimeDelta::days(9);

    let (closed, receiver) = ChannelNotifier::new();
    drop(receiver);
    let failing = WaiverMonitor::new(tracker(&dir), closed);

    assert_eq!(failing.poll(later).await.unwrap(), 0);
    assert_eq!(failing.tracker().active_claims().unwrap().len(), 1);

    let (notifier, mut events) = ChannelNotifier::new();
    let monitor = WaiverMonitor::new(tracker(&dir), notifier);

    assert_eq!(monitor.poll(later).await.unwrap(), 1);
    assert!(events.try_recv().is_ok());

    Ok(())
}

/// Expect the stored file to use the fixed header and second precision timestamps
#[tokio::test]
async fn claim_file_layout() -> Result<(), TestError> {
    let dir = tempfile::tempdir()?;
    designate(&tracker(&dir), "bart", "m1");

    let contents = std::fs::read_to_string(dir.path().join("waivers.csv"))?;
    let lines: Vec<&str> = contents.lines().collect();

    assert_eq!(
        lines,
        [
            "PlayerName,TeamName,UserID,StartTime,EndTime,MessageID,ChannelID,Processed",
            "Joey Bart,Oakland Expos,1001,2025-06-01T12:00:00Z,2025-06-09T12:00:00Z,m1,dfa-waivers,false",
        ]
    );

    Ok(())
}

/// Expect a claim written by an earlier run to be processed in place, with rows that do not
/// parse carried through the rewrite
#[tokio::test]
async fn claim_file_from_previous_run() -> Result<(), TestError> {
    let header = "PlayerName,TeamName,UserID,StartTime,EndTime,MessageID,ChannelID,Processed";
    let claim = "Joey Bart,Oakland Expos,1001,2025-06-01T12:00:00Z,2025-06-09T12:00:00Z,m1,dfa-waivers,false";
    let test = TestBuilder::new()
        .with_data_file(
            "waivers.csv",
            &format!("{header}\n{claim}\nJoey Gallo,Havana Bananas,1002,yesterday\n"),
        )
        .build()
        .await?;

    let (notifier, mut events) = ChannelNotifier::new();
    let monitor = WaiverMonitor::new(WaiverTracker::new(test.data_path("waivers.csv")), notifier);

    assert_eq!(monitor.poll(start() + TimeDelta::days(9)).await.unwrap(), 1);
    assert!(events.try_recv().is_ok());

    assert_eq!(
        test.read_data_file("waivers.csv")?,
        format!(
            "{header}\n{}\nJoey Gallo,Havana Bananas,1002,yesterday\n",
            claim.replace("false", "true")
        )
    );

    Ok(())
}
