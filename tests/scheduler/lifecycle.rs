//! The scheduled loops wired together, from startup to shutdown.

use std::time::Duration;

use chrono::{TimeDelta, Utc};
use ulb_assistant::{
    model::{event::NotificationEvent, waiver::WaiverClaim},
    scheduler::{Scheduler, SchedulerConfig},
    service::{
        notify::ChannelNotifier,
        player::PlayerService,
        transaction::{TransactionLedger, TransactionMonitor},
        waiver::{WaiverMonitor, WaiverTracker},
    },
    source::{sheets::SheetsClient, transactions::HttpTransactionSource},
};
use ulb_test_utils::prelude::*;

/// Expect every loop to run at start and the scheduler to stop cleanly
#[tokio::test]
async fn monitors_run_until_stopped() -> Result<(), TestError> {
    let body = factory::player_pool_csv(vec![
        factory::player_row("Oakland Expos", "Joey Bart", "C").build(),
    ]);
    let test = TestBuilder::new()
        .with_player_pool_endpoint(&body, 1)
        .with_transactions_endpoint(
            vec![factory::claim_json("1", "Oakland Expos", "Juan Soto", "FA")],
            1,
        )
        .build()
        .await?;

    let tracker = WaiverTracker::new(test.data_path("waivers.csv"));
    tracker
        .add(&WaiverClaim::new(
            "Joey Bart",
            "Oakland Expos",
            "1001",
            "m1",
            "c1",
            Utc::now() - TimeDelta::days(9),
        ))
        .unwrap();

    let (notifier, mut events) = ChannelNotifier::new();
    let players = std::sync::Arc::new(PlayerService::new(
        SheetsClient::new(&test.server_url(), TEST_SHEET_ID, TEST_PLAYER_POOL_GID).unwrap(),
    ));
    let transactions = std::sync::Arc::new(TransactionMonitor::new(
        HttpTransactionSource::new(&test.server_url(), TEST_LEAGUE_ID).unwrap(),
        TransactionLedger::new(test.data_path("transactions.csv")),
        notifier.clone(),
    ));
    let waivers = std::sync::Arc::new(WaiverMonitor::new(tracker, notifier));

    let scheduler = Scheduler::new(SchedulerConfig::default());
    scheduler
        .start_monitors(players.clone(), transactions.clone(), waivers.clone())
        .await;
    assert_eq!(scheduler.job_count().await, 3);

    let event = tokio::time::timeout(Duration::from_secs(5), events.recv())
        .await
        .expect("waiver expiry was not delivered");
    assert!(matches!(event, Some(NotificationEvent::WaiverExpired(_))));

    tokio::time::timeout(Duration::from_secs(5), async {
        while players.get_players().await.is_none()
            || transactions.ledger().load_known().map(|k| k.row_count).unwrap_or(0) == 0
        {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("player pool or ledger was not loaded");

    scheduler.stop().await;

    assert!(!scheduler.is_running().await);
    assert!(events.try_recv().is_err());
    test.assert_mocks();

    Ok(())
}
