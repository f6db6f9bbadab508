//! Transaction monitor polls against the transactions feed.
//!
//! Each poll gets its own mock feed; the ledger lives in a directory shared by all polls,
//! the same way it outlives restarts of the assistant.

use serde_json::Value;
use tempfile::TempDir;
use tokio::sync::mpsc::UnboundedReceiver;
use ulb_assistant::{
    error::{source::SourceError, Error},
    model::{event::NotificationEvent, transaction::TransactionRoute},
    service::{
        notify::ChannelNotifier,
        transaction::{TransactionLedger, TransactionMonitor},
    },
    source::transactions::HttpTransactionSource,
};
use ulb_test_utils::prelude::*;

fn history() -> Vec<Value> {
    vec![
        factory::claim_json("1", "Oakland Expos", "Juan Soto", "FA"),
        factory::drop_json("2", "Havana Bananas", "Joey Gallo"),
        factory::trade_leg_json("3", "g-1", "Oakland Expos", "Havana Bananas", "Mookie Betts"),
        factory::trade_leg_json("4", "g-1", "Havana Bananas", "Oakland Expos", "Pete Alonso"),
    ]
}

type Monitor = TransactionMonitor<HttpTransactionSource, ChannelNotifier>;

fn monitor(test: &TestContext, ledger_dir: &TempDir) -> (Monitor, UnboundedReceiver<NotificationEvent>) {
    let source = HttpTransactionSource::new(&test.server_url(), TEST_LEAGUE_ID).unwrap();
    let ledger = TransactionLedger::new(ledger_dir.path().join("transactions.csv"));
    let (notifier, events) = ChannelNotifier::new();
    (TransactionMonitor::new(source, ledger, notifier), events)
}

async fn feed(transactions: Vec<Value>) -> Result<TestContext, TestError> {
    TestBuilder::new()
        .with_transactions_endpoint(transactions, 1)
        .build()
        .await
}

fn drain(events: &mut UnboundedReceiver<NotificationEvent>) -> Vec<NotificationEvent> {
    let mut drained = Vec::new();
    while let Ok(event) = events.try_recv() {
        drained.push(event);
    }
    drained
}

/// Expect the first poll to store history without announcing it
#[tokio::test]
async fn first_poll_bootstraps_silently() -> Result<(), TestError> {
    let ledger_dir = tempfile::tempdir()?;
    let test = feed(history()).await?;
    let (monitor, mut events) = monitor(&test, &ledger_dir);

    assert_eq!(monitor.poll().await.unwrap(), 0);

    assert!(drain(&mut events).is_empty());
    let known = monitor.ledger().load_known().unwrap();
    assert_eq!(known.row_count, 4);
    assert_eq!(known.ids.len(), 2);
    assert!(known.trade_groups.contains("g-1"));
    test.assert_mocks();

    Ok(())
}

/// Expect only new transactions and new trade groups to be announced, once
#[tokio::test]
async fn announces_new_transactions_once() -> Result<(), TestError> {
    let ledger_dir = tempfile::tempdir()?;
    let first = feed(history()).await?;
    monitor(&first, &ledger_dir).0.poll().await.unwrap();

    let mut grown = history();
    grown.push(factory::claim_json("5", "Oakland Expos", "Luis Arraez", "WW"));
    grown.push(factory::trade_leg_json("6", "g-2", "Oakland Expos", "Havana Bananas", "Joey Bart"));
    grown.push(factory::trade_leg_json("7", "g-2", "Havana Bananas", "Oakland Expos", "Joey Meneses"));

    let second = feed(grown.clone()).await?;
    let (monitor_two, mut events) = monitor(&second, &ledger_dir);
    assert_eq!(monitor_two.poll().await.unwrap(), 2);

    let events = drain(&mut events);
    assert_eq!(events.len(), 2);
    match &events[0] {
        NotificationEvent::NewTransaction { transaction, route } => {
            assert_eq!(transaction.id, "5");
            assert_eq!(*route, TransactionRoute::Waivers);
        }
        other => panic!("expected a transaction event, got {other:?}"),
    }
    match &events[1] {
        NotificationEvent::NewTrade(group) => {
            assert_eq!(group.group_id, "g-2");
            assert_eq!(group.legs.len(), 2);
        }
        other => panic!("expected a trade event, got {other:?}"),
    }

    let third = feed(grown).await?;
    let (monitor_three, mut events) = monitor(&third, &ledger_dir);
    assert_eq!(monitor_three.poll().await.unwrap(), 0);
    assert!(drain(&mut events).is_empty());
    assert_eq!(monitor_three.ledger().load_known().unwrap().row_count, 7);

    first.assert_mocks();
    second.assert_mocks();
    third.assert_mocks();

    Ok(())
}

/// Expect a failed fetch to leave the ledger byte for byte unchanged
#[tokio::test]
async fn failed_fetch_leaves_ledger_untouched() -> Result<(), TestError> {
    let ledger_dir = tempfile::tempdir()?;
    let first = feed(history()).await?;
    monitor(&first, &ledger_dir).0.poll().await.unwrap();
    let ledger_path = ledger_dir.path().join("transactions.csv");
    let before = std::fs::read_to_string(&ledger_path)?;

    let failing = TestBuilder::new()
        .with_transactions_status(503, 1)
        .build()
        .await?;
    let (monitor, mut events) = monitor(&failing, &ledger_dir);

    assert!(matches!(
        monitor.poll().await,
        Err(Error::SourceError(SourceError::Status { status: 503, .. }))
    ));
    assert!(drain(&mut events).is_empty());
    assert_eq!(std::fs::read_to_string(&ledger_path)?, before);
    failing.assert_mocks();

    Ok(())
}

/// Expect trade legs without a group id to be neither stored nor announced
#[tokio::test]
async fn trades_without_group_are_skipped() -> Result<(), TestError> {
    let ledger_dir = tempfile::tempdir()?;
    let first = feed(history()).await?;
    monitor(&first, &ledger_dir).0.poll().await.unwrap();

    let mut grown = history();
    grown.push(factory::trade_leg_json("8", "", "Oakland Expos", "Havana Bananas", "Joey Bart"));

    let second = feed(grown).await?;
    let (monitor, mut events) = monitor(&second, &ledger_dir);

    assert_eq!(monitor.poll().await.unwrap(), 0);
    assert!(drain(&mut events).is_empty());
    assert_eq!(monitor.ledger().load_known().unwrap().row_count, 4);
    second.assert_mocks();

    Ok(())
}

/// Expect an undeliverable notification not to undo the commit
#[tokio::test]
async fn committed_rows_survive_failed_delivery() -> Result<(), TestError> {
    let ledger_dir = tempfile::tempdir()?;
    let first = feed(history()).await?;
    monitor(&first, &ledger_dir).0.poll().await.unwrap();

    let mut grown = history();
    grown.push(factory::claim_json("5", "Oakland Expos", "Luis Arraez", "FA"));

    let second = feed(grown).await?;
    let (monitor, events) = monitor(&second, &ledger_dir);
    drop(events);

    assert_eq!(monitor.poll().await.unwrap(), 0);
    assert!(monitor.ledger().load_known_ids().unwrap().contains("5"));
    second.assert_mocks();

    Ok(())
}
