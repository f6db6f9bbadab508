//! Player refresh against the spreadsheet export.

use std::time::Duration;

use mockito::Matcher;
use ulb_assistant::{
    error::{source::SourceError, Error},
    service::{
        player::{PlayerService, RefreshOutcome},
        retry::RetryContext,
    },
    source::sheets::SheetsClient,
};
use ulb_test_utils::prelude::*;

fn player_pool() -> String {
    factory::player_pool_csv(vec![
        factory::player_row("Oakland Expos", "Mookie Betts", "SS,2B")
            .mlb_team("LAD")
            .contract(2025, "$30,000,000")
            .contract(2026, "$30,000,000")
            .build(),
        factory::player_row("Havana Bananas", "Joey Gallo", "LF,1B")
            .contract(2025, "$1,500,000")
            .build(),
        factory::player_row("", "Pete Alonso", "1B")
            .contract(2025, "FREE AGENT")
            .build(),
    ])
}

fn client(test: &TestContext) -> SheetsClient {
    SheetsClient::new(&test.server_url(), TEST_SHEET_ID, TEST_PLAYER_POOL_GID)
        .unwrap()
        .with_retry(RetryContext::new(4, Duration::from_millis(1)))
}

/// Expect the snapshot to be fetched once and served to later readers
#[tokio::test]
async fn refresh_then_serve_snapshot() -> Result<(), TestError> {
    let test = TestBuilder::new()
        .with_player_pool_endpoint(&player_pool(), 1)
        .build()
        .await?;
    let service = PlayerService::new(client(&test));

    assert_eq!(service.refresh().await.unwrap(), RefreshOutcome::Published(3));

    let players = service.ensure_loaded().await.unwrap();
    assert_eq!(players.filter_by_team("oakland expos").len(), 1);
    assert_eq!(players.filter_by_position("MI").len(), 1);
    assert_eq!(players.free_agents(2025).len(), 1);
    assert_eq!(players.team_payroll("Oakland Expos", 2026), 30_000_000);
    test.assert_mocks();

    Ok(())
}

/// Expect the first read to trigger the only load
#[tokio::test]
async fn ensure_loaded_fetches_on_first_use() -> Result<(), TestError> {
    let test = TestBuilder::new()
        .with_player_pool_endpoint(&player_pool(), 1)
        .build()
        .await?;
    let service = PlayerService::new(client(&test));

    let first = service.ensure_loaded().await.unwrap();
    let second = service.ensure_loaded().await.unwrap();

    assert_eq!(first.len(), 3);
    assert_eq!(second.len(), 3);
    assert!(service.cache().last_load_time().await.is_some());
    test.assert_mocks();

    Ok(())
}

/// Expect a sheet with only title and header rows to publish nothing
#[tokio::test]
async fn header_only_sheet_is_rejected() -> Result<(), TestError> {
    let test = TestBuilder::new()
        .with_player_pool_endpoint(&factory::player_pool_csv(Vec::new()), 1)
        .build()
        .await?;
    let service = PlayerService::new(client(&test));

    assert!(service.trigger_reload().await.is_err());
    assert!(service.get_players().await.is_none());
    assert!(!service.cache().is_loading());
    test.assert_mocks();

    Ok(())
}

/// Expect a failing export to be fetched once when retries are turned off, leaving the
/// cache empty
#[tokio::test]
async fn unavailable_export_without_retry() -> Result<(), TestError> {
    let test = TestBuilder::new()
        .with_mock_endpoint(|server| {
            server
                .mock("GET", player_pool_path().as_str())
                .match_query(Matcher::Any)
                .with_status(503)
                .expect(1)
                .create()
        })
        .build()
        .await?;
    let client = SheetsClient::new(&test.server_url(), TEST_SHEET_ID, TEST_PLAYER_POOL_GID)
        .unwrap()
        .with_retry(RetryContext::no_retry());
    let service = PlayerService::new(client);

    assert!(matches!(
        service.refresh().await,
        Err(Error::SourceError(SourceError::Status { status: 503, .. }))
    ));
    assert!(service.get_players().await.is_none());
    test.assert_mocks();

    Ok(())
}
