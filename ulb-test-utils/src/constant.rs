pub const TEST_SHEET_ID: &str = "test-sheet";
pub const TEST_PLAYER_POOL_GID: &str = "286507798";
pub const TEST_LEAGUE_ID: &str = "test-league";
/// Processed date given to factory transactions unless overridden.
pub const TEST_PROCESSED_DATE: &str = "2025-04-01T12:00:00Z";
