use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::{
    config::{league::LeagueDirectory, Config},
    error::{command::CommandError, Error},
    model::command::{CommandName, CommandRegistry},
    service::{
        notify::ChannelNotifier,
        player::PlayerService,
        transaction::{TransactionLedger, TransactionMonitor},
        waiver::{WaiverMonitor, WaiverTracker},
    },
    source::{sheets::SheetsClient, transactions::HttpTransactionSource},
};

/// Services shared by the scheduler and the command front end.
pub struct Services {
    pub players: Arc<PlayerService<SheetsClient>>,
    pub transactions: Arc<TransactionMonitor<HttpTransactionSource, ChannelNotifier>>,
    pub waivers: Arc<WaiverMonitor<ChannelNotifier>>,
    pub directory: Arc<LeagueDirectory>,
}

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` takes precedence when set; otherwise `log_level` (from `LOG_LEVEL`) is used.
pub fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Loads the league directory, or an empty one when no path is configured.
pub fn load_league_directory(config: &Config) -> Result<LeagueDirectory, Error> {
    let Some(path) = &config.league_directory_path else {
        tracing::warn!("LEAGUE_DIRECTORY_PATH not set, only commissioners can designate players");
        return Ok(LeagueDirectory::default());
    };

    let directory = LeagueDirectory::load(path)?;
    tracing::info!(
        "Loaded league directory with {} team(s) from {}",
        directory.team_count(),
        path.display()
    );

    Ok(directory)
}

/// Builds the sources, creates the record files, and wires the services to `notifier`.
pub fn build_services(config: &Config, notifier: ChannelNotifier) -> Result<Services, Error> {
    let sheets = SheetsClient::new(
        &config.sheets_base_url,
        &config.google_sheets_id,
        &config.player_pool_gid,
    )?;
    let transactions_source =
        HttpTransactionSource::new(&config.transactions_base_url, &config.fantrax_league_id)?;

    let ledger = TransactionLedger::new(config.transactions_path());
    ledger.initialize()?;
    let tracker = WaiverTracker::new(config.waivers_path());
    tracker.initialize()?;

    tracing::info!("Record files ready in {}", config.data_dir.display());

    Ok(Services {
        players: Arc::new(PlayerService::new(sheets)),
        transactions: Arc::new(TransactionMonitor::new(
            transactions_source,
            ledger,
            notifier.clone(),
        )),
        waivers: Arc::new(WaiverMonitor::new(tracker, notifier)),
        directory: Arc::new(load_league_directory(config)?),
    })
}

/// Usage line for every command, checked to cover the whole command set.
pub fn command_help() -> Result<CommandRegistry<&'static str>, CommandError> {
    let registry = CommandRegistry::new()
        .register(CommandName::Help, "Show this help message")
        .register(CommandName::Reload, "Force reload data from the player pool sheet")
        .register(CommandName::Player, "<name> - Look up player information")
        .register(CommandName::Players, "<name1>, <name2>, ... - Look up multiple players")
        .register(CommandName::Spotrac, "<name> - Look up player contract information")
        .register(CommandName::Team, "<name> - Show team roster and payroll")
        .register(CommandName::Trade, "<players> for <players> - Analyze a trade")
        .register(CommandName::Dfa, "<name> - Designate a player for assignment")
        .register(CommandName::GetFile, "<transactions|waivers> - Download a record file");

    registry.validate()?;
    Ok(registry)
}

/// Renders the help message with the configured command prefix.
pub fn help_text(prefix: &str, help: &CommandRegistry<&'static str>) -> String {
    CommandName::ALL
        .iter()
        .filter_map(|name| help.get(*name).map(|usage| format!("{prefix}{name} {usage}")))
        .collect::<Vec<_>>()
        .join("\n")
}
