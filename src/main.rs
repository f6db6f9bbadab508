use std::time::Duration;

use ulb_assistant::{
    config::Config,
    model::event::NotificationEvent,
    scheduler::{Scheduler, SchedulerConfig},
    service::notify::ChannelNotifier,
    startup,
};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    startup::init_tracing(&config.log_level);

    let (notifier, mut events) = ChannelNotifier::new();
    let services = match startup::build_services(&config, notifier) {
        Ok(services) => services,
        Err(e) => {
            tracing::error!("Startup failed: {}", e);
            std::process::exit(1);
        }
    };

    match startup::command_help() {
        Ok(help) => tracing::debug!("Commands:\n{}", startup::help_text(&config.command_prefix, &help)),
        Err(e) => {
            tracing::error!("Startup failed: {}", e);
            std::process::exit(1);
        }
    }

    let scheduler = Scheduler::new(SchedulerConfig::from_config(&config));
    scheduler
        .start_monitors(
            services.players.clone(),
            services.transactions.clone(),
            services.waivers.clone(),
        )
        .await;

    let sink = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            log_event(&event);
        }
    });

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }

    scheduler.stop().await;
    drop(services);
    if tokio::time::timeout(Duration::from_secs(5), sink).await.is_err() {
        tracing::warn!("Notification sink did not drain within timeout");
    }

    tracing::info!("League assistant stopped");
}

fn log_event(event: &NotificationEvent) {
    match event {
        NotificationEvent::NewTransaction { transaction, route } => tracing::info!(
            "[{}] {} {} {} ({})",
            route.channel_name(),
            transaction.team_name,
            transaction.kind,
            transaction.player_name,
            transaction.player_position
        ),
        NotificationEvent::NewTrade(group) => {
            for (team, legs) in group.legs_by_sending_team() {
                let players: Vec<&str> = legs.iter().map(|leg| leg.player_name.as_str()).collect();
                tracing::info!(
                    "[trades] {} sends {} (trade {})",
                    team,
                    players.join(", "),
                    group.group_id
                );
            }
        }
        NotificationEvent::WaiverExpired(claim) => tracing::info!(
            "[dfa-waivers] <@{}> waivers for {} ({}) expired at {}",
            claim.user_id,
            claim.player_name,
            claim.team_name,
            claim.end_time
        ),
    }
}
