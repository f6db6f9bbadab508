//! Scheduler for the periodic refresh and poll loops.
//!
//! Each job runs in its own tokio task on a fixed interval. The first run happens as soon
//! as the job is scheduled, and ticks missed while a run is still going are skipped rather
//! than queued. All loops share one shutdown signal that is checked between runs; a run
//! that is already in progress is allowed to finish.

use std::{future::Future, sync::Arc, time::Duration};

use chrono::Utc;
use tokio::{
    sync::{watch, RwLock},
    task::JoinHandle,
    time::MissedTickBehavior,
};

use crate::{
    error::Error,
    service::{
        notify::NotificationSink,
        player::{PlayerService, RefreshOutcome},
        transaction::TransactionMonitor,
        waiver::WaiverMonitor,
    },
    source::{PlayerSource, TransactionSource},
};

pub mod config;

#[cfg(test)]
mod tests;

pub use self::config::SchedulerConfig;

/// Runs named jobs on fixed intervals until stopped.
pub struct Scheduler {
    config: SchedulerConfig,
    shutdown: watch::Sender<bool>,
    handles: RwLock<Vec<(String, JoinHandle<()>)>>,
}

impl Scheduler {
    /// Creates a new instance of [`Scheduler`] with no jobs.
    pub fn new(config: SchedulerConfig) -> Self {
        let (shutdown, _) = watch::channel(false);

        Self {
            config,
            shutdown,
            handles: RwLock::new(Vec::new()),
        }
    }

    /// Schedules the player refresh, transaction poll, and waiver poll loops.
    ///
    /// # Arguments
    /// - `players` - Player service refreshed every `player_refresh_interval`
    /// - `transactions` - Transaction monitor polled every `transaction_poll_interval`
    /// - `waivers` - Waiver monitor polled every `waiver_poll_interval`
    pub async fn start_monitors<P, T, N>(
        &self,
        players: Arc<PlayerService<P>>,
        transactions: Arc<TransactionMonitor<T, N>>,
        waivers: Arc<WaiverMonitor<N>>,
    ) where
        P: PlayerSource + 'static,
        T: TransactionSource + 'static,
        N: NotificationSink + 'static,
    {
        self.schedule_job(
            "player refresh",
            self.config.player_refresh_interval,
            move || {
                let players = Arc::clone(&players);
                async move {
                    let count = match players.refresh().await? {
                        RefreshOutcome::Published(count) => count,
                        RefreshOutcome::AlreadyLoading => 0,
                    };
                    Ok::<_, Error>(count)
                }
            },
        )
        .await;

        self.schedule_job(
            "transaction poll",
            self.config.transaction_poll_interval,
            move || {
                let transactions = Arc::clone(&transactions);
                async move { transactions.poll().await }
            },
        )
        .await;

        self.schedule_job(
            "waiver poll",
            self.config.waiver_poll_interval,
            move || {
                let waivers = Arc::clone(&waivers);
                async move { waivers.poll(Utc::now()).await }
            },
        )
        .await;

        tracing::info!("Started {} background job(s)", self.job_count().await);
    }

    /// Spawns a loop that runs `function` every `interval`.
    ///
    /// On each run the loop logs the number of updates the function reports, or the error
    /// it returned. An error never ends the loop; the next tick simply runs again.
    ///
    /// # Arguments
    /// - `name` - Human-readable name for the job (used in log messages)
    /// - `interval` - Time between the starts of two runs
    /// - `function` - Async function performing one run, returning the count of updates
    pub async fn schedule_job<F, Fut>(&self, name: &str, interval: Duration, function: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<usize, Error>> + Send + 'static,
    {
        let mut shutdown = self.shutdown.subscribe();
        let job_name = name.to_string();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            tracing::debug!("Job {} started, running every {:?}", job_name, interval);

            loop {
                if *shutdown.borrow_and_update() {
                    break;
                }

                tokio::select! {
                    biased;

                    changed = shutdown.changed() => {
                        // Sender dropped or stop requested
                        if changed.is_err() || *shutdown.borrow() {
                            break;
                        }
                    }

                    _ = ticker.tick() => {
                        match function().await {
                            Ok(count) => tracing::info!("Completed {}: {} update(s)", job_name, count),
                            Err(e) => tracing::error!("Error running {}: {}", job_name, e),
                        }
                    }
                }
            }

            tracing::debug!("Job {} stopped", job_name);
        });

        self.handles.write().await.push((name.to_string(), handle));
    }

    /// Stops every loop and waits for each to exit.
    ///
    /// A run in progress finishes before its loop exits. Loops that take longer than the
    /// configured shutdown timeout are logged and left behind. Calling this when already
    /// stopped returns immediately.
    pub async fn stop(&self) {
        if !self.is_running().await {
            tracing::debug!("Scheduler is already stopped");
            return;
        }

        tracing::info!("Shutting down scheduler...");

        self.shutdown.send_replace(true);

        let mut handles = self.handles.write().await;
        let job_count = handles.len();

        for (name, handle) in handles.drain(..) {
            match tokio::time::timeout(self.config.shutdown_timeout, handle).await {
                Ok(Ok(())) => tracing::debug!("Job {} stopped cleanly", name),
                Ok(Err(e)) => tracing::error!("Job {} panicked: {:?}", name, e),
                Err(_) => tracing::warn!("Job {} did not stop within timeout", name),
            }
        }

        tracing::info!("Scheduler shut down ({} job(s) stopped)", job_count);
    }

    /// True while any scheduled loop has not been stopped.
    pub async fn is_running(&self) -> bool {
        !self.handles.read().await.is_empty()
    }

    pub async fn job_count(&self) -> usize {
        self.handles.read().await.len()
    }
}
