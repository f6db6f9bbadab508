//! Player data cache and refresh.
//!
//! The whole player pool is fetched, validated, and then swapped in as one immutable
//! snapshot. Readers clone an `Arc` to the current snapshot and never observe a partially
//! built list. At most one refresh runs at a time; a second caller is told a load is
//! already in progress instead of waiting.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{OwnedSemaphorePermit, RwLock, Semaphore};

use crate::{
    error::{data::DataError, Error},
    model::player::PlayerList,
    source::PlayerSource,
};

struct Snapshot {
    players: Arc<PlayerList>,
    loaded_at: DateTime<Utc>,
}

/// In-memory holder of the latest player snapshot.
pub struct PlayerCache {
    snapshot: RwLock<Option<Snapshot>>,
    /// Single permit; held for the duration of a load.
    loading: Arc<Semaphore>,
}

/// Proof that the holder is the only running load. Dropping it ends the load.
pub struct LoadGuard {
    _permit: OwnedSemaphorePermit,
}

impl Default for PlayerCache {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayerCache {
    pub fn new() -> Self {
        Self {
            snapshot: RwLock::new(None),
            loading: Arc::new(Semaphore::new(1)),
        }
    }

    /// Claims the loading permit without waiting.
    ///
    /// # Returns
    /// - `Some(LoadGuard)` - Caller may load; the permit is released when the guard drops
    /// - `None` - Another load is in progress
    pub fn begin_load(&self) -> Option<LoadGuard> {
        Arc::clone(&self.loading)
            .try_acquire_owned()
            .ok()
            .map(|permit| LoadGuard { _permit: permit })
    }

    pub fn is_loading(&self) -> bool {
        self.loading.available_permits() == 0
    }

    /// Waits until no load is running.
    async fn wait_for_load(&self) {
        // The semaphore is never closed.
        let _ = self.loading.acquire().await;
    }

    /// Replaces the snapshot and records the load time. Returns the number of players.
    pub async fn publish(&self, players: PlayerList) -> usize {
        let count = players.len();
        let mut snapshot = self.snapshot.write().await;
        *snapshot = Some(Snapshot {
            players: Arc::new(players),
            loaded_at: Utc::now(),
        });
        count
    }

    /// Current snapshot, or `None` if nothing has been published yet.
    pub async fn read(&self) -> Option<Arc<PlayerList>> {
        self.snapshot
            .read()
            .await
            .as_ref()
            .map(|snapshot| Arc::clone(&snapshot.players))
    }

    pub async fn last_load_time(&self) -> Option<DateTime<Utc>> {
        self.snapshot
            .read()
            .await
            .as_ref()
            .map(|snapshot| snapshot.loaded_at)
    }
}

/// Result of a refresh request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A new snapshot with this many players was published.
    Published(usize),
    /// Another refresh held the loading permit; nothing was done.
    AlreadyLoading,
}

/// Refreshes the player cache from a [`PlayerSource`] and serves reads from it.
pub struct PlayerService<S> {
    source: S,
    cache: PlayerCache,
}

impl<S: PlayerSource> PlayerService<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            cache: PlayerCache::new(),
        }
    }

    pub fn cache(&self) -> &PlayerCache {
        &self.cache
    }

    /// Fetches the full player pool and publishes it.
    ///
    /// The previous snapshot stays in place unless the fetch succeeds with at least one
    /// player.
    ///
    /// # Returns
    /// - `Ok(RefreshOutcome::Published)` - New snapshot published
    /// - `Ok(RefreshOutcome::AlreadyLoading)` - Another refresh is running
    /// - `Err(Error)` - Fetch failed or returned no players
    pub async fn refresh(&self) -> Result<RefreshOutcome, Error> {
        let Some(_guard) = self.cache.begin_load() else {
            tracing::debug!("Player refresh skipped, a load is already in progress");
            return Ok(RefreshOutcome::AlreadyLoading);
        };

        let players = self.source.fetch_players().await?;
        if players.is_empty() {
            return Err(DataError::EmptyPlayerPool.into());
        }

        let count = self.cache.publish(PlayerList::from(players)).await;
        tracing::info!("Published player snapshot with {} player(s)", count);

        Ok(RefreshOutcome::Published(count))
    }

    /// Current snapshot, if any has been published.
    pub async fn get_players(&self) -> Option<Arc<PlayerList>> {
        self.cache.read().await
    }

    /// Refresh requested from outside the schedule, e.g. the `reload` command.
    pub async fn trigger_reload(&self) -> Result<RefreshOutcome, Error> {
        tracing::info!("Player reload requested");
        self.refresh().await
    }

    /// Returns the current snapshot, loading it first when nothing is cached.
    ///
    /// If a load is already running, waits for it to finish rather than starting another.
    ///
    /// # Returns
    /// - `Ok(Arc<PlayerList>)` - Snapshot to read from
    /// - `Err(Error)` - Nothing cached and the load failed
    pub async fn ensure_loaded(&self) -> Result<Arc<PlayerList>, Error> {
        if let Some(players) = self.get_players().await {
            return Ok(players);
        }

        if self.refresh().await? == RefreshOutcome::AlreadyLoading {
            self.cache.wait_for_load().await;
        }

        self.get_players()
            .await
            .ok_or_else(|| DataError::PlayersUnavailable.into())
    }
}
