//! Waiver clock.
//!
//! A designation for assignment puts a player on waivers for eight days. Claims are kept
//! in the waiver store; each poll finds the claims whose period ran out, notifies the user
//! who started them, and marks them processed once the notification went through.

use std::{path::PathBuf, sync::Arc};

use chrono::{DateTime, Utc};

use crate::{
    config::league::LeagueDirectory,
    data::record::{run_blocking, RecordStore},
    error::{storage::StorageError, waiver::WaiverError, Error},
    model::{event::NotificationEvent, player::PlayerList, waiver::WaiverClaim},
    service::notify::NotificationSink,
};

/// Who asked for a designation, and where.
#[derive(Debug, Clone)]
pub struct DesignationRequest {
    /// Player name or part of it.
    pub query: String,
    /// Chat username, used for the ownership check.
    pub username: String,
    /// Chat user id, stored on the claim for the expiry mention.
    pub user_id: String,
    pub message_id: String,
    pub channel_id: String,
}

/// Claims whose waiver period ran out before `now`, skipping processed ones.
pub fn expired_claims(claims: &[WaiverClaim], now: DateTime<Utc>) -> Vec<WaiverClaim> {
    claims
        .iter()
        .filter(|claim| !claim.processed && claim.is_expired(now))
        .cloned()
        .collect()
}

/// Clones share the same store and its lock.
#[derive(Clone)]
pub struct WaiverTracker {
    store: Arc<RecordStore<WaiverClaim>>,
}

impl WaiverTracker {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            store: Arc::new(RecordStore::new(path)),
        }
    }

    pub fn initialize(&self) -> Result<(), StorageError> {
        self.store.initialize()
    }

    pub fn add(&self, claim: &WaiverClaim) -> Result<(), StorageError> {
        self.store.append(std::slice::from_ref(claim))?;
        tracing::info!(
            "Started waiver period for {} ({}) until {}",
            claim.player_name,
            claim.team_name,
            claim.end_time
        );
        Ok(())
    }

    pub fn all_claims(&self) -> Result<Vec<WaiverClaim>, StorageError> {
        self.store.scan_all()
    }

    /// Claims that have not been processed yet.
    pub fn active_claims(&self) -> Result<Vec<WaiverClaim>, StorageError> {
        let mut claims = self.store.scan_all()?;
        claims.retain(|claim| !claim.processed);
        Ok(claims)
    }

    /// Active claims whose period ended strictly before `now`.
    pub fn check_expired(&self, now: DateTime<Utc>) -> Result<Vec<WaiverClaim>, StorageError> {
        Ok(expired_claims(&self.store.scan_all()?, now))
    }

    /// Flags every claim started by `message_id` as processed.
    ///
    /// # Returns
    /// - `Ok(usize)` - Number of claims flipped (claims already processed count too)
    /// - `Err(WaiverError::ClaimNotFound)` - No claim carries this message id
    /// - `Err(StorageError)` - The store could not be rewritten
    pub fn mark_processed(&self, message_id: &str) -> Result<usize, Error> {
        let matched = self.store.rewrite_with(|claims| {
            let mut matched = 0;
            for claim in claims.iter_mut().filter(|c| c.message_id == message_id) {
                claim.processed = true;
                matched += 1;
            }
            matched
        })?;

        if matched == 0 {
            return Err(WaiverError::ClaimNotFound(message_id.to_string()).into());
        }

        Ok(matched)
    }

    /// Starts a waiver period for the first matching player the requester may designate.
    ///
    /// Players are matched by name substring. Commissioners may designate any match;
    /// everyone else only players on a team they own.
    ///
    /// # Returns
    /// - `Ok(WaiverClaim)` - Claim that was stored
    /// - `Err(WaiverError::PlayerNotFound)` - No player matches the query
    /// - `Err(WaiverError::NotOwned)` - Matches exist but none on the requester's teams
    /// - `Err(StorageError)` - The claim could not be stored
    pub fn designate(
        &self,
        players: &PlayerList,
        directory: &LeagueDirectory,
        request: &DesignationRequest,
        now: DateTime<Utc>,
    ) -> Result<WaiverClaim, Error> {
        let matches = players.search_by_name(&request.query);
        if matches.is_empty() {
            return Err(WaiverError::PlayerNotFound(request.query.clone()).into());
        }

        let player = if directory.is_commissioner(&request.username) {
            matches.first().copied()
        } else {
            let teams = directory.teams_for_owner(&request.username);
            matches.iter().copied().find(|player| {
                teams
                    .iter()
                    .any(|team| team.eq_ignore_ascii_case(player.team.trim()))
            })
        };

        let Some(player) = player else {
            return Err(WaiverError::NotOwned {
                query: request.query.clone(),
                username: request.username.clone(),
                matches: matches.len(),
            }
            .into());
        };

        let claim = WaiverClaim::new(
            &player.name,
            player.team.trim(),
            &request.user_id,
            &request.message_id,
            &request.channel_id,
            now,
        );
        self.add(&claim)?;

        Ok(claim)
    }
}

/// Announces expired waiver periods.
pub struct WaiverMonitor<N> {
    tracker: WaiverTracker,
    notifier: N,
}

impl<N: NotificationSink> WaiverMonitor<N> {
    pub fn new(tracker: WaiverTracker, notifier: N) -> Self {
        Self { tracker, notifier }
    }

    pub fn tracker(&self) -> &WaiverTracker {
        &self.tracker
    }

    /// Runs one poll cycle at `now`.
    ///
    /// A claim is marked processed only after its notification is delivered. Claims whose
    /// delivery fails stay active and are picked up again on the next poll.
    ///
    /// # Returns
    /// - `Ok(usize)` - Number of claims notified and marked processed
    /// - `Err(Error)` - The store could not be read
    pub async fn poll(&self, now: DateTime<Utc>) -> Result<usize, Error> {
        let tracker = self.tracker.clone();
        let expired = run_blocking(move || tracker.check_expired(now)).await?;
        if expired.is_empty() {
            return Ok(0);
        }

        let mut processed = 0;
        for claim in expired {
            let message_id = claim.message_id.clone();
            let player_name = claim.player_name.clone();

            if let Err(e) = self
                .notifier
                .deliver(NotificationEvent::WaiverExpired(claim))
                .await
            {
                tracing::error!(
                    "Failed to deliver waiver expiry for {} (message {}): {}",
                    player_name,
                    message_id,
                    e
                );
                continue;
            }

            let tracker = self.tracker.clone();
            let marked = {
                let message_id = message_id.clone();
                run_blocking(move || tracker.mark_processed(&message_id)).await
            };

            match marked {
                Ok(_) => processed += 1,
                Err(e) => tracing::error!(
                    "Notified waiver expiry for {} but could not mark message {} processed: {}",
                    player_name,
                    message_id,
                    e
                ),
            }
        }

        tracing::info!("Processed {} expired waiver claim(s)", processed);

        Ok(processed)
    }
}
