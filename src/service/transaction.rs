//! Transaction ledger and change detection.
//!
//! The ledger is the durable set of transactions already announced. Each poll fetches the
//! league's full history, diffs it against the ledger, commits the new rows in one append,
//! and only then hands the events to the notification sink. A crash between commit and
//! delivery loses those notifications; it never repeats them.

use std::{collections::HashSet, path::PathBuf, sync::Arc};

use crate::{
    data::record::{run_blocking, RecordStore},
    error::{storage::StorageError, Error},
    model::{
        event::NotificationEvent,
        transaction::{TradeGroup, Transaction},
    },
    service::notify::NotificationSink,
    source::TransactionSource,
};

/// What the ledger already knows.
#[derive(Debug, Default)]
pub struct KnownTransactions {
    /// Ids of non-trade rows.
    pub ids: HashSet<String>,
    /// Non-empty trade group ids.
    pub trade_groups: HashSet<String>,
    /// Every readable row, trades included.
    pub row_count: usize,
}

/// New work found by comparing a fetch with the ledger.
#[derive(Debug, Default, PartialEq)]
pub struct Delta {
    /// Non-trade transactions not in the ledger, in fetch order.
    pub individual: Vec<Transaction>,
    /// Trades whose group id is not in the ledger, legs in fetch order.
    pub trade_groups: Vec<TradeGroup>,
    /// Trade legs without a group id. Never committed or announced.
    pub unidentified_trades: Vec<Transaction>,
}

impl Delta {
    /// True when there is nothing to commit or announce.
    pub fn is_empty(&self) -> bool {
        self.individual.is_empty() && self.trade_groups.is_empty()
    }

    /// Rows to append to the ledger: individual transactions, then every trade leg.
    pub fn rows(&self) -> Vec<Transaction> {
        self.individual
            .iter()
            .chain(self.trade_groups.iter().flat_map(|group| group.legs.iter()))
            .cloned()
            .collect()
    }

    /// One event per individual transaction and one per trade group.
    pub fn into_events(self) -> Vec<NotificationEvent> {
        self.individual
            .into_iter()
            .map(NotificationEvent::new_transaction)
            .chain(self.trade_groups.into_iter().map(NotificationEvent::NewTrade))
            .collect()
    }
}

/// Splits a fetch into what the ledger has not seen yet.
///
/// Individual transactions are new when their id is unknown; trades are new per group,
/// when the group id is unknown. Duplicates within `fetched` are collapsed to their first
/// occurrence.
///
/// # Arguments
/// - `fetched` - Full transaction history as returned by the source
/// - `known_ids` - Ids of non-trade transactions already in the ledger
/// - `known_groups` - Trade group ids already in the ledger
pub fn compute_delta(
    fetched: &[Transaction],
    known_ids: &HashSet<String>,
    known_groups: &HashSet<String>,
) -> Delta {
    let mut delta = Delta::default();
    let mut seen_ids: HashSet<&str> = HashSet::new();

    for transaction in fetched {
        if !transaction.is_trade() {
            if !known_ids.contains(&transaction.id) && seen_ids.insert(transaction.id.as_str()) {
                delta.individual.push(transaction.clone());
            }
            continue;
        }

        let Some(group_id) = transaction.trade_group() else {
            delta.unidentified_trades.push(transaction.clone());
            continue;
        };
        if known_groups.contains(group_id) {
            continue;
        }

        match delta
            .trade_groups
            .iter_mut()
            .find(|group| group.group_id == group_id)
        {
            Some(group) => {
                if !group.legs.iter().any(|leg| leg.id == transaction.id) {
                    group.legs.push(transaction.clone());
                }
            }
            None => delta.trade_groups.push(TradeGroup {
                group_id: group_id.to_string(),
                legs: vec![transaction.clone()],
            }),
        }
    }

    delta
}

/// Durable record of every transaction already announced.
///
/// Clones share the same store and its lock.
#[derive(Clone)]
pub struct TransactionLedger {
    store: Arc<RecordStore<Transaction>>,
}

impl TransactionLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            store: Arc::new(RecordStore::new(path)),
        }
    }

    pub fn initialize(&self) -> Result<(), StorageError> {
        self.store.initialize()
    }

    /// Reads the ledger once and collects the known ids and trade groups.
    pub fn load_known(&self) -> Result<KnownTransactions, StorageError> {
        let rows = self.store.scan_all()?;
        let mut known = KnownTransactions {
            row_count: rows.len(),
            ..Default::default()
        };

        for row in rows {
            if row.is_trade() {
                if let Some(group_id) = row.trade_group() {
                    known.trade_groups.insert(group_id.to_string());
                }
            } else {
                known.ids.insert(row.id);
            }
        }

        Ok(known)
    }

    pub fn load_known_ids(&self) -> Result<HashSet<String>, StorageError> {
        Ok(self.load_known()?.ids)
    }

    pub fn load_known_trade_groups(&self) -> Result<HashSet<String>, StorageError> {
        Ok(self.load_known()?.trade_groups)
    }

    pub fn is_empty(&self) -> Result<bool, StorageError> {
        Ok(self.load_known()?.row_count == 0)
    }

    /// Appends every row of the delta in a single write. Returns the number of rows.
    pub fn commit(&self, delta: &Delta) -> Result<usize, StorageError> {
        let rows = delta.rows();
        self.store.append(&rows)?;
        Ok(rows.len())
    }

    /// Seeds an empty ledger with a full fetch so existing history is never announced.
    ///
    /// Duplicates and trade legs without a group id are left out, as in a regular commit.
    pub fn bootstrap(&self, fetched: &[Transaction]) -> Result<usize, StorageError> {
        let delta = compute_delta(fetched, &HashSet::new(), &HashSet::new());
        self.commit(&delta)
    }
}

/// Polls the transactions source and announces what is new.
pub struct TransactionMonitor<S, N> {
    source: S,
    ledger: TransactionLedger,
    notifier: N,
}

impl<S: TransactionSource, N: NotificationSink> TransactionMonitor<S, N> {
    pub fn new(source: S, ledger: TransactionLedger, notifier: N) -> Self {
        Self {
            source,
            ledger,
            notifier,
        }
    }

    pub fn ledger(&self) -> &TransactionLedger {
        &self.ledger
    }

    /// Runs one poll cycle.
    ///
    /// On an empty ledger the fetched history is stored without announcing anything.
    /// Otherwise new rows are committed first and announced afterwards; a failed delivery
    /// is logged and not retried.
    ///
    /// # Returns
    /// - `Ok(usize)` - Number of notifications delivered
    /// - `Err(Error)` - Fetch or ledger failure; the ledger is unchanged
    pub async fn poll(&self) -> Result<usize, Error> {
        let ledger = self.ledger.clone();
        let known = run_blocking(move || ledger.load_known()).await?;
        let fetched = self.source.fetch_transactions().await?;

        if known.row_count == 0 {
            let ledger = self.ledger.clone();
            let stored = run_blocking(move || ledger.bootstrap(&fetched)).await?;
            tracing::info!(
                "Initialized transaction ledger with {} existing transaction(s)",
                stored
            );
            return Ok(0);
        }

        let delta = compute_delta(&fetched, &known.ids, &known.trade_groups);
        for leg in &delta.unidentified_trades {
            tracing::warn!(
                "Trade transaction {} ({}) has no trade group id, skipping",
                leg.id,
                leg.player_name
            );
        }

        if delta.is_empty() {
            tracing::debug!("No new transactions in {} fetched", fetched.len());
            return Ok(0);
        }

        let ledger = self.ledger.clone();
        let (committed, delta) =
            run_blocking(move || ledger.commit(&delta).map(|committed| (committed, delta))).await?;
        tracing::info!(
            "Committed {} new transaction row(s) ({} individual, {} trade(s))",
            committed,
            delta.individual.len(),
            delta.trade_groups.len()
        );

        let mut delivered = 0;
        for event in delta.into_events() {
            let kind = event.kind();
            match self.notifier.deliver(event).await {
                Ok(()) => delivered += 1,
                Err(e) => tracing::error!("Failed to deliver {} notification: {}", kind, e),
            }
        }

        Ok(delivered)
    }
}
