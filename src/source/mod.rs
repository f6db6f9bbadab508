//! External data sources.
//!
//! Each source is a trait so the services can be driven by the HTTP clients in
//! production and by in-memory fakes in tests.

pub mod sheets;
pub mod transactions;

use std::future::Future;

use crate::{
    error::Error,
    model::{player::PlayerRecord, transaction::Transaction},
};

/// Provides the full player pool.
pub trait PlayerSource: Send + Sync {
    /// Fetches and parses every player; rows that cannot be parsed are left out.
    fn fetch_players(&self) -> impl Future<Output = Result<Vec<PlayerRecord>, Error>> + Send;
}

/// Provides the league's full transaction history.
pub trait TransactionSource: Send + Sync {
    fn fetch_transactions(&self) -> impl Future<Output = Result<Vec<Transaction>, Error>> + Send;
}
