//! Service layer for the assistant's background work.
//!
//! Each service owns one concern: the player cache and its refresh, the transaction
//! ledger and change detection, and the waiver clock. Notifications leave the crate
//! through a [`notify::NotificationSink`]; retries of flaky fetches go through
//! [`retry::RetryContext`].

pub mod notify;
pub mod player;
pub mod retry;
pub mod transaction;
pub mod waiver;
