//! Core of the ULB league assistant.
//!
//! Keeps the league's player pool cached from the master spreadsheet, watches the
//! fantasy platform's transaction feed for new signings, claims, drops and trades, and
//! runs the eight day waiver clock started by designations for assignment. Results leave
//! the crate as structured notification events; chat rendering lives elsewhere.

pub mod config;
pub mod data;
pub mod error;
pub mod model;
pub mod scheduler;
pub mod service;
pub mod source;
pub mod startup;
