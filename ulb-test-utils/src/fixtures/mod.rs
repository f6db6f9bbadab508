//! Test fixture modules.
//!
//! - `factory` - Player pool rows and transactions feed entries
//! - `mockito` - Mock endpoints for the spreadsheet export and the transactions feed

pub mod factory;
pub mod mockito;
