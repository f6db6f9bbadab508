//! Domain types shared by the sources, the services and the notification sink.

pub mod command;
pub mod event;
pub mod player;
pub mod transaction;
pub mod waiver;
