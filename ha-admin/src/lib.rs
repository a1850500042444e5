//! HA broker administration
//!
//! Queries and changes the HA state of a single broker: promote a backup,
//! wait for a backup to become ready, replicate a queue, set cluster
//! settings and print the current status.

pub mod clock;
pub mod commands;
pub mod config;
pub mod dispatch;
pub mod error;
#[cfg(test)]
mod testing;
