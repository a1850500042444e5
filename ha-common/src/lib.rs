//! Shared types for HA broker administration
//!
//! This crate provides the data structures exchanged with a broker's management
//! endpoint: the HA broker state snapshot and the management request/response
//! envelope.

pub mod protocol;
pub mod state;

pub use protocol::*;
pub use state::*;

/// Default broker address used when none is configured
pub const DEFAULT_BROKER: &str = "localhost:5672";

/// Default connect and request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Client name announced when opening a management session
pub const CLIENT_NAME: &str = "ha-admin";
