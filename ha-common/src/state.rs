//! HA broker state definitions

use serde::{Deserialize, Serialize};
use std::fmt;

/// HA status reported by a broker.
///
/// Statuses this crate does not know about are kept verbatim in [`HaStatus::Other`]
/// so newer brokers can still be displayed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum HaStatus {
    /// Serving clients
    Primary,
    /// Fully caught up and eligible for promotion
    Backup,
    /// Backup that is still replicating from the primary
    CatchUp,
    /// Newly promoted primary waiting for backups to reconnect
    Recovering,
    /// Broker has not yet contacted the cluster
    Joining,
    /// Any status not listed above
    Other(String),
}

impl HaStatus {
    pub fn as_str(&self) -> &str {
        match self {
            HaStatus::Primary => "primary",
            HaStatus::Backup => "backup",
            HaStatus::CatchUp => "catch-up",
            HaStatus::Recovering => "recovering",
            HaStatus::Joining => "joining",
            HaStatus::Other(s) => s,
        }
    }
}

impl From<String> for HaStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "primary" => HaStatus::Primary,
            "backup" => HaStatus::Backup,
            "catch-up" => HaStatus::CatchUp,
            "recovering" => HaStatus::Recovering,
            "joining" => HaStatus::Joining,
            _ => HaStatus::Other(s),
        }
    }
}

impl From<&str> for HaStatus {
    fn from(s: &str) -> Self {
        HaStatus::from(s.to_string())
    }
}

impl From<HaStatus> for String {
    fn from(status: HaStatus) -> Self {
        match status {
            HaStatus::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for HaStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of the attributes of a broker's HA management object.
///
/// Every fetch produces a new snapshot; nothing is cached between fetches.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HaBrokerState {
    /// Current HA status
    pub status: HaStatus,
    /// URL HA brokers use to connect to each other
    #[serde(default)]
    pub brokers: String,
    /// URL clients use to connect to the cluster
    #[serde(default)]
    pub public_brokers: String,
    /// Number of backups the primary expects
    #[serde(default)]
    pub expected_backups: u32,
}

impl HaBrokerState {
    /// Decode a snapshot from a management object's attribute map
    pub fn from_attributes(attributes: serde_json::Value) -> serde_json::Result<Self> {
        serde_json::from_value(attributes)
    }
}
