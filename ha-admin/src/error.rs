//! Error types shared by every command

use ha_common::HaStatus;
use std::time::Duration;

/// Broad category of an [`AdminError`], used to decide how a failure is reported
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad command line; nothing was sent to the broker
    Usage,
    /// The broker does not expose the HA management object
    Capability,
    /// The broker is in a status the command cannot work with
    State,
    /// Connection, protocol or remote method failure
    Transport,
    /// Local configuration problem
    Config,
}

#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    #[error("{message}")]
    Usage {
        message: String,
        /// Usage text to show alongside the message
        usage: Option<String>,
    },

    #[error("HA module is not loaded on broker at {broker}")]
    CapabilityMissing { broker: String },

    #[error("Broker is not a backup, status is '{status}'")]
    UnexpectedState { status: HaStatus },

    #[error("failed to connect to broker at {broker}: {source}")]
    Connect {
        broker: String,
        #[source]
        source: std::io::Error,
    },

    #[error("timed out after {0:?} waiting for broker")]
    Timeout(Duration),

    #[error("connection closed by broker")]
    Closed,

    #[error("{method} failed: {message}")]
    Remote { method: String, message: String },

    #[error("invalid response from broker: {0}")]
    Decode(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("command '{0}' is already registered")]
    DuplicateCommand(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl AdminError {
    pub fn usage(message: impl Into<String>, usage: Option<String>) -> Self {
        AdminError::Usage {
            message: message.into(),
            usage,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AdminError::Usage { .. } => ErrorKind::Usage,
            AdminError::CapabilityMissing { .. } => ErrorKind::Capability,
            AdminError::UnexpectedState { .. } => ErrorKind::State,
            AdminError::Connect { .. }
            | AdminError::Timeout(_)
            | AdminError::Closed
            | AdminError::Remote { .. }
            | AdminError::Decode(_)
            | AdminError::Io(_) => ErrorKind::Transport,
            AdminError::DuplicateCommand(_) | AdminError::Config(_) => ErrorKind::Config,
        }
    }
}

pub type Result<T, E = AdminError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(AdminError::usage("x", None).kind(), ErrorKind::Usage);
        assert_eq!(AdminError::Closed.kind(), ErrorKind::Transport);
        assert_eq!(
            AdminError::UnexpectedState {
                status: HaStatus::Primary
            }
            .kind(),
            ErrorKind::State
        );
        assert_eq!(
            AdminError::DuplicateCommand("query".into()).kind(),
            ErrorKind::Config
        );
    }

    #[test]
    fn test_messages() {
        let err = AdminError::UnexpectedState {
            status: HaStatus::Primary,
        };
        assert_eq!(err.to_string(), "Broker is not a backup, status is 'primary'");

        let err = AdminError::CapabilityMissing {
            broker: "localhost:5672".into(),
        };
        assert_eq!(
            err.to_string(),
            "HA module is not loaded on broker at localhost:5672"
        );
    }
}
