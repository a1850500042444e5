//! Management protocol message definitions
//!
//! Requests and responses are exchanged as one JSON document per line.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Named arguments passed to a management method
pub type Arguments = serde_json::Map<String, serde_json::Value>;

/// Reference to a management object on the broker
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRef {
    /// Schema package the object's class belongs to
    pub package: String,
    /// Object class name
    pub class: String,
    /// Object name, unique within the class
    pub name: String,
}

impl ObjectRef {
    pub fn new(package: &str, class: &str, name: &str) -> Self {
        Self {
            package: package.to_string(),
            class: class.to_string(),
            name: name.to_string(),
        }
    }

    /// The broker's HA management object
    pub fn ha_broker() -> Self {
        Self::new(HA_PACKAGE, HA_CLASS, HA_OBJECT_NAME)
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.package, self.class, self.name)
    }
}

/// Package of the HA broker management class
pub const HA_PACKAGE: &str = "org.apache.qpid.ha";
/// Class of the HA broker management object
pub const HA_CLASS: &str = "habroker";
/// Name of the single HA broker object
pub const HA_OBJECT_NAME: &str = "ha-broker";

/// Remote methods exposed by the HA broker object
pub mod methods {
    pub const PROMOTE: &str = "promote";
    pub const REPLICATE: &str = "replicate";
    pub const SET_BROKERS: &str = "setBrokers";
    pub const SET_PUBLIC_BROKERS: &str = "setPublicBrokers";
    pub const SET_EXPECTED_BACKUPS: &str = "setExpectedBackups";
}

/// Request sent to a broker's management endpoint
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ManagementRequest {
    /// Open a management session
    Open {
        client: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sasl_mechanism: Option<String>,
    },
    /// Read the attributes of an object
    GetObject { object: ObjectRef },
    /// Invoke a method on an object
    Invoke {
        object: ObjectRef,
        method: String,
        #[serde(default)]
        args: Arguments,
    },
    /// End the session
    Close,
}

/// Response from a broker's management endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct ManagementResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

impl ManagementResponse {
    pub fn ok(data: Option<serde_json::Value>) -> Self {
        Self {
            success: true,
            message: "OK".to_string(),
            data,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
        }
    }
}
