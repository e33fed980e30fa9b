// ── Identity types ──
//
// Stable keys tying bridge devices to registry entries, and the addressing
// triple used to command a specific button or LED.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Namespaced registry identifier, e.g. `lutron_caseta` / `1234_10`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DeviceIdentifier {
    pub domain: String,
    pub id: String,
}

impl DeviceIdentifier {
    pub fn new(domain: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            id: id.into(),
        }
    }
}

impl fmt::Display for DeviceIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.domain, self.id)
    }
}

/// Platform device identity of a keypad: bridge serial plus device id.
///
/// Derived only from values that survive a reconnect, never from
/// session-scoped handles.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceIdentity {
    pub bridge_serial: String,
    pub device_id: String,
}

impl DeviceIdentity {
    pub fn new(bridge_serial: impl Into<String>, device_id: impl Into<String>) -> Self {
        Self {
            bridge_serial: bridge_serial.into(),
            device_id: device_id.into(),
        }
    }

    /// `"{bridge_serial}_{device_id}"`.
    pub fn key(&self) -> String {
        format!("{}_{}", self.bridge_serial, self.device_id)
    }

    pub fn to_identifier(&self, domain: &str) -> DeviceIdentifier {
        DeviceIdentifier::new(domain, self.key())
    }
}

impl fmt::Display for DeviceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.bridge_serial, self.device_id)
    }
}

/// Addressing triple for commands to a keypad button or LED.
///
/// Captured once when the entity is built and never recomputed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceTreeRef {
    pub keypad_device_id: String,
    pub button_group_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub button_device_id: Option<String>,
}
