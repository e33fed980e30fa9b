// ── Device registry types ──

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::identity::DeviceIdentifier;

/// Request to register (or refresh) a logical device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRegistration {
    pub config_entry_id: String,
    pub name: String,
    pub manufacturer: String,
    pub identifiers: BTreeSet<DeviceIdentifier>,
    pub model: Option<String>,
    pub via_device: Option<DeviceIdentifier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_area: Option<String>,
}

/// A device as stored in the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceEntry {
    /// Registry-assigned id, stable for the lifetime of the registry.
    pub id: String,
    pub config_entries: BTreeSet<String>,
    pub identifiers: BTreeSet<DeviceIdentifier>,
    pub name: String,
    pub manufacturer: String,
    pub model: Option<String>,
    /// Area suggested when the device was first created.
    pub suggested_area: Option<String>,
    /// Registry id of the parent device, when it is registered.
    pub via_device_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}
