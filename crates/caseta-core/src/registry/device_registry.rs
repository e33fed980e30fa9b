// ── Device registry ──
//
// Devices are keyed by a registry-assigned id and indexed by every
// identifier they carry. Registration is get-or-create: a request whose
// identifiers match an existing device refreshes that device in place.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use super::collection::EntityCollection;
use crate::model::{DeviceEntry, DeviceIdentifier, DeviceRegistration};
use super::RegistryStream;
use crate::stream::SnapshotStream;

/// Registry of logical devices, shared by handle.
pub struct DeviceRegistry {
    devices: EntityCollection<DeviceEntry>,
    /// Serializes get-or-create so two registrations of one identity
    /// cannot both miss and insert.
    write_lock: Mutex<()>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self {
            devices: EntityCollection::new(),
            write_lock: Mutex::new(()),
        }
    }

    /// Register a device, or update the one already carrying any of its identifiers.
    ///
    /// Re-registering with identical data is a no-op and leaves the
    /// registry version untouched.
    pub fn get_or_create(&self, registration: DeviceRegistration) -> Arc<DeviceEntry> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let via_device_id = registration
            .via_device
            .as_ref()
            .and_then(|via| self.devices.key_for_alias(&via.to_string()));

        let existing = registration
            .identifiers
            .iter()
            .find_map(|identifier| self.devices.get_by_alias(&identifier.to_string()));

        let Some(current) = existing else {
            let now = Utc::now();
            let entry = DeviceEntry {
                id: Uuid::new_v4().simple().to_string(),
                config_entries: [registration.config_entry_id].into_iter().collect(),
                identifiers: registration.identifiers,
                name: registration.name,
                manufacturer: registration.manufacturer,
                model: registration.model,
                suggested_area: registration.suggested_area,
                via_device_id,
                created_at: now,
                modified_at: now,
            };
            debug!(device_id = %entry.id, name = %entry.name, "registered device");
            self.store(entry.clone());
            return Arc::new(entry);
        };

        let mut updated = (*current).clone();
        updated.config_entries.insert(registration.config_entry_id);
        updated.identifiers.extend(registration.identifiers);
        updated.name = registration.name;
        updated.manufacturer = registration.manufacturer;
        if registration.model.is_some() {
            updated.model = registration.model;
        }
        if via_device_id.is_some() {
            updated.via_device_id = via_device_id;
        }
        if updated.suggested_area.is_none() {
            updated.suggested_area = registration.suggested_area;
        }

        if updated == *current {
            return current;
        }

        updated.modified_at = Utc::now();
        debug!(device_id = %updated.id, name = %updated.name, "updated device");
        self.store(updated.clone());
        Arc::new(updated)
    }

    /// Look up a device by registry id.
    pub fn get(&self, device_id: &str) -> Option<Arc<DeviceEntry>> {
        self.devices.get_by_key(device_id)
    }

    /// Look up a device by one of its identifiers.
    pub fn get_device(&self, identifier: &DeviceIdentifier) -> Option<Arc<DeviceEntry>> {
        self.devices.get_by_alias(&identifier.to_string())
    }

    pub fn remove(&self, device_id: &str) -> Option<Arc<DeviceEntry>> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.devices.remove(device_id)
    }

    /// Devices registered by the given config entry.
    pub fn devices_for_entry(&self, entry_id: &str) -> Vec<Arc<DeviceEntry>> {
        self.devices
            .snapshot()
            .iter()
            .filter(|device| device.config_entries.contains(entry_id))
            .cloned()
            .collect()
    }

    pub fn devices_snapshot(&self) -> Arc<Vec<Arc<DeviceEntry>>> {
        self.devices.snapshot()
    }

    /// Monotonic counter bumped on every stored change.
    pub fn version(&self) -> u64 {
        self.devices.version()
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn subscribe(&self) -> RegistryStream {
        SnapshotStream::new(self.devices.subscribe())
    }

    fn store(&self, entry: DeviceEntry) {
        let aliases = entry.identifiers.iter().map(ToString::to_string).collect();
        self.devices.upsert(entry.id.clone(), aliases, entry);
    }
}

impl Default for DeviceRegistry {
    fn default() -> Self {
        Self::new()
    }
}
