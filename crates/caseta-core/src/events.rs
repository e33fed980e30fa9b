// ── Button event bridge ──
//
// Turns raw button notifications from the bridge client into structured
// bus events. Every notification re-resolves keypad, group and button by
// id against the bridge's live device table, and the owning platform
// device against the registry.

use std::sync::{Arc, Weak};

use tracing::{debug, warn};

use caseta_api::{BridgeClient, ButtonCallback};

use crate::bus::EventBus;
use crate::error::CoreError;
use crate::model::{ButtonAction, ButtonActivity, DeviceIdentity, Keypad};
use crate::registry::DeviceRegistry;

/// Notification handler for exactly one button.
///
/// The `(button, group, keypad)` ids are fixed at construction.
pub struct ButtonNotifier {
    button_id: String,
    button_group_id: String,
    keypad_device_id: String,
    domain: String,
    bridge_serial: String,
    bridge: Weak<dyn BridgeClient>,
    registry: Arc<DeviceRegistry>,
    bus: EventBus,
}

impl ButtonNotifier {
    pub fn new(
        button_id: impl Into<String>,
        button_group_id: impl Into<String>,
        keypad_device_id: impl Into<String>,
        domain: impl Into<String>,
        bridge: &Arc<dyn BridgeClient>,
        registry: Arc<DeviceRegistry>,
        bus: EventBus,
    ) -> Self {
        Self {
            button_id: button_id.into(),
            button_group_id: button_group_id.into(),
            keypad_device_id: keypad_device_id.into(),
            domain: domain.into(),
            bridge_serial: bridge.bridge_info().serial,
            bridge: Arc::downgrade(bridge),
            registry,
            bus,
        }
    }

    pub fn button_id(&self) -> &str {
        &self.button_id
    }

    /// Build the event payload for one raw status.
    pub fn resolve(&self, raw_event_type: &str) -> Result<ButtonActivity, CoreError> {
        let bridge = self.bridge.upgrade().ok_or(CoreError::BridgeUnavailable)?;
        let record = bridge
            .get_device_by_id(&self.keypad_device_id)
            .ok_or_else(|| CoreError::KeypadNotFound {
                keypad_id: self.keypad_device_id.clone(),
            })?;
        let keypad = Keypad::try_from(record)?;
        let button = keypad.button(&self.button_group_id, &self.button_id)?;

        let identifier = DeviceIdentity::new(&self.bridge_serial, &keypad.device_id)
            .to_identifier(&self.domain);
        let device_id = self.registry.get_device(&identifier).map(|d| d.id.clone());
        if device_id.is_none() {
            debug!(%identifier, "keypad device not registered, event carries no device id");
        }

        Ok(ButtonActivity {
            button_number: button.button_number,
            button_name: button.name.clone(),
            button_id: button.device_id.clone(),
            action: ButtonAction::from_status(raw_event_type),
            serial: keypad.serial,
            device_type: keypad.device_type,
            model: keypad.model,
            device_name: keypad.control_station_name,
            keypad_id: keypad.device_id,
            device_id,
            area_name: keypad.area_name,
        })
    }

    /// Resolve and publish. Returns `false` when the event was dropped.
    pub fn handle(&self, raw_event_type: &str) -> bool {
        match self.resolve(raw_event_type) {
            Ok(activity) => {
                self.bus.publish_button_activity(activity);
                true
            }
            Err(e) => {
                warn!(
                    button_id = %self.button_id,
                    group_id = %self.button_group_id,
                    keypad_id = %self.keypad_device_id,
                    error = %e,
                    "dropping button event"
                );
                false
            }
        }
    }

    /// Wrap into the callback shape the bridge client expects.
    pub fn into_callback(self) -> ButtonCallback {
        Arc::new(move |raw_event_type: &str| {
            self.handle(raw_event_type);
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use caseta_api::{BridgeSnapshot, MemoryBridge};
    use serde_json::json;

    fn bridge() -> Arc<dyn BridgeClient> {
        let snapshot: BridgeSnapshot = serde_json::from_value(json!({
            "bridge": { "serial": 1234 },
            "devices": [{
                "device_id": "10", "name": "Keypad 1", "type": "SunnataKeypad",
                "model": "RRST-W4B-XX", "serial": 6666, "area_name": "Kitchen",
                "control_station_name": "Entry",
                "button_groups": { "100": { "button_group_id": "100", "buttons": {
                    "101": { "device_id": "101", "button_number": 1, "name": "Welcome" }
                } } }
            }]
        }))
        .unwrap();
        Arc::new(MemoryBridge::from_snapshot(snapshot))
    }

    fn notifier(bridge: &Arc<dyn BridgeClient>, button: &str, group: &str, keypad: &str) -> ButtonNotifier {
        ButtonNotifier::new(
            button,
            group,
            keypad,
            "lutron_caseta",
            bridge,
            Arc::new(DeviceRegistry::new()),
            EventBus::new(),
        )
    }

    #[test]
    fn resolve_copies_keypad_fields() {
        let bridge = bridge();
        let activity = notifier(&bridge, "101", "100", "10").resolve("Press").unwrap();
        assert_eq!(activity.serial.as_deref(), Some("6666"));
        assert_eq!(activity.device_name, "Entry");
        assert_eq!(activity.button_name, "Welcome");
        assert_eq!(activity.action, ButtonAction::Press);
        assert!(activity.device_id.is_none());
    }

    #[test]
    fn each_topology_miss_is_reported() {
        let bridge = bridge();
        let err = notifier(&bridge, "101", "100", "99").resolve("Press").unwrap_err();
        assert!(matches!(err, CoreError::KeypadNotFound { .. }));
        let err = notifier(&bridge, "101", "200", "10").resolve("Press").unwrap_err();
        assert!(matches!(err, CoreError::ButtonGroupNotFound { .. }));
        let err = notifier(&bridge, "109", "100", "10").resolve("Press").unwrap_err();
        assert!(matches!(err, CoreError::ButtonNotFound { .. }));
    }

    #[test]
    fn dropped_bridge_drops_events() {
        let bridge = bridge();
        let notifier = notifier(&bridge, "101", "100", "10");
        drop(bridge);
        assert!(matches!(notifier.resolve("Press"), Err(CoreError::BridgeUnavailable)));
        assert!(!notifier.handle("Press"));
    }
}
