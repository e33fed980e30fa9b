// ── Device tree mapper ──
//
// Walks the bridge's keypad listing (keypad -> button group -> button ->
// optional LED) and plans what to register: one device per keypad, one
// press entity per button, one on/off entity per LED. Pure: nothing here
// touches the registry or the bridge.

use std::collections::BTreeSet;

use tracing::{debug, warn};

use caseta_api::{BridgeInfo, RawDevice};

use crate::config::IntegrationConfig;
use crate::model::{
    Button, ButtonGroup, Capability, DeviceIdentifier, DeviceIdentity, DeviceInfo,
    DeviceRegistration, DeviceTreeRef, EntityDescriptor, Keypad, Platform, SwitchDevice,
};

/// Everything needed to build the entities of one button.
#[derive(Debug, Clone, PartialEq)]
pub struct ButtonSpec {
    pub descriptor: EntityDescriptor,
    pub tree: DeviceTreeRef,
    pub button_id: String,
}

/// Everything needed to build the entity of one button LED.
#[derive(Debug, Clone, PartialEq)]
pub struct LedSpec {
    pub descriptor: EntityDescriptor,
    /// Includes the owning button's id.
    pub tree: DeviceTreeRef,
    pub led_id: String,
}

/// Registration plus entity specs for one keypad.
#[derive(Debug, Clone, PartialEq)]
pub struct KeypadPlan {
    pub keypad: Keypad,
    pub identity: DeviceIdentity,
    pub registration: DeviceRegistration,
    pub buttons: Vec<ButtonSpec>,
    pub leds: Vec<LedSpec>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwitchPlan {
    pub switch: SwitchDevice,
    pub descriptor: EntityDescriptor,
}

pub struct DeviceTreeMapper {
    config: IntegrationConfig,
    bridge: BridgeInfo,
}

impl DeviceTreeMapper {
    pub fn new(config: IntegrationConfig, bridge: BridgeInfo) -> Self {
        Self { config, bridge }
    }

    pub fn bridge_serial(&self) -> &str {
        &self.bridge.serial
    }

    /// Identifier of the bridge device, the parent of every keypad.
    pub fn bridge_identifier(&self) -> DeviceIdentifier {
        DeviceIdentifier::new(&self.config.domain, &self.bridge.serial)
    }

    pub fn keypad_identity(&self, keypad_device_id: &str) -> DeviceIdentity {
        DeviceIdentity::new(&self.bridge.serial, keypad_device_id)
    }

    pub fn bridge_registration(&self) -> DeviceRegistration {
        DeviceRegistration {
            config_entry_id: self.config.entry_id.clone(),
            name: self
                .bridge
                .name
                .clone()
                .unwrap_or_else(|| format!("Caseta Bridge {}", self.bridge.serial)),
            manufacturer: self.config.manufacturer.clone(),
            identifiers: BTreeSet::from([self.bridge_identifier()]),
            model: self.bridge.model.clone(),
            via_device: None,
            suggested_area: None,
        }
    }

    /// Convert and plan every keypad in a listing. Records that fail
    /// validation are logged and skipped.
    pub fn map_keypads(&self, devices: Vec<RawDevice>) -> Vec<KeypadPlan> {
        devices
            .into_iter()
            .filter_map(|raw| match Keypad::try_from(raw) {
                Ok(keypad) => self.map_keypad(keypad),
                Err(e) => {
                    warn!(error = %e, "skipping malformed keypad record");
                    None
                }
            })
            .collect()
    }

    /// Plan one keypad, or `None` if it should not be registered at all.
    pub fn map_keypad(&self, keypad: Keypad) -> Option<KeypadPlan> {
        let Some(area) = keypad.area_name.as_deref() else {
            debug!(keypad_id = %keypad.device_id, "keypad has no area, skipping");
            return None;
        };
        let unassigned = self.config.is_unassigned(area);
        if unassigned && self.config.skip_unassigned_keypads {
            debug!(keypad_id = %keypad.device_id, "keypad is unassigned, skipping");
            return None;
        }
        let suggested_area = (!unassigned).then(|| area.to_owned());

        let identity = self.keypad_identity(&keypad.device_id);
        let registration = DeviceRegistration {
            config_entry_id: self.config.entry_id.clone(),
            name: format!("{} {}", keypad.control_station_name, keypad.name),
            manufacturer: self.config.manufacturer.clone(),
            identifiers: BTreeSet::from([identity.to_identifier(&self.config.domain)]),
            model: Some(keypad.model_string()),
            via_device: Some(self.bridge_identifier()),
            suggested_area,
        };

        let mut buttons = Vec::new();
        let mut leds = Vec::new();
        for (group, button) in keypad.buttons() {
            buttons.push(self.button_spec(&keypad, &identity, group, button));
            if let Some(led) = &button.led {
                leds.push(LedSpec {
                    descriptor: self.descriptor(
                        &keypad,
                        &identity,
                        &led.led_id,
                        &format!("{} LED", button.name),
                        (Platform::Switch, Capability::OnOff),
                    ),
                    tree: DeviceTreeRef {
                        keypad_device_id: keypad.device_id.clone(),
                        button_group_id: group.button_group_id.clone(),
                        button_device_id: Some(button.device_id.clone()),
                    },
                    led_id: led.led_id.clone(),
                });
            }
        }

        debug!(
            keypad_id = %keypad.device_id,
            buttons = buttons.len(),
            leds = leds.len(),
            "mapped keypad"
        );
        Some(KeypadPlan {
            keypad,
            identity,
            registration,
            buttons,
            leds,
        })
    }

    /// Plan the on/off entity of a switch. Its device block hangs off the bridge.
    pub fn map_switch(&self, switch: SwitchDevice) -> SwitchPlan {
        let key = switch
            .serial
            .clone()
            .unwrap_or_else(|| DeviceIdentity::new(&self.bridge.serial, &switch.device_id).key());
        let suggested_area = switch
            .area_name
            .as_deref()
            .filter(|area| !self.config.is_unassigned(area))
            .map(ToOwned::to_owned);

        let descriptor = EntityDescriptor {
            unique_id: key.clone(),
            name: switch.name.clone(),
            platform: Platform::Switch,
            capability: Capability::OnOff,
            device_info: DeviceInfo {
                name: switch.name.clone(),
                identifiers: BTreeSet::from([DeviceIdentifier::new(&self.config.domain, key)]),
                manufacturer: Some(self.config.manufacturer.clone()),
                model: Some(switch.model_string()),
                suggested_area,
                via_device: Some(self.bridge_identifier()),
            },
        };
        SwitchPlan { switch, descriptor }
    }

    // ── Private helpers ──────────────────────────────────────────────

    fn button_spec(
        &self,
        keypad: &Keypad,
        identity: &DeviceIdentity,
        group: &ButtonGroup,
        button: &Button,
    ) -> ButtonSpec {
        ButtonSpec {
            descriptor: self.descriptor(
                keypad,
                identity,
                &button.device_id,
                &button.name,
                (Platform::Button, Capability::Press),
            ),
            tree: DeviceTreeRef {
                keypad_device_id: keypad.device_id.clone(),
                button_group_id: group.button_group_id.clone(),
                button_device_id: None,
            },
            button_id: button.device_id.clone(),
        }
    }

    /// Button and LED entities have no serial of their own; they are keyed
    /// by bridge serial plus their own id and hang off the keypad device.
    /// Their area hint is the keypad's area as reported, sentinel included.
    fn descriptor(
        &self,
        keypad: &Keypad,
        identity: &DeviceIdentity,
        own_id: &str,
        base_name: &str,
        (platform, capability): (Platform, Capability),
    ) -> EntityDescriptor {
        let unique_id = DeviceIdentity::new(&self.bridge.serial, own_id).key();
        let name = format!(
            "{} {} {} {}",
            keypad.area_name.as_deref().unwrap_or_default(),
            keypad.control_station_name,
            keypad.name,
            base_name
        );
        EntityDescriptor {
            device_info: DeviceInfo {
                name: name.clone(),
                identifiers: BTreeSet::from([DeviceIdentifier::new(
                    &self.config.domain,
                    &unique_id,
                )]),
                manufacturer: Some(self.config.manufacturer.clone()),
                model: Some(keypad.model_string()),
                suggested_area: keypad.area_name.clone(),
                via_device: Some(identity.to_identifier(&self.config.domain)),
            },
            unique_id,
            name,
            platform,
            capability,
        }
    }
}
