use std::fmt;
use std::sync::Arc;

use tracing::debug;

use caseta_api::BridgeClient;

use super::Entity;
use crate::error::CoreError;
use crate::mapper::LedSpec;
use crate::model::{DeviceTreeRef, EntityDescriptor, Keypad, LedState};

pub const LED_ON_ICON: &str = "mdi:led-on";
pub const LED_OFF_ICON: &str = "mdi:led-off";

/// On/off entity for the status LED of a keypad button.
pub struct KeypadLed {
    descriptor: EntityDescriptor,
    tree: DeviceTreeRef,
    led_id: String,
    bridge: Arc<dyn BridgeClient>,
}

impl KeypadLed {
    pub fn new(spec: LedSpec, bridge: Arc<dyn BridgeClient>) -> Self {
        Self {
            descriptor: spec.descriptor,
            tree: spec.tree,
            led_id: spec.led_id,
            bridge,
        }
    }

    pub fn tree(&self) -> &DeviceTreeRef {
        &self.tree
    }

    pub fn led_id(&self) -> &str {
        &self.led_id
    }

    /// Current LED record, read from the bridge's live device table.
    pub fn led_state(&self) -> Result<LedState, CoreError> {
        let record = self
            .bridge
            .get_device_by_id(&self.tree.keypad_device_id)
            .ok_or_else(|| CoreError::KeypadNotFound {
                keypad_id: self.tree.keypad_device_id.clone(),
            })?;
        let keypad = Keypad::try_from(record)?;
        let group = keypad.group(&self.tree.button_group_id)?;
        let led = match &self.tree.button_device_id {
            Some(button_id) => group.button(button_id)?.led.clone(),
            None => group
                .buttons
                .values()
                .find_map(|b| b.led.clone().filter(|led| led.led_id == self.led_id)),
        };
        led.ok_or_else(|| CoreError::EntityNotFound {
            unique_id: self.descriptor.unique_id.clone(),
        })
    }

    /// `false` when the LED can no longer be resolved.
    pub fn is_on(&self) -> bool {
        self.led_state().is_ok_and(|led| led.is_on())
    }

    pub fn icon(&self) -> &'static str {
        if self.is_on() { LED_ON_ICON } else { LED_OFF_ICON }
    }

    pub async fn turn_on(&self) -> Result<(), CoreError> {
        debug!(unique_id = %self.descriptor.unique_id, "turning LED on");
        self.bridge
            .turn_led_on(
                &self.tree.keypad_device_id,
                &self.tree.button_group_id,
                self.button_id()?,
            )
            .await?;
        Ok(())
    }

    pub async fn turn_off(&self) -> Result<(), CoreError> {
        debug!(unique_id = %self.descriptor.unique_id, "turning LED off");
        self.bridge
            .turn_led_off(
                &self.tree.keypad_device_id,
                &self.tree.button_group_id,
                self.button_id()?,
            )
            .await?;
        Ok(())
    }

    // LED commands are addressed to the button that owns the LED.
    fn button_id(&self) -> Result<&str, CoreError> {
        self.tree
            .button_device_id
            .as_deref()
            .ok_or_else(|| CoreError::EntityNotFound {
                unique_id: self.descriptor.unique_id.clone(),
            })
    }
}

impl Entity for KeypadLed {
    fn descriptor(&self) -> &EntityDescriptor {
        &self.descriptor
    }
}

impl fmt::Debug for KeypadLed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeypadLed")
            .field("unique_id", &self.descriptor.unique_id)
            .field("tree", &self.tree)
            .field("led_id", &self.led_id)
            .finish_non_exhaustive()
    }
}
