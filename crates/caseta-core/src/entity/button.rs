use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

use caseta_api::{BridgeClient, ButtonSubscription};

use super::Entity;
use crate::error::CoreError;
use crate::events::ButtonNotifier;
use crate::mapper::ButtonSpec;
use crate::model::{DeviceTreeRef, EntityDescriptor};

/// Press entity for one keypad button.
///
/// Owns the button's notification subscription. It ends when the entity is
/// dropped or [`detach`](Self::detach)ed, whichever comes first, so handles
/// cloned out of the entry go quiet once the entry unloads.
pub struct KeypadButton {
    descriptor: EntityDescriptor,
    tree: DeviceTreeRef,
    button_id: String,
    bridge: Arc<dyn BridgeClient>,
    subscription: Mutex<Option<ButtonSubscription>>,
}

impl KeypadButton {
    /// Build the entity and subscribe `notifier` to the button.
    pub fn new(spec: ButtonSpec, bridge: Arc<dyn BridgeClient>, notifier: ButtonNotifier) -> Self {
        let subscription = bridge.add_button_subscriber(&spec.button_id, notifier.into_callback());
        Self {
            descriptor: spec.descriptor,
            tree: spec.tree,
            button_id: spec.button_id,
            bridge,
            subscription: Mutex::new(Some(subscription)),
        }
    }

    pub fn tree(&self) -> &DeviceTreeRef {
        &self.tree
    }

    pub fn button_id(&self) -> &str {
        &self.button_id
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Stop forwarding this button's notifications. Idempotent.
    pub fn detach(&self) {
        let subscription = self
            .subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(subscription) = subscription {
            debug!(unique_id = %self.descriptor.unique_id, "detaching button subscription");
            subscription.unsubscribe();
        }
    }

    /// Tap the physical button through the bridge.
    pub async fn press(&self) -> Result<(), CoreError> {
        debug!(unique_id = %self.descriptor.unique_id, "pressing keypad button");
        self.bridge
            .tap_button(
                &self.tree.keypad_device_id,
                &self.tree.button_group_id,
                &self.button_id,
            )
            .await?;
        Ok(())
    }
}

impl Entity for KeypadButton {
    fn descriptor(&self) -> &EntityDescriptor {
        &self.descriptor
    }
}

impl fmt::Debug for KeypadButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeypadButton")
            .field("unique_id", &self.descriptor.unique_id)
            .field("tree", &self.tree)
            .field("button_id", &self.button_id)
            .field("subscribed", &self.is_subscribed())
            .finish_non_exhaustive()
    }
}
