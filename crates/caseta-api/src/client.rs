//! The capability set every bridge client exposes.
//!
//! Reads are synchronous lookups into the client's in-memory device table.
//! Commands are async and resolve once the bridge acknowledges them.
//! Button notifications are push-based: a callback per button, scoped by
//! the [`ButtonSubscription`] handle returned at registration.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Error;
use crate::models::{BridgeInfo, DeviceDomain, RawDevice};

/// Callback invoked with the raw button status (e.g. `"Press"`).
pub type ButtonCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// Abstract bridge client.
#[async_trait]
pub trait BridgeClient: Send + Sync {
    /// Identity of the bridge itself.
    fn bridge_info(&self) -> BridgeInfo;

    /// All devices currently known in the given domain.
    fn get_devices_by_domain(&self, domain: DeviceDomain) -> Vec<RawDevice>;

    /// Current record for one device, if the bridge still knows it.
    fn get_device_by_id(&self, device_id: &str) -> Option<RawDevice>;

    /// Simulate a physical tap of a keypad button.
    async fn tap_button(&self, keypad_id: &str, group_id: &str, button_id: &str)
    -> Result<(), Error>;

    /// Light the status LED of `button_id`.
    async fn turn_led_on(&self, keypad_id: &str, group_id: &str, button_id: &str)
    -> Result<(), Error>;

    async fn turn_led_off(&self, keypad_id: &str, group_id: &str, button_id: &str)
    -> Result<(), Error>;

    async fn turn_on(&self, device_id: &str) -> Result<(), Error>;

    async fn turn_off(&self, device_id: &str) -> Result<(), Error>;

    /// Register a callback for status changes of one button.
    ///
    /// The callback stays registered for as long as the returned handle lives.
    fn add_button_subscriber(&self, device_id: &str, callback: ButtonCallback)
    -> ButtonSubscription;
}

// ── ButtonSubscription ───────────────────────────────────────────────

/// Handle to one registered button callback.
///
/// Dropping the handle unregisters the callback; [`unsubscribe`](Self::unsubscribe)
/// does the same explicitly.
pub struct ButtonSubscription {
    device_id: String,
    cancel: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl ButtonSubscription {
    pub fn new(device_id: impl Into<String>, cancel: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            device_id: device_id.into(),
            cancel: Some(Box::new(cancel)),
        }
    }

    /// The button this subscription listens to.
    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn unsubscribe(mut self) {
        self.cancel_now();
    }

    fn cancel_now(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for ButtonSubscription {
    fn drop(&mut self) {
        self.cancel_now();
    }
}

impl fmt::Debug for ButtonSubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ButtonSubscription")
            .field("device_id", &self.device_id)
            .field("active", &self.cancel.is_some())
            .finish()
    }
}
