//! In-process bridge client backed by a device snapshot.
//!
//! Holds the device table in memory, applies commands to it the way the
//! real bridge reflects them back (switch levels, LED states), and lets
//! callers inject button activity with [`MemoryBridge::emit_button_event`].
//! Used by the simulator binary and throughout the test suites.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

use async_trait::async_trait;
use dashmap::DashMap;
use serde::Serialize;
use tracing::{debug, trace};

use crate::client::{BridgeClient, ButtonCallback, ButtonSubscription};
use crate::error::Error;
use crate::models::{BridgeInfo, BridgeSnapshot, DeviceDomain, RawDevice};

const LEVEL_ON: i64 = 100;
const LED_ON: i64 = 1;

type SubscriberMap = DashMap<String, Vec<(u64, ButtonCallback)>>;

/// A command the bridge accepted, in the order it was received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum BridgeCommand {
    TapButton {
        keypad_id: String,
        group_id: String,
        button_id: String,
    },
    TurnLedOn {
        keypad_id: String,
        group_id: String,
        button_id: String,
    },
    TurnLedOff {
        keypad_id: String,
        group_id: String,
        button_id: String,
    },
    TurnOn {
        device_id: String,
    },
    TurnOff {
        device_id: String,
    },
}

/// Bridge client whose device table lives entirely in memory.
pub struct MemoryBridge {
    info: BridgeInfo,
    devices: DashMap<String, RawDevice>,
    subscribers: Arc<SubscriberMap>,
    next_subscription: AtomicU64,
    commands: Mutex<Vec<BridgeCommand>>,
    connected: AtomicBool,
    rejection: Mutex<Option<String>>,
}

impl MemoryBridge {
    pub fn new(info: BridgeInfo) -> Self {
        Self {
            info,
            devices: DashMap::new(),
            subscribers: Arc::new(DashMap::new()),
            next_subscription: AtomicU64::new(0),
            commands: Mutex::new(Vec::new()),
            connected: AtomicBool::new(true),
            rejection: Mutex::new(None),
        }
    }

    pub fn from_snapshot(snapshot: BridgeSnapshot) -> Self {
        let bridge = Self::new(snapshot.bridge);
        for device in snapshot.devices {
            bridge.upsert_device(device);
        }
        bridge
    }

    /// Insert or replace a device record, as the bridge does on resync.
    pub fn upsert_device(&self, device: RawDevice) {
        self.devices.insert(device.device_id.clone(), device);
    }

    pub fn remove_device(&self, device_id: &str) -> Option<RawDevice> {
        self.devices.remove(device_id).map(|(_, device)| device)
    }

    /// Mark the connection up or down. Commands fail while it is down.
    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    /// Make every subsequent command fail with the given message (`None` clears).
    pub fn reject_commands(&self, message: Option<String>) {
        *self.rejection.lock().unwrap_or_else(PoisonError::into_inner) = message;
    }

    /// Every command accepted so far.
    pub fn commands(&self) -> Vec<BridgeCommand> {
        self.commands
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of live callbacks registered for a button.
    pub fn subscriber_count(&self, device_id: &str) -> usize {
        self.subscribers.get(device_id).map_or(0, |subs| subs.len())
    }

    /// Deliver a raw button status to every subscriber of `button_id`.
    ///
    /// Callbacks run synchronously, in registration order. Returns how many
    /// callbacks were invoked.
    pub fn emit_button_event(&self, button_id: &str, event_type: &str) -> usize {
        let callbacks: Vec<ButtonCallback> = self
            .subscribers
            .get(button_id)
            .map(|subs| subs.iter().map(|(_, cb)| Arc::clone(cb)).collect())
            .unwrap_or_default();

        trace!(button_id, event_type, subscribers = callbacks.len(), "button event");
        for callback in &callbacks {
            callback(event_type);
        }
        callbacks.len()
    }

    // ── Private helpers ──────────────────────────────────────────────

    fn precheck(&self, command: &str) -> Result<(), Error> {
        if !self.connected.load(Ordering::SeqCst) {
            return Err(Error::NotConnected);
        }
        if let Some(message) = self
            .rejection
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
        {
            return Err(Error::CommandRejected {
                command: command.into(),
                message,
            });
        }
        Ok(())
    }

    fn record(&self, command: BridgeCommand) {
        debug!(?command, "bridge command accepted");
        self.commands
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(command);
    }

    fn set_led(&self, keypad_id: &str, group_id: &str, button_id: &str, state: i64) -> Result<(), Error> {
        let mut keypad = self
            .devices
            .get_mut(keypad_id)
            .ok_or_else(|| Error::DeviceNotFound {
                device_id: keypad_id.into(),
            })?;
        let led = keypad
            .led_mut(group_id, button_id)
            .ok_or_else(|| Error::DeviceNotFound {
                device_id: button_id.into(),
            })?;
        led.current_state = state;
        Ok(())
    }

    fn set_level(&self, device_id: &str, level: i64) -> Result<(), Error> {
        let mut device = self
            .devices
            .get_mut(device_id)
            .ok_or_else(|| Error::DeviceNotFound {
                device_id: device_id.into(),
            })?;
        device.current_state = Some(level);
        Ok(())
    }
}

#[async_trait]
impl BridgeClient for MemoryBridge {
    fn bridge_info(&self) -> BridgeInfo {
        self.info.clone()
    }

    fn get_devices_by_domain(&self, domain: DeviceDomain) -> Vec<RawDevice> {
        let mut devices: Vec<RawDevice> = self
            .devices
            .iter()
            .filter(|entry| entry.value().domain() == domain)
            .map(|entry| entry.value().clone())
            .collect();
        // Numeric ids sort naturally when shorter ids come first.
        devices.sort_by(|a, b| {
            (a.device_id.len(), &a.device_id).cmp(&(b.device_id.len(), &b.device_id))
        });
        devices
    }

    fn get_device_by_id(&self, device_id: &str) -> Option<RawDevice> {
        self.devices.get(device_id).map(|d| d.value().clone())
    }

    async fn tap_button(
        &self,
        keypad_id: &str,
        group_id: &str,
        button_id: &str,
    ) -> Result<(), Error> {
        self.precheck("tap_button")?;
        let known = self
            .devices
            .get(keypad_id)
            .is_some_and(|keypad| keypad.has_button(group_id, button_id));
        if !known {
            return Err(Error::DeviceNotFound {
                device_id: button_id.into(),
            });
        }
        self.record(BridgeCommand::TapButton {
            keypad_id: keypad_id.into(),
            group_id: group_id.into(),
            button_id: button_id.into(),
        });
        Ok(())
    }

    async fn turn_led_on(&self, keypad_id: &str, group_id: &str, button_id: &str) -> Result<(), Error> {
        self.precheck("turn_led_on")?;
        self.set_led(keypad_id, group_id, button_id, LED_ON)?;
        self.record(BridgeCommand::TurnLedOn {
            keypad_id: keypad_id.into(),
            group_id: group_id.into(),
            button_id: button_id.into(),
        });
        Ok(())
    }

    async fn turn_led_off(&self, keypad_id: &str, group_id: &str, button_id: &str) -> Result<(), Error> {
        self.precheck("turn_led_off")?;
        self.set_led(keypad_id, group_id, button_id, 0)?;
        self.record(BridgeCommand::TurnLedOff {
            keypad_id: keypad_id.into(),
            group_id: group_id.into(),
            button_id: button_id.into(),
        });
        Ok(())
    }

    async fn turn_on(&self, device_id: &str) -> Result<(), Error> {
        self.precheck("turn_on")?;
        self.set_level(device_id, LEVEL_ON)?;
        self.record(BridgeCommand::TurnOn {
            device_id: device_id.into(),
        });
        Ok(())
    }

    async fn turn_off(&self, device_id: &str) -> Result<(), Error> {
        self.precheck("turn_off")?;
        self.set_level(device_id, 0)?;
        self.record(BridgeCommand::TurnOff {
            device_id: device_id.into(),
        });
        Ok(())
    }

    fn add_button_subscriber(
        &self,
        device_id: &str,
        callback: ButtonCallback,
    ) -> ButtonSubscription {
        let id = self.next_subscription.fetch_add(1, Ordering::Relaxed);
        self.subscribers
            .entry(device_id.to_owned())
            .or_default()
            .push((id, callback));

        let subscribers: Weak<SubscriberMap> = Arc::downgrade(&self.subscribers);
        let key = device_id.to_owned();
        ButtonSubscription::new(device_id, move || {
            let Some(subscribers) = subscribers.upgrade() else {
                return;
            };
            if let Some(mut subs) = subscribers.get_mut(&key) {
                subs.retain(|(sub_id, _)| *sub_id != id);
            }
            subscribers.remove_if(&key, |_, subs| subs.is_empty());
        })
    }
}
