// ── Integration entry ──
//
// One config entry bound to one bridge. Setup registers the bridge and
// keypad devices, builds the button and switch platforms and subscribes
// every button to the event bridge. Unload detaches every button
// subscription and drops every entity.

use std::sync::Arc;

use indexmap::IndexMap;
use strum::{AsRefStr, Display};
use tokio::sync::{Mutex, watch};
use tracing::{debug, info};

use caseta_api::{BridgeClient, DeviceDomain};

use crate::bus::EventBus;
use crate::config::IntegrationConfig;
use crate::entity::{CasetaSwitch, Entity, KeypadButton, KeypadLed};
use crate::error::CoreError;
use crate::events::ButtonNotifier;
use crate::mapper::{DeviceTreeMapper, KeypadPlan};
use crate::model::{DeviceEntry, EntityDescriptor, SwitchDevice};
use crate::registry::DeviceRegistry;

// ── EntryState ───────────────────────────────────────────────────

/// Lifecycle of the config entry, observable by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum EntryState {
    NotLoaded,
    Loaded,
    Unloaded,
}

// ── Platforms ────────────────────────────────────────────────────

#[derive(Default)]
struct Platforms {
    buttons: IndexMap<String, Arc<KeypadButton>>,
    leds: IndexMap<String, Arc<KeypadLed>>,
    switches: IndexMap<String, Arc<CasetaSwitch>>,
}

/// Live entity handle, whichever platform it belongs to.
#[derive(Debug, Clone)]
pub enum EntityHandle {
    Button(Arc<KeypadButton>),
    Led(Arc<KeypadLed>),
    Switch(Arc<CasetaSwitch>),
}

impl EntityHandle {
    pub fn descriptor(&self) -> &EntityDescriptor {
        match self {
            Self::Button(button) => button.descriptor(),
            Self::Led(led) => led.descriptor(),
            Self::Switch(switch) => switch.descriptor(),
        }
    }

    /// On/off state; `None` for press-only entities.
    pub fn is_on(&self) -> Option<bool> {
        match self {
            Self::Button(_) => None,
            Self::Led(led) => Some(led.is_on()),
            Self::Switch(switch) => Some(switch.is_on()),
        }
    }
}

// ── Integration ──────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<IntegrationInner>`.
#[derive(Clone)]
pub struct Integration {
    inner: Arc<IntegrationInner>,
}

struct IntegrationInner {
    config: IntegrationConfig,
    bridge: Arc<dyn BridgeClient>,
    registry: Arc<DeviceRegistry>,
    bus: EventBus,
    mapper: DeviceTreeMapper,
    state: watch::Sender<EntryState>,
    platforms: Mutex<Platforms>,
}

impl Integration {
    /// Create an entry for `bridge`. Does NOT set up -- call
    /// [`setup()`](Self::setup) to register devices and build entities.
    pub fn new(
        config: IntegrationConfig,
        bridge: Arc<dyn BridgeClient>,
        registry: Arc<DeviceRegistry>,
        bus: EventBus,
    ) -> Self {
        let mapper = DeviceTreeMapper::new(config.clone(), bridge.bridge_info());
        let (state, _) = watch::channel(EntryState::NotLoaded);
        Self {
            inner: Arc::new(IntegrationInner {
                config,
                bridge,
                registry,
                bus,
                mapper,
                state,
                platforms: Mutex::new(Platforms::default()),
            }),
        }
    }

    /// Create an entry with its own registry and a bus sized from `config`.
    pub fn standalone(config: IntegrationConfig, bridge: Arc<dyn BridgeClient>) -> Self {
        let bus = EventBus::with_capacity(config.bus_capacity);
        Self::new(config, bridge, Arc::new(DeviceRegistry::new()), bus)
    }

    pub fn config(&self) -> &IntegrationConfig {
        &self.inner.config
    }

    pub fn registry(&self) -> &Arc<DeviceRegistry> {
        &self.inner.registry
    }

    pub fn bus(&self) -> &EventBus {
        &self.inner.bus
    }

    pub fn bridge(&self) -> &Arc<dyn BridgeClient> {
        &self.inner.bridge
    }

    pub fn state(&self) -> EntryState {
        *self.inner.state.borrow()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<EntryState> {
        self.inner.state.subscribe()
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Register devices and build every platform's entities.
    pub async fn setup(&self) -> Result<(), CoreError> {
        let mut platforms = self.inner.platforms.lock().await;
        self.ensure_state(&[EntryState::NotLoaded, EntryState::Unloaded])?;

        let bridge = self.inner.registry.get_or_create(self.inner.mapper.bridge_registration());
        debug!(device_id = %bridge.id, "registered bridge device");

        let mut built = Platforms::default();
        self.setup_buttons(&mut built);
        self.setup_switches(&mut built);

        info!(
            entry_id = %self.inner.config.entry_id,
            buttons = built.buttons.len(),
            leds = built.leds.len(),
            switches = built.switches.len(),
            "config entry loaded"
        );
        *platforms = built;
        self.inner.state.send_replace(EntryState::Loaded);
        Ok(())
    }

    /// Unsubscribe every button and drop every entity.
    ///
    /// Button handles obtained earlier stay usable for commands but no
    /// longer publish events.
    pub async fn unload(&self) -> Result<(), CoreError> {
        let mut platforms = self.inner.platforms.lock().await;
        self.ensure_state(&[EntryState::Loaded])?;
        for button in platforms.buttons.values() {
            button.detach();
        }
        *platforms = Platforms::default();
        self.inner.state.send_replace(EntryState::Unloaded);
        info!(entry_id = %self.inner.config.entry_id, "config entry unloaded");
        Ok(())
    }

    // ── Entities ─────────────────────────────────────────────────

    pub async fn buttons(&self) -> Vec<Arc<KeypadButton>> {
        self.inner.platforms.lock().await.buttons.values().cloned().collect()
    }

    pub async fn leds(&self) -> Vec<Arc<KeypadLed>> {
        self.inner.platforms.lock().await.leds.values().cloned().collect()
    }

    pub async fn switches(&self) -> Vec<Arc<CasetaSwitch>> {
        self.inner.platforms.lock().await.switches.values().cloned().collect()
    }

    /// Every entity, buttons first, in bridge order.
    pub async fn entities(&self) -> Vec<EntityHandle> {
        let platforms = self.inner.platforms.lock().await;
        platforms
            .buttons
            .values()
            .cloned()
            .map(EntityHandle::Button)
            .chain(platforms.leds.values().cloned().map(EntityHandle::Led))
            .chain(platforms.switches.values().cloned().map(EntityHandle::Switch))
            .collect()
    }

    pub async fn descriptors(&self) -> Vec<EntityDescriptor> {
        self.entities()
            .await
            .iter()
            .map(|entity| entity.descriptor().clone())
            .collect()
    }

    pub async fn entity(&self, unique_id: &str) -> Result<EntityHandle, CoreError> {
        let platforms = self.inner.platforms.lock().await;
        platforms
            .buttons
            .get(unique_id)
            .cloned()
            .map(EntityHandle::Button)
            .or_else(|| platforms.leds.get(unique_id).cloned().map(EntityHandle::Led))
            .or_else(|| platforms.switches.get(unique_id).cloned().map(EntityHandle::Switch))
            .ok_or_else(|| CoreError::EntityNotFound {
                unique_id: unique_id.into(),
            })
    }

    /// Press the button entity with this unique id.
    pub async fn press(&self, unique_id: &str) -> Result<(), CoreError> {
        match self.entity(unique_id).await? {
            EntityHandle::Button(button) => button.press().await,
            _ => Err(CoreError::EntityNotFound {
                unique_id: unique_id.into(),
            }),
        }
    }

    /// Switch an LED or switch entity on or off.
    pub async fn set_on(&self, unique_id: &str, on: bool) -> Result<(), CoreError> {
        match self.entity(unique_id).await? {
            EntityHandle::Led(led) if on => led.turn_on().await,
            EntityHandle::Led(led) => led.turn_off().await,
            EntityHandle::Switch(switch) if on => switch.turn_on().await,
            EntityHandle::Switch(switch) => switch.turn_off().await,
            EntityHandle::Button(_) => Err(CoreError::EntityNotFound {
                unique_id: unique_id.into(),
            }),
        }
    }

    /// Devices this entry registered.
    pub fn devices(&self) -> Vec<Arc<DeviceEntry>> {
        self.inner.registry.devices_for_entry(&self.inner.config.entry_id)
    }

    // ── Private helpers ──────────────────────────────────────────

    fn ensure_state(&self, allowed: &[EntryState]) -> Result<(), CoreError> {
        let state = self.state();
        if allowed.contains(&state) {
            Ok(())
        } else {
            Err(CoreError::InvalidState {
                entry_id: self.inner.config.entry_id.clone(),
                state: state.to_string(),
            })
        }
    }

    fn keypad_plans(&self) -> Vec<KeypadPlan> {
        let plans = self
            .inner
            .mapper
            .map_keypads(self.inner.bridge.get_devices_by_domain(DeviceDomain::Keypad));
        for plan in &plans {
            self.inner.registry.get_or_create(plan.registration.clone());
        }
        plans
    }

    /// Button platform: keypad devices plus one press entity per button.
    fn setup_buttons(&self, platforms: &mut Platforms) {
        for plan in self.keypad_plans() {
            for spec in plan.buttons {
                let notifier = ButtonNotifier::new(
                    &spec.button_id,
                    &spec.tree.button_group_id,
                    &spec.tree.keypad_device_id,
                    &self.inner.config.domain,
                    &self.inner.bridge,
                    Arc::clone(&self.inner.registry),
                    self.inner.bus.clone(),
                );
                let button = KeypadButton::new(spec, Arc::clone(&self.inner.bridge), notifier);
                platforms
                    .buttons
                    .insert(button.unique_id().to_owned(), Arc::new(button));
            }
        }
    }

    /// Switch platform: switched loads plus one on/off entity per keypad LED.
    fn setup_switches(&self, platforms: &mut Platforms) {
        for raw in self.inner.bridge.get_devices_by_domain(DeviceDomain::Switch) {
            let plan = self.inner.mapper.map_switch(SwitchDevice::from(raw));
            let switch = CasetaSwitch::new(plan, Arc::clone(&self.inner.bridge));
            platforms
                .switches
                .insert(switch.unique_id().to_owned(), Arc::new(switch));
        }

        for plan in self.keypad_plans() {
            for spec in plan.leds {
                let led = KeypadLed::new(spec, Arc::clone(&self.inner.bridge));
                platforms.leds.insert(led.unique_id().to_owned(), Arc::new(led));
            }
        }
    }
}
