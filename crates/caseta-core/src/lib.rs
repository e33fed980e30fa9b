//! Glue between a Caseta bridge client and a home-automation platform.
//!
//! - **[`Integration`]**: One config entry bound to one bridge.
//!   [`setup()`](Integration::setup) registers the bridge and keypad devices,
//!   builds the button and switch platforms, and subscribes every button to
//!   the event bridge. [`unload()`](Integration::unload) tears it all down.
//!
//! - **[`DeviceTreeMapper`]**: Walks the keypad listing (keypad, button
//!   group, button, optional LED) and plans device registrations and
//!   entity descriptors.
//!
//! - **[`ButtonNotifier`]**: Per-button handler that re-resolves the
//!   button's topology on every notification and fires
//!   [`BUTTON_EVENT`] on the [`EventBus`].
//!
//! - **[`DeviceRegistry`]**: Idempotent get-or-create device registry with
//!   snapshot change streams ([`RegistryStream`]).
//!
//! - **Domain model** ([`model`]): Typed keypad/button/LED/switch records
//!   validated from raw bridge records by [`convert`].

pub mod bus;
pub mod config;
pub mod convert;
pub mod entity;
pub mod error;
pub mod events;
pub mod integration;
pub mod mapper;
pub mod model;
pub mod registry;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use bus::{BUTTON_EVENT, BusEvent, EventBus, EventBusReceiver};
pub use config::{DOMAIN, IntegrationConfig, MANUFACTURER, UNASSIGNED_AREA};
pub use entity::{CasetaSwitch, Entity, KeypadButton, KeypadLed, LED_OFF_ICON, LED_ON_ICON};
pub use error::CoreError;
pub use events::ButtonNotifier;
pub use integration::{EntityHandle, EntryState, Integration};
pub use mapper::{ButtonSpec, DeviceTreeMapper, KeypadPlan, LedSpec, SwitchPlan};
pub use registry::{DeviceRegistry, RegistryStream};
pub use stream::{SnapshotStream, SnapshotWatchStream};

pub use model::{
    Button, ButtonAction, ButtonActivity, ButtonGroup, Capability, DeviceEntry, DeviceIdentifier,
    DeviceIdentity, DeviceInfo, DeviceRegistration, DeviceTreeRef, EntityDescriptor, Keypad,
    LedState, Platform, SwitchDevice,
};
