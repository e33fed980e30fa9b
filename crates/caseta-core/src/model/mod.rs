// ── Typed domain model ──
//
// Every type in this module is the validated form of something the bridge
// reports, or something the glue layer hands to the host platform.

pub mod entity;
pub mod event;
pub mod identity;
pub mod keypad;
pub mod registry;

// ── Re-exports ──────────────────────────────────────────────────────

pub use entity::{Capability, DeviceInfo, EntityDescriptor, Platform};
pub use event::{ButtonAction, ButtonActivity};
pub use identity::{DeviceIdentifier, DeviceIdentity, DeviceTreeRef};
pub use keypad::{Button, ButtonGroup, Keypad, LedState, SwitchDevice};
pub use registry::{DeviceEntry, DeviceRegistration};
