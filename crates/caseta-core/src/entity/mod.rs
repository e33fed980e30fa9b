// ── Platform entities ──
//
// Live entity objects built from mapper specs. Each holds the bridge
// client and reads state from it on demand.

mod button;
mod led;
mod switch;

pub use button::KeypadButton;
pub use led::{KeypadLed, LED_OFF_ICON, LED_ON_ICON};
pub use switch::CasetaSwitch;

use crate::model::EntityDescriptor;

/// Common surface of every entity the integration exposes.
pub trait Entity: Send + Sync {
    fn descriptor(&self) -> &EntityDescriptor;

    fn unique_id(&self) -> &str {
        &self.descriptor().unique_id
    }

    fn name(&self) -> &str {
        &self.descriptor().name
    }
}
