// caseta-api: Bridge-client boundary for Lutron Caseta keypads, switches and LEDs.

pub mod client;
pub mod error;
pub mod memory;
pub mod models;

pub use client::{BridgeClient, ButtonCallback, ButtonSubscription};
pub use error::Error;
pub use memory::{BridgeCommand, MemoryBridge};
pub use models::{
    BUTTON_STATUS_PRESSED, BUTTON_STATUS_RELEASED, BridgeInfo, BridgeSnapshot, DeviceDomain,
    RawButton, RawButtonGroup, RawDevice, RawLed,
};
