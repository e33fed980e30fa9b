// ── Device registry ──

mod collection;
mod device_registry;

pub use device_registry::DeviceRegistry;

/// Change feed over the registry's device snapshots.
pub type RegistryStream = crate::stream::SnapshotStream<crate::model::DeviceEntry>;
