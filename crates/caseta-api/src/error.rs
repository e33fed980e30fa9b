use thiserror::Error;

/// Top-level error type for the `caseta-api` crate.
///
/// Everything the bridge client can report back to callers. `caseta-core`
/// passes these through untouched when a command fails.
#[derive(Debug, Error)]
pub enum Error {
    // ── Connection ──────────────────────────────────────────────────
    /// The bridge connection is down; commands cannot be delivered.
    #[error("Bridge not connected")]
    NotConnected,

    // ── Commands ────────────────────────────────────────────────────
    /// The addressed device is unknown to the bridge.
    #[error("Device not found on bridge: {device_id}")]
    DeviceNotFound { device_id: String },

    /// The bridge acknowledged the request with a failure status.
    #[error("Bridge rejected {command}: {message}")]
    CommandRejected { command: String, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// Snapshot JSON could not be parsed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    /// Reading a snapshot from disk failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns `true` if reconnecting to the bridge might resolve this error.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::NotConnected)
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::DeviceNotFound { .. })
    }
}
