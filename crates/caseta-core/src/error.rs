// ── Core error types ──
//
// Errors surfaced by the glue layer. Bridge command failures pass through
// untouched; everything else describes a topology or lifecycle problem.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Bridge errors (propagated verbatim) ──────────────────────────
    #[error(transparent)]
    Bridge(#[from] caseta_api::Error),

    #[error("Bridge client is no longer available")]
    BridgeUnavailable,

    // ── Topology errors ──────────────────────────────────────────────
    #[error("Keypad not found: {keypad_id}")]
    KeypadNotFound { keypad_id: String },

    #[error("Button group {group_id} not found on keypad {keypad_id}")]
    ButtonGroupNotFound { keypad_id: String, group_id: String },

    #[error("Button {button_id} not found in group {group_id}")]
    ButtonNotFound { group_id: String, button_id: String },

    #[error("Invalid record for device {device_id}: {message}")]
    ValidationFailed { device_id: String, message: String },

    // ── Entity / lifecycle errors ────────────────────────────────────
    #[error("Entity not found: {unique_id}")]
    EntityNotFound { unique_id: String },

    #[error("Config entry {entry_id} is {state}")]
    InvalidState { entry_id: String, state: String },
}

impl CoreError {
    /// Returns `true` when the error came from a missing keypad, group or button.
    pub fn is_topology_miss(&self) -> bool {
        matches!(
            self,
            Self::KeypadNotFound { .. }
                | Self::ButtonGroupNotFound { .. }
                | Self::ButtonNotFound { .. }
        )
    }
}
