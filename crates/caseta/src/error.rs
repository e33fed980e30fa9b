//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` variants into user-facing errors with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use caseta_config::ConfigError;
use caseta_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Snapshot ─────────────────────────────────────────────────────

    #[error("No bridge snapshot configured")]
    #[diagnostic(
        code(caseta::no_snapshot),
        help(
            "Pass one with --snapshot, set CASETA_SNAPSHOT, or add\n\
             snapshot = \"/path/to/bridge.json\" to {path}"
        )
    )]
    NoSnapshot { path: String },

    #[error("Could not load bridge snapshot {path}")]
    #[diagnostic(code(caseta::snapshot))]
    Snapshot {
        path: String,
        #[source]
        source: caseta_api::Error,
    },

    // ── Bridge ───────────────────────────────────────────────────────

    #[error("Bridge command failed: {0}")]
    #[diagnostic(
        code(caseta::bridge),
        help("The bridge refused or could not carry out the command.")
    )]
    Bridge(#[source] caseta_api::Error),

    // ── Resources ────────────────────────────────────────────────────

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(caseta::not_found),
        help("Run: caseta {list_command} to see what is available")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("Entity '{unique_id}' does not support {operation}")]
    #[diagnostic(
        code(caseta::unsupported),
        help("Buttons can only be pressed; LEDs and switches can only be set on or off.")
    )]
    Unsupported { unique_id: String, operation: String },

    // ── Integration ──────────────────────────────────────────────────

    #[error("Integration error: {0}")]
    #[diagnostic(code(caseta::integration))]
    Integration(#[source] CoreError),

    // ── Configuration ────────────────────────────────────────────────

    #[error(transparent)]
    #[diagnostic(code(caseta::config))]
    Config(#[from] ConfigError),

    // ── IO / Serialization ───────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NoSnapshot { .. } | Self::Config(_) | Self::Unsupported { .. } => {
                exit_code::USAGE
            }
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Bridge(e) if e.is_transient() => exit_code::CONNECTION,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Bridge(e) => CliError::Bridge(e),

            CoreError::EntityNotFound { unique_id } => CliError::NotFound {
                resource_type: "entity".into(),
                identifier: unique_id,
                list_command: "entities".into(),
            },

            CoreError::KeypadNotFound { keypad_id } => CliError::NotFound {
                resource_type: "keypad".into(),
                identifier: keypad_id,
                list_command: "devices".into(),
            },

            other => CliError::Integration(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_exit_code() {
        let err = CliError::from(CoreError::EntityNotFound {
            unique_id: "1234_9".into(),
        });
        assert_eq!(err.exit_code(), exit_code::NOT_FOUND);
        assert_eq!(err.to_string(), "entity '1234_9' not found");
    }

    #[test]
    fn disconnected_bridge_is_a_connection_error() {
        let err = CliError::from(CoreError::Bridge(caseta_api::Error::NotConnected));
        assert_eq!(err.exit_code(), exit_code::CONNECTION);
    }
}
