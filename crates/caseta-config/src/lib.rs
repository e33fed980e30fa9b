//! Configuration for the Caseta integration.
//!
//! TOML file plus `CASETA_` environment overrides, and translation to
//! `caseta_core::IntegrationConfig`.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use caseta_core::{DOMAIN, IntegrationConfig, MANUFACTURER, UNASSIGNED_AREA};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Bridge snapshot JSON the simulator loads when none is given on the command line.
    pub snapshot: Option<PathBuf>,

    #[serde(default)]
    pub defaults: Defaults,

    #[serde(default)]
    pub integration: IntegrationSection,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}

/// `[integration]` table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct IntegrationSection {
    #[serde(default = "default_entry_id")]
    pub entry_id: String,

    #[serde(default = "default_domain")]
    pub domain: String,

    #[serde(default = "default_manufacturer")]
    pub manufacturer: String,

    /// Area name the bridge uses for devices without a room.
    #[serde(default = "default_unassigned_area")]
    pub unassigned_area: String,

    #[serde(default = "default_true")]
    pub skip_unassigned_keypads: bool,

    #[serde(default = "default_bus_capacity")]
    pub bus_capacity: usize,
}

impl Default for IntegrationSection {
    fn default() -> Self {
        Self {
            entry_id: default_entry_id(),
            domain: default_domain(),
            manufacturer: default_manufacturer(),
            unassigned_area: default_unassigned_area(),
            skip_unassigned_keypads: true,
            bus_capacity: default_bus_capacity(),
        }
    }
}

fn default_entry_id() -> String {
    "caseta".into()
}
fn default_domain() -> String {
    DOMAIN.into()
}
fn default_manufacturer() -> String {
    MANUFACTURER.into()
}
fn default_unassigned_area() -> String {
    UNASSIGNED_AREA.into()
}
fn default_true() -> bool {
    true
}
fn default_bus_capacity() -> usize {
    256
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "caseta", "caseta").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("caseta");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file + environment. A missing file yields defaults.
///
/// Nested keys use a double underscore, e.g.
/// `CASETA_INTEGRATION__SKIP_UNASSIGNED_KEYPADS=false`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("CASETA_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if anything goes wrong.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Translation ─────────────────────────────────────────────────────

/// Validate the `[integration]` table into a core `IntegrationConfig`.
pub fn to_integration_config(cfg: &Config) -> Result<IntegrationConfig, ConfigError> {
    let section = &cfg.integration;
    for (field, value) in [
        ("integration.entry_id", &section.entry_id),
        ("integration.domain", &section.domain),
        ("integration.unassigned_area", &section.unassigned_area),
    ] {
        if value.trim().is_empty() {
            return Err(ConfigError::Validation {
                field: field.into(),
                reason: "must not be empty".into(),
            });
        }
    }
    if section.bus_capacity == 0 {
        return Err(ConfigError::Validation {
            field: "integration.bus_capacity".into(),
            reason: "must be at least 1".into(),
        });
    }

    Ok(IntegrationConfig {
        entry_id: section.entry_id.clone(),
        domain: section.domain.clone(),
        manufacturer: section.manufacturer.clone(),
        unassigned_area: section.unassigned_area.clone(),
        skip_unassigned_keypads: section.skip_unassigned_keypads,
        bus_capacity: section.bus_capacity,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_core_defaults() {
        let core = to_integration_config(&Config::default()).unwrap();
        assert_eq!(core, IntegrationConfig::default());
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let mut cfg = Config::default();
        cfg.integration.bus_capacity = 0;
        let err = to_integration_config(&cfg).unwrap_err();
        assert!(err.to_string().contains("bus_capacity"));
    }

    #[test]
    fn blank_entry_id_is_rejected() {
        let mut cfg = Config::default();
        cfg.integration.entry_id = "  ".into();
        assert!(matches!(
            to_integration_config(&cfg),
            Err(ConfigError::Validation { ref field, .. }) if field == "integration.entry_id"
        ));
    }
}
