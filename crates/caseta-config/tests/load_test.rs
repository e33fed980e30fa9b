#![allow(clippy::unwrap_used)]
// File loading tests against temporary config files.

use std::path::PathBuf;

use pretty_assertions::assert_eq;

use caseta_config::{Config, ConfigError, load_config_from, save_config_to, to_integration_config};

#[test]
fn missing_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(cfg.integration.entry_id, "caseta");
    assert_eq!(cfg.defaults.output, "table");
    assert!(cfg.snapshot.is_none());
}

#[test]
fn file_values_override_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
snapshot = "/var/lib/caseta/bridge.json"

[defaults]
output = "json"

[integration]
entry_id = "home"
skip_unassigned_keypads = false
"#,
    )
    .unwrap();

    let cfg = load_config_from(&path).unwrap();
    assert_eq!(cfg.snapshot, Some(PathBuf::from("/var/lib/caseta/bridge.json")));
    assert_eq!(cfg.defaults.output, "json");

    let integration = to_integration_config(&cfg).unwrap();
    assert_eq!(integration.entry_id, "home");
    assert!(!integration.skip_unassigned_keypads);
    // Untouched keys keep their defaults.
    assert_eq!(integration.unassigned_area, "Unassigned");
    assert_eq!(integration.bus_capacity, 256);
}

#[test]
fn malformed_file_is_a_figment_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[integration]\nbus_capacity = \"lots\"\n").unwrap();

    let err = load_config_from(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Figment(_)));
}

#[test]
fn saved_config_loads_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let mut cfg = Config::default();
    cfg.integration.unassigned_area = "Nowhere".into();
    save_config_to(&cfg, &path).unwrap();

    assert_eq!(load_config_from(&path).unwrap(), cfg);
}
