#![allow(clippy::unwrap_used)]
// End-to-end tests: an `Integration` entry over a `MemoryBridge`.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::json;

use caseta_api::{BridgeClient, BridgeCommand, BridgeSnapshot, MemoryBridge};
use caseta_core::{
    ButtonAction, Capability, CoreError, DeviceIdentifier, Entity, EntityHandle, EntryState,
    Integration, IntegrationConfig, Platform, LED_OFF_ICON, LED_ON_ICON,
};

// ── Helpers ─────────────────────────────────────────────────────────

fn snapshot() -> BridgeSnapshot {
    serde_json::from_value(json!({
        "bridge": { "serial": 1234, "name": "Smart Bridge 2", "model": "L-BDG2-WH" },
        "devices": [
            {
                "device_id": "9", "name": "Porch", "type": "WallSwitch",
                "model": "PD-5ANS", "serial": 5555, "area_name": "Outside",
                "current_state": 0
            },
            {
                "device_id": "10", "name": "Keypad 1", "type": "SunnataKeypad",
                "model": "RRST-W4B-XX", "serial": 6666, "area_name": "Kitchen",
                "control_station_name": "Entry", "current_state": -1,
                "button_groups": {
                    "100": { "button_group_id": "100", "buttons": {
                        "101": { "device_id": "101", "button_number": 1, "name": "Welcome",
                                 "led": { "led_id": "111", "current_state": 0 } },
                        "102": { "device_id": "102", "button_number": 2, "name": "Goodnight",
                                 "led": { "led_id": "112", "current_state": 1 } },
                        "103": { "device_id": "103", "button_number": 3, "name": "Raise" }
                    } }
                }
            },
            {
                "device_id": "20", "name": "Keypad 2", "type": "SunnataKeypad",
                "model": "RRST-W4B-XX", "area_name": "Unassigned",
                "control_station_name": "Garage",
                "button_groups": {
                    "200": { "button_group_id": "200", "buttons": {
                        "201": { "device_id": "201", "button_number": 1, "name": "Open" }
                    } }
                }
            },
            {
                "device_id": "30", "name": "Keypad 3", "type": "SeeTouchKeypad",
                "model": "HQR-T10RL",
                "button_groups": {
                    "300": { "button_group_id": "300", "buttons": {
                        "301": { "device_id": "301", "button_number": 1, "name": "Scene" }
                    } }
                }
            }
        ]
    }))
    .unwrap()
}

fn setup_with(config: IntegrationConfig) -> (Arc<MemoryBridge>, Integration) {
    let bridge = Arc::new(MemoryBridge::from_snapshot(snapshot()));
    let client: Arc<dyn BridgeClient> = bridge.clone();
    (bridge, Integration::standalone(config, client))
}

async fn loaded() -> (Arc<MemoryBridge>, Integration) {
    let (bridge, integration) = setup_with(IntegrationConfig::default());
    integration.setup().await.unwrap();
    (bridge, integration)
}

fn keypad_identifier(keypad_id: &str) -> DeviceIdentifier {
    DeviceIdentifier::new("lutron_caseta", format!("1234_{keypad_id}"))
}

// ── Device tree mapping ─────────────────────────────────────────────

#[tokio::test]
async fn keypad_with_area_registers_once_with_suggested_area() {
    let (_bridge, integration) = loaded().await;
    let registry = integration.registry();

    // Bridge plus one keypad.
    assert_eq!(registry.len(), 2);

    let keypad = registry.get_device(&keypad_identifier("10")).unwrap();
    assert_eq!(keypad.name, "Entry Keypad 1");
    assert_eq!(keypad.manufacturer, "Lutron Electronics Co., Inc");
    assert_eq!(keypad.model.as_deref(), Some("RRST-W4B-XX (SunnataKeypad)"));
    assert_eq!(keypad.suggested_area.as_deref(), Some("Kitchen"));
    assert!(keypad.config_entries.contains("caseta"));

    let bridge = registry
        .get_device(&DeviceIdentifier::new("lutron_caseta", "1234"))
        .unwrap();
    assert_eq!(keypad.via_device_id.as_deref(), Some(bridge.id.as_str()));
    assert_eq!(bridge.name, "Smart Bridge 2");
}

#[tokio::test]
async fn unassigned_and_legacy_keypads_produce_nothing() {
    let (_bridge, integration) = loaded().await;

    assert!(integration.registry().get_device(&keypad_identifier("20")).is_none());
    assert!(integration.registry().get_device(&keypad_identifier("30")).is_none());

    let ids: Vec<String> = integration
        .descriptors()
        .await
        .into_iter()
        .map(|d| d.unique_id)
        .collect();
    assert!(!ids.iter().any(|id| id == "1234_201" || id == "1234_301"));
}

#[tokio::test]
async fn unassigned_keypads_register_without_area_when_enabled() {
    let config = IntegrationConfig {
        skip_unassigned_keypads: false,
        ..IntegrationConfig::default()
    };
    let (_bridge, integration) = setup_with(config);
    integration.setup().await.unwrap();

    let garage = integration.registry().get_device(&keypad_identifier("20")).unwrap();
    assert!(garage.suggested_area.is_none());
    assert_eq!(integration.buttons().await.len(), 4);
    // Legacy keypad without an area is still skipped.
    assert!(integration.registry().get_device(&keypad_identifier("30")).is_none());
}

#[tokio::test]
async fn one_entity_per_button_and_per_led() {
    let (_bridge, integration) = loaded().await;

    let buttons: Vec<String> = integration
        .buttons()
        .await
        .iter()
        .map(|b| b.descriptor().name.clone())
        .collect();
    assert_eq!(
        buttons,
        vec![
            "Kitchen Entry Keypad 1 Welcome".to_owned(),
            "Kitchen Entry Keypad 1 Goodnight".to_owned(),
            "Kitchen Entry Keypad 1 Raise".to_owned(),
        ]
    );

    let leds = integration.leds().await;
    assert_eq!(leds.len(), 2);
    assert_eq!(leds[0].descriptor().name, "Kitchen Entry Keypad 1 Welcome LED");
    assert_eq!(leds[0].descriptor().unique_id, "1234_111");
    assert_eq!(leds[0].descriptor().platform, Platform::Switch);
    assert_eq!(leds[0].descriptor().capability, Capability::OnOff);

    let switches = integration.switches().await;
    assert_eq!(switches.len(), 1);
    assert_eq!(switches[0].descriptor().unique_id, "5555");
}

#[tokio::test]
async fn registration_is_idempotent_across_setups() {
    let (_bridge, integration) = loaded().await;
    let first = integration.registry().get_device(&keypad_identifier("10")).unwrap();
    let version = integration.registry().version();

    integration.unload().await.unwrap();
    integration.setup().await.unwrap();

    let second = integration.registry().get_device(&keypad_identifier("10")).unwrap();
    assert_eq!(first.id, second.id);
    assert_eq!(integration.registry().len(), 2);
    assert_eq!(integration.registry().version(), version);
}

// ── Event bridge ────────────────────────────────────────────────────

#[tokio::test]
async fn press_and_release_are_published_with_keypad_fields() {
    let (bridge, integration) = loaded().await;
    let mut rx = integration.bus().subscribe();

    assert_eq!(bridge.emit_button_event("101", "Press"), 1);
    assert_eq!(bridge.emit_button_event("101", "Release"), 1);

    let press = rx.try_recv().unwrap();
    assert_eq!(press.event_type, "lutron_caseta_button_event");
    let data = &press.data;
    assert_eq!(data.action, ButtonAction::Press);
    assert_eq!(data.serial.as_deref(), Some("6666"));
    assert_eq!(data.device_type, "SunnataKeypad");
    assert_eq!(data.model, "RRST-W4B-XX");
    assert_eq!(data.button_number, Some(1));
    assert_eq!(data.device_name, "Entry");
    assert_eq!(data.keypad_id, "10");
    assert_eq!(data.button_name, "Welcome");
    assert_eq!(data.button_id, "101");
    assert_eq!(data.area_name.as_deref(), Some("Kitchen"));

    let keypad = integration.registry().get_device(&keypad_identifier("10")).unwrap();
    assert_eq!(data.device_id.as_deref(), Some(keypad.id.as_str()));

    assert_eq!(rx.try_recv().unwrap().data.action, ButtonAction::Release);
    assert!(rx.try_recv().is_none());
}

#[tokio::test]
async fn any_other_status_is_a_release() {
    let (bridge, integration) = loaded().await;
    let mut rx = integration.bus().subscribe();

    bridge.emit_button_event("102", "DoubleTap");
    assert_eq!(rx.try_recv().unwrap().data.action, ButtonAction::Release);
}

#[tokio::test]
async fn vanished_keypad_drops_event() {
    let (bridge, integration) = loaded().await;
    let mut rx = integration.bus().subscribe();

    bridge.remove_device("10");
    assert_eq!(bridge.emit_button_event("101", "Press"), 1);
    assert!(rx.try_recv().is_none());
}

#[tokio::test]
async fn unregistered_keypad_publishes_without_device_id() {
    let (bridge, integration) = loaded().await;
    let mut rx = integration.bus().subscribe();

    let keypad = integration.registry().get_device(&keypad_identifier("10")).unwrap();
    integration.registry().remove(&keypad.id);

    bridge.emit_button_event("101", "Press");
    let event = rx.try_recv().unwrap();
    assert!(event.data.device_id.is_none());
    assert_eq!(event.data.button_id, "101");
}

#[tokio::test]
async fn unload_unsubscribes_every_button() {
    let (bridge, integration) = loaded().await;
    assert_eq!(bridge.subscriber_count("101"), 1);

    integration.unload().await.unwrap();
    assert_eq!(integration.state(), EntryState::Unloaded);
    assert_eq!(bridge.subscriber_count("101"), 0);
    assert_eq!(bridge.emit_button_event("101", "Press"), 0);
    assert!(integration.entities().await.is_empty());
}

#[tokio::test]
async fn held_button_handles_go_quiet_after_unload() {
    let (bridge, integration) = loaded().await;
    let buttons = integration.buttons().await;
    let mut rx = integration.bus().subscribe();
    assert!(buttons.iter().all(|b| b.is_subscribed()));

    integration.unload().await.unwrap();
    assert!(buttons.iter().all(|b| !b.is_subscribed()));
    assert_eq!(bridge.subscriber_count("101"), 0);
    assert_eq!(bridge.emit_button_event("101", "Press"), 0);
    assert!(rx.try_recv().is_none());

    // Commands still reach the bridge through a held handle.
    buttons[0].press().await.unwrap();
    assert_eq!(bridge.commands().len(), 1);
}

// ── Commands and state ──────────────────────────────────────────────

#[tokio::test]
async fn press_taps_captured_triple_once() {
    let (bridge, integration) = loaded().await;

    integration.press("1234_102").await.unwrap();
    assert_eq!(
        bridge.commands(),
        vec![BridgeCommand::TapButton {
            keypad_id: "10".into(),
            group_id: "100".into(),
            button_id: "102".into(),
        }]
    );
}

#[tokio::test]
async fn led_state_tracks_bridge() {
    let (bridge, integration) = loaded().await;
    let EntityHandle::Led(led) = integration.entity("1234_111").await.unwrap() else {
        panic!("expected an LED entity");
    };
    assert!(!led.is_on());
    assert_eq!(led.icon(), LED_OFF_ICON);

    integration.set_on("1234_111", true).await.unwrap();
    assert!(led.is_on());
    assert_eq!(led.icon(), LED_ON_ICON);
    assert_eq!(
        bridge.commands(),
        vec![BridgeCommand::TurnLedOn {
            keypad_id: "10".into(),
            group_id: "100".into(),
            button_id: "101".into(),
        }]
    );

    integration.set_on("1234_111", false).await.unwrap();
    assert!(!led.is_on());
}

#[tokio::test]
async fn led_commands_address_the_owning_button() {
    let (bridge, integration) = loaded().await;
    integration.set_on("1234_112", false).await.unwrap();

    assert_eq!(
        bridge.commands(),
        vec![BridgeCommand::TurnLedOff {
            keypad_id: "10".into(),
            group_id: "100".into(),
            button_id: "102".into(),
        }]
    );
    assert_eq!(integration.entity("1234_112").await.unwrap().is_on(), Some(false));
}

#[tokio::test]
async fn switch_state_tracks_bridge() {
    let (_bridge, integration) = loaded().await;
    let switch = integration.entity("5555").await.unwrap();
    assert_eq!(switch.is_on(), Some(false));

    integration.set_on("5555", true).await.unwrap();
    assert_eq!(switch.is_on(), Some(true));

    integration.set_on("5555", false).await.unwrap();
    assert_eq!(switch.is_on(), Some(false));
}

#[tokio::test]
async fn command_failures_pass_through() {
    let (bridge, integration) = loaded().await;
    bridge.reject_commands(Some("busy".into()));

    let err = integration.press("1234_101").await.unwrap_err();
    assert!(matches!(err, CoreError::Bridge(_)));
    assert_eq!(err.to_string(), "Bridge rejected tap_button: busy");

    bridge.set_connected(false);
    let err = integration.set_on("5555", true).await.unwrap_err();
    assert_eq!(err.to_string(), caseta_api::Error::NotConnected.to_string());
}

#[tokio::test]
async fn unknown_entities_are_reported() {
    let (_bridge, integration) = loaded().await;
    let err = integration.press("1234_999").await.unwrap_err();
    assert!(matches!(err, CoreError::EntityNotFound { ref unique_id } if unique_id == "1234_999"));

    // A switch cannot be pressed, a button cannot be switched.
    assert!(integration.press("5555").await.is_err());
    assert!(integration.set_on("1234_101", true).await.is_err());
}

// ── Lifecycle ───────────────────────────────────────────────────────

#[tokio::test]
async fn entry_state_transitions() {
    let (_bridge, integration) = setup_with(IntegrationConfig::default());
    let mut states = integration.subscribe_state();
    assert_eq!(integration.state(), EntryState::NotLoaded);

    let err = integration.unload().await.unwrap_err();
    assert!(matches!(err, CoreError::InvalidState { .. }));

    integration.setup().await.unwrap();
    states.changed().await.unwrap();
    assert_eq!(*states.borrow_and_update(), EntryState::Loaded);
    assert!(integration.setup().await.is_err());

    integration.unload().await.unwrap();
    assert_eq!(integration.state(), EntryState::Unloaded);
}

#[tokio::test]
async fn lifecycle_without_state_observers() {
    let (bridge, integration) = setup_with(IntegrationConfig::default());
    assert_eq!(integration.state(), EntryState::NotLoaded);

    integration.setup().await.unwrap();
    assert_eq!(integration.state(), EntryState::Loaded);
    let err = integration.setup().await.unwrap_err();
    assert!(matches!(err, CoreError::InvalidState { ref state, .. } if state == "loaded"));
    assert_eq!(bridge.subscriber_count("101"), 1);

    integration.unload().await.unwrap();
    assert_eq!(integration.state(), EntryState::Unloaded);
    assert_eq!(bridge.subscriber_count("101"), 0);

    integration.setup().await.unwrap();
    assert_eq!(integration.state(), EntryState::Loaded);
    assert_eq!(bridge.subscriber_count("101"), 1);
}

#[tokio::test]
async fn registry_stream_sees_registrations() {
    let (_bridge, integration) = setup_with(IntegrationConfig::default());
    let mut stream = integration.registry().subscribe();
    assert!(stream.current().is_empty());

    integration.setup().await.unwrap();
    let latest = stream.latest();
    assert_eq!(latest.len(), 2);
    assert_eq!(integration.devices().len(), 2);
    assert!(stream.changed().await.is_some());
}
