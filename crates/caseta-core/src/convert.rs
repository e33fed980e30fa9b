// ── Bridge-to-domain record conversions ──
//
// Validates raw `caseta_api` device records into the typed model. Keypads
// must carry their button groups and every nested id must agree with the
// key it is filed under; loads fall back to sensible defaults.

use indexmap::IndexMap;

use caseta_api::{RawButton, RawButtonGroup, RawDevice, RawLed};

use crate::error::CoreError;
use crate::model::{Button, ButtonGroup, Keypad, LedState, SwitchDevice};

// ── Helpers ────────────────────────────────────────────────────────

fn invalid(device_id: &str, message: impl Into<String>) -> CoreError {
    CoreError::ValidationFailed {
        device_id: device_id.into(),
        message: message.into(),
    }
}

/// Treat empty strings from the bridge as missing.
fn non_empty(raw: Option<String>) -> Option<String> {
    raw.filter(|s| !s.trim().is_empty())
}

fn convert_led(raw: RawLed) -> LedState {
    LedState {
        led_id: raw.led_id,
        current_state: raw.current_state,
    }
}

fn convert_button(keypad_id: &str, key: &str, raw: RawButton) -> Result<Button, CoreError> {
    if raw.device_id != key {
        return Err(invalid(
            keypad_id,
            format!("button filed under {key} reports id {}", raw.device_id),
        ));
    }
    Ok(Button {
        device_id: raw.device_id,
        button_number: raw.button_number,
        name: raw.name,
        led: raw.led.map(convert_led),
    })
}

fn convert_group(keypad_id: &str, key: &str, raw: RawButtonGroup) -> Result<ButtonGroup, CoreError> {
    if raw.button_group_id != key {
        return Err(invalid(
            keypad_id,
            format!("button group filed under {key} reports id {}", raw.button_group_id),
        ));
    }
    let buttons = raw
        .buttons
        .into_iter()
        .map(|(id, button)| {
            let converted = convert_button(keypad_id, &id, button)?;
            Ok((id, converted))
        })
        .collect::<Result<IndexMap<_, _>, CoreError>>()?;
    Ok(ButtonGroup {
        button_group_id: raw.button_group_id,
        buttons,
    })
}

// ── Keypad ─────────────────────────────────────────────────────────

impl TryFrom<RawDevice> for Keypad {
    type Error = CoreError;

    fn try_from(raw: RawDevice) -> Result<Self, Self::Error> {
        let device_id = raw.device_id;
        let groups = raw
            .button_groups
            .ok_or_else(|| invalid(&device_id, "keypad has no button groups"))?;

        let button_groups = groups
            .into_iter()
            .map(|(id, group)| {
                let converted = convert_group(&device_id, &id, group)?;
                Ok((id, converted))
            })
            .collect::<Result<IndexMap<_, _>, CoreError>>()?;

        Ok(Keypad {
            serial: raw.serial,
            name: raw.name,
            model: raw.model.unwrap_or_default(),
            device_type: raw.device_type,
            area_name: non_empty(raw.area_name),
            control_station_name: raw.control_station_name.unwrap_or_default(),
            button_groups,
            device_id,
        })
    }
}

// ── Switch ─────────────────────────────────────────────────────────

impl From<RawDevice> for SwitchDevice {
    fn from(raw: RawDevice) -> Self {
        SwitchDevice {
            device_id: raw.device_id,
            serial: raw.serial,
            name: raw.name,
            model: raw.model.unwrap_or_default(),
            device_type: raw.device_type,
            area_name: non_empty(raw.area_name),
            current_state: raw.current_state.unwrap_or(0),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw_keypad(value: serde_json::Value) -> RawDevice {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn keypad_converts_nested_records() {
        let raw = raw_keypad(json!({
            "device_id": "10",
            "name": "Keypad",
            "type": "SunnataKeypad",
            "model": "RRST-W4B-XX",
            "area_name": "Kitchen",
            "control_station_name": "Entry",
            "button_groups": {
                "100": { "button_group_id": "100", "buttons": {
                    "101": { "device_id": "101", "button_number": 1, "name": "Welcome",
                             "led": { "led_id": "111", "current_state": 1 } },
                    "102": { "device_id": "102", "button_number": 2, "name": "Goodnight" }
                } }
            }
        }));

        let keypad = Keypad::try_from(raw).unwrap();
        assert_eq!(keypad.model_string(), "RRST-W4B-XX (SunnataKeypad)");
        assert_eq!(keypad.area_name.as_deref(), Some("Kitchen"));

        let welcome = keypad.button("100", "101").unwrap();
        assert!(welcome.led.as_ref().unwrap().is_on());
        assert!(keypad.button("100", "102").unwrap().led.is_none());
        assert_eq!(keypad.buttons().count(), 2);
    }

    #[test]
    fn keypad_without_groups_is_rejected() {
        let raw = raw_keypad(json!({ "device_id": "10", "type": "SunnataKeypad" }));
        let err = Keypad::try_from(raw).unwrap_err();
        assert!(matches!(err, CoreError::ValidationFailed { ref device_id, .. } if device_id == "10"));
    }

    #[test]
    fn mismatched_button_key_is_rejected() {
        let raw = raw_keypad(json!({
            "device_id": "10",
            "button_groups": {
                "100": { "button_group_id": "100", "buttons": {
                    "101": { "device_id": "999", "name": "Welcome" }
                } }
            }
        }));
        assert!(Keypad::try_from(raw).is_err());
    }

    #[test]
    fn blank_area_counts_as_missing() {
        let raw = raw_keypad(json!({
            "device_id": "10",
            "area_name": "  ",
            "button_groups": {}
        }));
        assert!(Keypad::try_from(raw).unwrap().area_name.is_none());
    }

    #[test]
    fn lookup_misses_name_the_missing_piece() {
        let raw = raw_keypad(json!({
            "device_id": "10",
            "button_groups": {
                "100": { "button_group_id": "100", "buttons": {} }
            }
        }));
        let keypad = Keypad::try_from(raw).unwrap();

        let err = keypad.button("200", "101").unwrap_err();
        assert!(matches!(err, CoreError::ButtonGroupNotFound { .. }));
        let err = keypad.button("100", "101").unwrap_err();
        assert!(matches!(err, CoreError::ButtonNotFound { .. }));
        assert!(err.is_topology_miss());
    }

    #[test]
    fn switch_defaults_missing_level_to_off() {
        let raw = raw_keypad(json!({
            "device_id": "9",
            "name": "Porch",
            "type": "WallSwitch",
            "model": "PD-5ANS"
        }));
        let switch = SwitchDevice::from(raw);
        assert!(!switch.is_on());
        assert_eq!(switch.model_string(), "PD-5ANS (WallSwitch)");
    }
}
