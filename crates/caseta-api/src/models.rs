// Bridge device records
//
// Models for the device listing a Caseta bridge reports. Keypads nest
// button groups, which nest buttons, which may carry an LED sub-record.
// Fields use `#[serde(default)]` liberally because older bridge firmware
// omits whatever it does not know about.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::error::Error;

/// Raw button status the bridge reports when a button goes down.
pub const BUTTON_STATUS_PRESSED: &str = "Press";

/// Raw button status the bridge reports when a button comes back up.
pub const BUTTON_STATUS_RELEASED: &str = "Release";

// ── Domains ──────────────────────────────────────────────────────────

/// Device domain used to group bridge devices by capability.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DeviceDomain {
    Keypad,
    Switch,
    Light,
    Cover,
    Fan,
    Sensor,
    Other,
}

impl DeviceDomain {
    /// Infer the domain from the bridge's device `type` string.
    pub fn from_device_type(device_type: &str) -> Self {
        match device_type {
            "SunnataKeypad"
            | "SunnataKeypad_2Button"
            | "SunnataKeypad_3ButtonRaiseLower"
            | "SunnataKeypad_4Button"
            | "SunnataHybridKeypad"
            | "SeeTouchKeypad"
            | "SeeTouchHybridKeypad"
            | "SeeTouchTabletopKeypad"
            | "HomeownerKeypad"
            | "GrafikTHybridKeypad"
            | "AlisseKeypad"
            | "PalladiomKeypad" => Self::Keypad,
            "WallSwitch" | "OutdoorPlugInSwitch" | "PlugInSwitch" | "InLineSwitch"
            | "PowPakSwitch" | "SunnataSwitch" | "TempInWallPaddleSwitch" | "Switched" => {
                Self::Switch
            }
            "WallDimmer" | "PlugInDimmer" | "InLineDimmer" | "SunnataDimmer"
            | "TempInWallPaddleDimmer" | "WallDimmerWithPreset" | "Dimmed" | "SpectrumTune"
            | "DivaSmartDimmer" => Self::Light,
            "SerenaHoneycombShade" | "SerenaRollerShade" | "TriathlonHoneycombShade"
            | "TriathlonRollerShade" | "QsWirelessShade" | "Shade" => Self::Cover,
            "CasetaFanSpeedController" | "MaestroFanSpeedController" | "FanSpeed" => Self::Fan,
            t if t.starts_with("Pico") => Self::Sensor,
            _ => Self::Other,
        }
    }
}

// ── Bridge ───────────────────────────────────────────────────────────

/// Identity of the bridge itself (parent of every registered keypad).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeInfo {
    #[serde(deserialize_with = "string_or_number")]
    pub serial: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

// ── Devices ──────────────────────────────────────────────────────────

/// One device as the bridge client reports it.
///
/// Keypads carry `button_groups`; switches carry `current_state`. Anything
/// the bridge sends beyond the modelled fields lands in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDevice {
    pub device_id: String,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub serial: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub device_type: String,
    #[serde(default)]
    pub model: Option<String>,
    /// Explicit domain override; inferred from `type` when absent.
    #[serde(default)]
    pub domain: Option<DeviceDomain>,
    #[serde(default)]
    pub area_name: Option<String>,
    #[serde(default)]
    pub control_station_name: Option<String>,
    /// Output level (0-100 for loads, -1 for keypads).
    #[serde(default)]
    pub current_state: Option<i64>,
    #[serde(default)]
    pub button_groups: Option<IndexMap<String, RawButtonGroup>>,
    /// Catch-all for undocumented fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl RawDevice {
    /// The device's domain, honouring an explicit override.
    pub fn domain(&self) -> DeviceDomain {
        self.domain
            .unwrap_or_else(|| DeviceDomain::from_device_type(&self.device_type))
    }

    /// Walk button groups to the button carrying the given LED id.
    /// LED of the button `button_id` in the given group.
    pub(crate) fn led_mut(&mut self, group_id: &str, button_id: &str) -> Option<&mut RawLed> {
        self.button_groups
            .as_mut()?
            .get_mut(group_id)?
            .buttons
            .get_mut(button_id)?
            .led
            .as_mut()
    }

    /// Whether a button with this id lives in the given group.
    pub(crate) fn has_button(&self, group_id: &str, button_id: &str) -> bool {
        self.button_groups
            .as_ref()
            .and_then(|groups| groups.get(group_id))
            .is_some_and(|group| group.buttons.contains_key(button_id))
    }
}

/// Cluster of buttons on one keypad sharing a group id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawButtonGroup {
    pub button_group_id: String,
    #[serde(default)]
    pub buttons: IndexMap<String, RawButton>,
}

/// A single keypad button.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawButton {
    pub device_id: String,
    #[serde(default)]
    pub button_number: Option<u32>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub led: Option<RawLed>,
}

/// Status LED attached to a button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawLed {
    pub led_id: String,
    #[serde(default)]
    pub current_state: i64,
}

// ── Snapshot ─────────────────────────────────────────────────────────

/// Full bridge listing: the bridge identity plus every device it knows.
///
/// ```json
/// { "bridge": { "serial": 1234 }, "devices": [ { "device_id": "1", ... } ] }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeSnapshot {
    pub bridge: BridgeInfo,
    #[serde(default)]
    pub devices: Vec<RawDevice>,
}

impl BridgeSnapshot {
    /// Parse a snapshot from its JSON form.
    pub fn from_json(body: &str) -> Result<Self, Error> {
        serde_json::from_str(body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body: body.to_owned(),
        })
    }

    /// Read and parse a snapshot file.
    pub fn from_path(path: &std::path::Path) -> Result<Self, Error> {
        let body = std::fs::read_to_string(path)?;
        Self::from_json(&body)
    }
}

// ── Helpers ──────────────────────────────────────────────────────────

/// Serials arrive as integers from the bridge but as strings from fixtures.
#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Number(serde_json::Number),
}

impl From<StringOrNumber> for String {
    fn from(value: StringOrNumber) -> Self {
        match value {
            StringOrNumber::String(s) => s,
            StringOrNumber::Number(n) => n.to_string(),
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    StringOrNumber::deserialize(deserializer).map(String::from)
}

fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<StringOrNumber>::deserialize(deserializer).map(|v| v.map(String::from))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn domain_from_device_type() {
        assert_eq!(DeviceDomain::from_device_type("SunnataKeypad"), DeviceDomain::Keypad);
        assert_eq!(DeviceDomain::from_device_type("WallSwitch"), DeviceDomain::Switch);
        assert_eq!(DeviceDomain::from_device_type("WallDimmer"), DeviceDomain::Light);
        assert_eq!(DeviceDomain::from_device_type("Pico3ButtonRaiseLower"), DeviceDomain::Sensor);
        assert_eq!(DeviceDomain::from_device_type("SmartBridge"), DeviceDomain::Other);
    }

    #[test]
    fn domain_string_forms() {
        assert_eq!(DeviceDomain::Keypad.to_string(), "keypad");
        assert_eq!("switch".parse::<DeviceDomain>().unwrap(), DeviceDomain::Switch);
    }

    #[test]
    fn serial_accepts_number_or_string() {
        let device: RawDevice = serde_json::from_str(
            r#"{ "device_id": "2", "serial": 1234567, "type": "WallSwitch" }"#,
        )
        .unwrap();
        assert_eq!(device.serial.as_deref(), Some("1234567"));

        let device: RawDevice = serde_json::from_str(
            r#"{ "device_id": "2", "serial": "abc", "type": "WallSwitch" }"#,
        )
        .unwrap();
        assert_eq!(device.serial.as_deref(), Some("abc"));

        let device: RawDevice =
            serde_json::from_str(r#"{ "device_id": "2", "serial": null }"#).unwrap();
        assert!(device.serial.is_none());
    }

    #[test]
    fn keypad_preserves_button_order() {
        let device: RawDevice = serde_json::from_str(
            r#"{
                "device_id": "10",
                "type": "SunnataKeypad",
                "button_groups": {
                    "200": { "button_group_id": "200", "buttons": {
                        "30": { "device_id": "30", "button_number": 3, "name": "Off" },
                        "21": { "device_id": "21", "button_number": 1, "name": "On",
                                "led": { "led_id": "41", "current_state": 1 } }
                    } }
                }
            }"#,
        )
        .unwrap();

        let group = &device.button_groups.as_ref().unwrap()["200"];
        let ids: Vec<&str> = group.buttons.keys().map(String::as_str).collect();
        assert_eq!(ids, ["30", "21"]);
        assert_eq!(group.buttons["21"].led.as_ref().unwrap().led_id, "41");
        assert!(device.has_button("200", "30"));
        assert!(!device.has_button("201", "30"));
    }

    #[test]
    fn unknown_fields_land_in_extra() {
        let device: RawDevice = serde_json::from_str(
            r#"{ "device_id": "5", "type": "WallSwitch", "zone": "7" }"#,
        )
        .unwrap();
        assert_eq!(device.extra["zone"], "7");
    }

    #[test]
    fn snapshot_parse_error_keeps_body() {
        let err = BridgeSnapshot::from_json("not json").unwrap_err();
        assert!(matches!(err, Error::Deserialization { ref body, .. } if body == "not json"));
    }
}
