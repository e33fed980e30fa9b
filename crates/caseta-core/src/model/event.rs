// ── Button activity events ──

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use caseta_api::BUTTON_STATUS_PRESSED;

/// Coarse button action published on the bus.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ButtonAction {
    Press,
    Release,
}

impl ButtonAction {
    /// Binary classification: the pressed sentinel is a press, anything else a release.
    pub fn from_status(raw: &str) -> Self {
        if raw == BUTTON_STATUS_PRESSED {
            Self::Press
        } else {
            Self::Release
        }
    }
}

/// Payload of one button event; the field set is fixed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonActivity {
    pub serial: Option<String>,
    #[serde(rename = "type")]
    pub device_type: String,
    pub model: String,
    pub button_number: Option<u32>,
    /// Control station name of the keypad.
    pub device_name: String,
    pub keypad_id: String,
    pub button_name: String,
    pub button_id: String,
    /// Registry id of the owning keypad device, absent if the lookup missed.
    pub device_id: Option<String>,
    pub area_name: Option<String>,
    pub action: ButtonAction,
}
