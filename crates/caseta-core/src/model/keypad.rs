// ── Keypad and switch domain types ──

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A keypad (control station) with its button groups, in bridge order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keypad {
    pub device_id: String,
    pub serial: Option<String>,
    pub name: String,
    pub model: String,
    pub device_type: String,
    /// `None` for the legacy keypad family that predates area assignment.
    pub area_name: Option<String>,
    pub control_station_name: String,
    pub button_groups: IndexMap<String, ButtonGroup>,
}

impl Keypad {
    /// Model string shown in the registry: `"{model} ({type})"`.
    pub fn model_string(&self) -> String {
        format!("{} ({})", self.model, self.device_type)
    }

    pub fn group(&self, group_id: &str) -> Result<&ButtonGroup, CoreError> {
        self.button_groups
            .get(group_id)
            .ok_or_else(|| CoreError::ButtonGroupNotFound {
                keypad_id: self.device_id.clone(),
                group_id: group_id.into(),
            })
    }

    /// Resolve a button through its group.
    pub fn button(&self, group_id: &str, button_id: &str) -> Result<&Button, CoreError> {
        self.group(group_id)?.button(button_id)
    }

    /// Iterate `(group, button)` pairs in bridge order.
    pub fn buttons(&self) -> impl Iterator<Item = (&ButtonGroup, &Button)> {
        self.button_groups
            .values()
            .flat_map(|group| group.buttons.values().map(move |button| (group, button)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ButtonGroup {
    pub button_group_id: String,
    pub buttons: IndexMap<String, Button>,
}

impl ButtonGroup {
    pub fn button(&self, button_id: &str) -> Result<&Button, CoreError> {
        self.buttons
            .get(button_id)
            .ok_or_else(|| CoreError::ButtonNotFound {
                group_id: self.button_group_id.clone(),
                button_id: button_id.into(),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Button {
    pub device_id: String,
    pub button_number: Option<u32>,
    pub name: String,
    pub led: Option<LedState>,
}

/// Status LED paired 1:1 with a button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedState {
    pub led_id: String,
    pub current_state: i64,
}

impl LedState {
    pub fn is_on(&self) -> bool {
        self.current_state > 0
    }
}

/// An on/off load (wall switch, plug-in switch, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchDevice {
    pub device_id: String,
    pub serial: Option<String>,
    pub name: String,
    pub model: String,
    pub device_type: String,
    pub area_name: Option<String>,
    pub current_state: i64,
}

impl SwitchDevice {
    pub fn is_on(&self) -> bool {
        self.current_state > 0
    }

    pub fn model_string(&self) -> String {
        format!("{} ({})", self.model, self.device_type)
    }
}
