// ── Runtime integration configuration ──
//
// Describes *how* the glue layer names and registers things. Built by the
// binary (via caseta-config) and handed in; core never reads config files.

/// Integration domain used as the identifier namespace.
pub const DOMAIN: &str = "lutron_caseta";

/// Manufacturer recorded on every registered device.
pub const MANUFACTURER: &str = "Lutron Electronics Co., Inc";

/// Area name the bridge reports for devices not placed in a room.
pub const UNASSIGNED_AREA: &str = "Unassigned";

/// Configuration for one config entry (one bridge).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegrationConfig {
    /// Config entry id recorded on every registered device.
    pub entry_id: String,
    /// Identifier namespace for registry identifiers.
    pub domain: String,
    pub manufacturer: String,
    /// Sentinel area name meaning "no room assigned".
    pub unassigned_area: String,
    /// Skip keypads whose area is the unassigned sentinel. When `false`,
    /// they are registered without a suggested area.
    pub skip_unassigned_keypads: bool,
    /// Buffered events per bus subscriber before it lags.
    pub bus_capacity: usize,
}

impl IntegrationConfig {
    /// Whether `area` is the unassigned sentinel (case-insensitive).
    pub fn is_unassigned(&self, area: &str) -> bool {
        area.eq_ignore_ascii_case(&self.unassigned_area)
    }
}

impl Default for IntegrationConfig {
    fn default() -> Self {
        Self {
            entry_id: "caseta".into(),
            domain: DOMAIN.into(),
            manufacturer: MANUFACTURER.into(),
            unassigned_area: UNASSIGNED_AREA.into(),
            skip_unassigned_keypads: true,
            bus_capacity: 256,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unassigned_comparison_ignores_case() {
        let config = IntegrationConfig::default();
        assert!(config.is_unassigned("Unassigned"));
        assert!(config.is_unassigned("unassigned"));
        assert!(!config.is_unassigned("Kitchen"));
    }
}
