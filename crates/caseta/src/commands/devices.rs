//! Device listing.

use std::sync::Arc;

use tabled::Tabled;

use caseta_core::DeviceEntry;

use super::Context;
use crate::output;

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Model")]
    model: String,
    #[tabled(rename = "Area")]
    area: String,
    #[tabled(rename = "Identifiers")]
    identifiers: String,
    #[tabled(rename = "Via")]
    via: String,
}

impl From<&Arc<DeviceEntry>> for DeviceRow {
    fn from(d: &Arc<DeviceEntry>) -> Self {
        Self {
            id: d.id.clone(),
            name: d.name.clone(),
            model: d.model.clone().unwrap_or_default(),
            area: d.suggested_area.clone().unwrap_or_else(|| "-".into()),
            identifiers: d
                .identifiers
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", "),
            via: d.via_device_id.clone().unwrap_or_else(|| "-".into()),
        }
    }
}

pub fn handle(ctx: &Context) {
    let mut devices = ctx.integration.devices();
    devices.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.name.cmp(&b.name)));

    let out = output::render_list(
        ctx.output,
        &devices,
        |d| DeviceRow::from(d),
        |d| d.id.clone(),
    );
    output::print_output(&out, ctx.quiet);
}
