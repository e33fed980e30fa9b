//! Entity listing with live state.

use serde::Serialize;
use tabled::Tabled;

use caseta_core::{EntityDescriptor, EntityHandle, Platform};

use super::Context;
use crate::cli::{EntitiesArgs, PlatformFilter};
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct EntityView {
    #[serde(flatten)]
    descriptor: EntityDescriptor,
    #[serde(skip_serializing_if = "Option::is_none")]
    is_on: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    icon: Option<&'static str>,
}

impl From<&EntityHandle> for EntityView {
    fn from(entity: &EntityHandle) -> Self {
        Self {
            descriptor: entity.descriptor().clone(),
            is_on: entity.is_on(),
            icon: match entity {
                EntityHandle::Led(led) => Some(led.icon()),
                _ => None,
            },
        }
    }
}

#[derive(Tabled)]
struct EntityRow {
    #[tabled(rename = "Unique ID")]
    unique_id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Platform")]
    platform: String,
    #[tabled(rename = "State")]
    state: String,
}

impl From<&EntityView> for EntityRow {
    fn from(view: &EntityView) -> Self {
        Self {
            unique_id: view.descriptor.unique_id.clone(),
            name: view.descriptor.name.clone(),
            platform: view.descriptor.platform.to_string(),
            state: match view.is_on {
                Some(true) => "on".into(),
                Some(false) => "off".into(),
                None => "-".into(),
            },
        }
    }
}

pub async fn handle(ctx: &Context, args: &EntitiesArgs) -> Result<(), CliError> {
    let wanted = args.platform.map(|filter| match filter {
        PlatformFilter::Button => Platform::Button,
        PlatformFilter::Switch => Platform::Switch,
    });

    let views: Vec<EntityView> = ctx
        .integration
        .entities()
        .await
        .iter()
        .filter(|entity| wanted.is_none_or(|p| entity.descriptor().platform == p))
        .map(|entity| EntityView::from(entity))
        .collect();

    let out = output::render_list(
        ctx.output,
        &views,
        |v| EntityRow::from(v),
        |v| v.descriptor.unique_id.clone(),
    );
    output::print_output(&out, ctx.quiet);
    Ok(())
}
