//! Button press, optionally echoed back as bridge notifications.

use caseta_api::{BUTTON_STATUS_PRESSED, BUTTON_STATUS_RELEASED};
use caseta_core::EntityHandle;

use super::{Context, drain_events};
use crate::cli::PressArgs;
use crate::error::CliError;

pub async fn handle(ctx: &Context, args: PressArgs) -> Result<(), CliError> {
    let EntityHandle::Button(button) = ctx.integration.entity(&args.unique_id).await? else {
        return Err(CliError::Unsupported {
            unique_id: args.unique_id,
            operation: "press".into(),
        });
    };

    let mut rx = ctx.integration.bus().subscribe();
    button.press().await?;
    tracing::info!(unique_id = %args.unique_id, "button pressed");

    // A physical bridge reports the tap back as a press followed by a release.
    if !args.no_echo {
        ctx.bridge.emit_button_event(button.button_id(), BUTTON_STATUS_PRESSED);
        ctx.bridge.emit_button_event(button.button_id(), BUTTON_STATUS_RELEASED);
    }
    drain_events(ctx, &mut rx);
    Ok(())
}
