//! LED / switch on-off.

use caseta_core::EntityHandle;

use super::Context;
use crate::cli::{SetArgs, SwitchState};
use crate::error::CliError;
use crate::output;

pub async fn handle(ctx: &Context, args: SetArgs) -> Result<(), CliError> {
    let entity = ctx.integration.entity(&args.unique_id).await?;
    if matches!(entity, EntityHandle::Button(_)) {
        return Err(CliError::Unsupported {
            unique_id: args.unique_id,
            operation: "on/off".into(),
        });
    }

    ctx.integration
        .set_on(&args.unique_id, args.state == SwitchState::On)
        .await?;

    let state = match entity.is_on() {
        Some(true) => "on",
        _ => "off",
    };
    output::print_output(&format!("{} is {state}", entity.descriptor().name), ctx.quiet);
    Ok(())
}
