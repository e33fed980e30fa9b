//! Command dispatch: CLI args -> integration calls -> output formatting.

pub mod devices;
pub mod entities;
pub mod press;
pub mod set;
pub mod watch;

use std::sync::Arc;

use caseta_api::MemoryBridge;
use caseta_core::{EventBusReceiver, Integration};

use crate::cli::{Command, OutputFormat};
use crate::error::CliError;
use crate::output;

/// Everything a command handler needs.
pub struct Context {
    pub bridge: Arc<MemoryBridge>,
    pub integration: Integration,
    pub output: OutputFormat,
    pub quiet: bool,
}

pub async fn dispatch(cmd: Command, ctx: &Context) -> Result<(), CliError> {
    match cmd {
        Command::Devices => {
            devices::handle(ctx);
            Ok(())
        }
        Command::Entities(args) => entities::handle(ctx, &args).await,
        Command::Press(args) => press::handle(ctx, args).await,
        Command::Set(args) => set::handle(ctx, args).await,
        Command::Watch => watch::handle(ctx).await,
    }
}

/// Print every event already queued on `rx`.
fn drain_events(ctx: &Context, rx: &mut EventBusReceiver) {
    while let Some(event) = rx.try_recv() {
        output::print_output(&output::render_event(ctx.output, &event), ctx.quiet);
    }
}
