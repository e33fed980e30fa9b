//! Feed raw button notifications from stdin and print the resulting bus events.
//!
//! Each input line is `<button_id> [status]`; the status defaults to the
//! pressed sentinel. Runs until stdin closes.

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;

use caseta_api::BUTTON_STATUS_PRESSED;

use super::{Context, drain_events};
use crate::error::CliError;
use crate::output;

pub async fn handle(ctx: &Context) -> Result<(), CliError> {
    let mut rx = ctx.integration.bus().subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                inject(ctx, &line);
            }
            Some(event) = rx.recv() => {
                output::print_output(&output::render_event(ctx.output, &event), ctx.quiet);
            }
        }
    }

    drain_events(ctx, &mut rx);
    Ok(())
}

fn inject(ctx: &Context, line: &str) {
    let mut parts = line.split_whitespace();
    let Some(button_id) = parts.next() else {
        return;
    };
    let status = parts.next().unwrap_or(BUTTON_STATUS_PRESSED);
    if ctx.bridge.emit_button_event(button_id, status) == 0 {
        warn!(button_id, "no entity is subscribed to this button");
    }
}
