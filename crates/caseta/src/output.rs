//! Output formatting: table, JSON, plain.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`,
//! structured formats use serde, plain emits one identifier per line.

use std::io::{self, Write};

use tabled::{Table, Tabled, settings::Style};

use caseta_core::BusEvent;

use crate::cli::OutputFormat;

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of serde-serializable + tabled items in the chosen format.
pub fn render_list<T, R>(
    format: OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> String
where
    T: serde::Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            render_table(&rows)
        }
        OutputFormat::Json => render_json_pretty(data),
        OutputFormat::JsonCompact => render_json_compact(data),
        OutputFormat::Plain => data.iter().map(&id_fn).collect::<Vec<_>>().join("\n"),
    }
}

/// One bus event. Structured formats stay on a single line so a
/// stream of events is newline-delimited.
pub fn render_event(format: OutputFormat, event: &BusEvent) -> String {
    match format {
        OutputFormat::Table => {
            let data = &event.data;
            format!(
                "{}  {:<7}  {} / {} / {}  (button {}, keypad {}, device {})",
                event.time_fired.format("%H:%M:%S%.3f"),
                data.action,
                data.area_name.as_deref().unwrap_or("-"),
                data.device_name,
                data.button_name,
                data.button_id,
                data.keypad_id,
                data.device_id.as_deref().unwrap_or("-"),
            )
        }
        OutputFormat::Json | OutputFormat::JsonCompact => render_json_compact(event),
        OutputFormat::Plain => format!("{} {}", event.data.button_id, event.data.action),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

fn render_json_pretty<T: serde::Serialize + ?Sized>(data: &T) -> String {
    serde_json::to_string_pretty(data).unwrap_or_default()
}

fn render_json_compact<T: serde::Serialize + ?Sized>(data: &T) -> String {
    serde_json::to_string(data).unwrap_or_default()
}
