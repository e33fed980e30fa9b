mod cli;
mod commands;
mod error;
mod output;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use caseta_api::{BridgeClient, BridgeSnapshot, MemoryBridge};
use caseta_core::Integration;

use crate::cli::{Cli, OutputFormat};
use crate::commands::Context;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config_path = cli
        .global
        .config
        .clone()
        .unwrap_or_else(caseta_config::config_path);
    let cfg = caseta_config::load_config_from(&config_path)?;

    let mut integration_config = caseta_config::to_integration_config(&cfg)?;
    if cli.global.include_unassigned {
        integration_config.skip_unassigned_keypads = false;
    }

    let snapshot_path: PathBuf = cli
        .global
        .snapshot
        .clone()
        .or_else(|| cfg.snapshot.clone())
        .ok_or_else(|| CliError::NoSnapshot {
            path: config_path.display().to_string(),
        })?;
    let snapshot = BridgeSnapshot::from_path(&snapshot_path).map_err(|source| CliError::Snapshot {
        path: snapshot_path.display().to_string(),
        source,
    })?;

    let bridge = Arc::new(MemoryBridge::from_snapshot(snapshot));
    let client: Arc<dyn BridgeClient> = bridge.clone();
    let integration = Integration::standalone(integration_config, client);
    integration.setup().await?;

    let output = cli.global.output.unwrap_or(match cfg.defaults.output.as_str() {
        "json" => OutputFormat::Json,
        "json-compact" => OutputFormat::JsonCompact,
        "plain" => OutputFormat::Plain,
        _ => OutputFormat::Table,
    });

    let ctx = Context {
        bridge,
        integration,
        output,
        quiet: cli.global.quiet,
    };

    tracing::debug!(command = ?cli.command, "dispatching command");
    let result = commands::dispatch(cli.command, &ctx).await;
    ctx.integration.unload().await?;
    result
}
