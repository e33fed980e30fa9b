//! Clap derive structures for the `caseta` simulator.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// caseta -- drive the keypad integration against a simulated bridge
#[derive(Debug, Parser)]
#[command(
    name = "caseta",
    version,
    about = "Simulate a Caseta bridge and inspect the keypad integration",
    long_about = "Loads a bridge device snapshot into an in-memory bridge, sets up the\n\
        integration entry against it, and lets you list devices and entities,\n\
        press buttons, toggle LEDs and switches, and watch button events.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Bridge snapshot JSON (overrides the config file)
    #[arg(long, short = 's', env = "CASETA_SNAPSHOT", global = true)]
    pub snapshot: Option<PathBuf>,

    /// Config file (defaults to the platform config directory)
    #[arg(long, env = "CASETA_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'o', env = "CASETA_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// Register keypads whose area is unassigned
    #[arg(long, global = true)]
    pub include_unassigned: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

// ── Output Enum ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// Plain text, one value per line (scripting)
    Plain,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List devices the entry registered
    #[command(alias = "dev", alias = "d")]
    Devices,

    /// List entities with their current state
    #[command(alias = "ent", alias = "e")]
    Entities(EntitiesArgs),

    /// Press a keypad button entity
    Press(PressArgs),

    /// Turn an LED or switch entity on or off
    Set(SetArgs),

    /// Read raw button notifications from stdin and print bus events
    Watch,
}

#[derive(Debug, Args)]
pub struct EntitiesArgs {
    /// Only show entities of this platform
    #[arg(long, value_enum)]
    pub platform: Option<PlatformFilter>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PlatformFilter {
    Button,
    Switch,
}

#[derive(Debug, Args)]
pub struct PressArgs {
    /// Unique id of the button entity (e.g. 1234_101)
    pub unique_id: String,

    /// Do not echo the resulting press/release back from the bridge
    #[arg(long)]
    pub no_echo: bool,
}

#[derive(Debug, Args)]
pub struct SetArgs {
    /// Unique id of the LED or switch entity
    pub unique_id: String,

    pub state: SwitchState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SwitchState {
    On,
    Off,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn set_parses_state() {
        let cli = Cli::try_parse_from(["caseta", "set", "1234_111", "on", "-o", "json"]);
        let Ok(cli) = cli else {
            panic!("set should parse");
        };
        assert_eq!(cli.global.output, Some(OutputFormat::Json));
        assert!(matches!(
            cli.command,
            Command::Set(SetArgs { state: SwitchState::On, .. })
        ));
    }
}
