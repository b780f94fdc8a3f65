//! Root command for the CLI.
//!
//! The binary runs both as an Atlas CLI plugin (`atlas config ...`) and standalone (`atlas-config ...`).
//! The commands are defined in the [`ConfigArgs`](super::ConfigArgs) enum.
use std::env::args;

use clap::{Args, Subcommand};

use crate::formatting::Format;

use super::ConfigArgs;

/// Configure and manage your user profiles
#[derive(Args)]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global_args: GlobalArgs,

    #[command(subcommand)]
    pub command: PluginSubCommands,
}

impl clap::Parser for Cli {}

impl Cli {
    /// Create a new command with the binary name matching how we were invoked.
    ///
    /// The binary name shows up in the usage string of the help text.
    fn new_command() -> clap::Command {
        // As a plugin the first argument is the plugin's command name
        let command = if args().nth(1).as_deref().unwrap_or_default() == "config" {
            "atlas"
        } else {
            "atlas-config"
        };

        clap::Command::new(command).bin_name(command)
    }
}

/// Same as what the Parser derive generates, except for the root command built by [`Cli::new_command`].
impl clap::CommandFactory for Cli {
    fn command() -> clap::Command {
        let app = Cli::new_command();
        <Self as clap::Args>::augment_args(app)
    }

    fn command_for_update() -> clap::Command {
        let app = Cli::new_command();
        <Self as clap::Args>::augment_args_for_update(app)
    }
}

#[derive(Args)]
#[command(rename_all = "camelCase")]
pub struct GlobalArgs {
    /// Enable debug logging.
    ///
    /// Sets the log level to debug for this tool. `ATLAS_CONFIG_LOG` sets the level without the flag,
    /// and `ATLAS_CONFIG_LOG_ALL` shows logs from all crates.
    #[arg(global = true, hide = true, long, short = 'D', default_value = "false")]
    pub debug: bool,

    /// Output format.
    #[arg(global = true, long = "output", short = 'o')]
    pub format: Option<Format>,
}

#[derive(Subcommand)]
pub enum PluginSubCommands {
    /// Configure and manage your user profiles.
    #[command(hide = true)]
    Config {
        #[command(subcommand)]
        command: ConfigArgs,
    },
    /// Root subcommands when the executable runs standalone.
    #[command(flatten)]
    Flat(ConfigArgs),
}

impl From<PluginSubCommands> for ConfigArgs {
    fn from(command: PluginSubCommands) -> Self {
        match command {
            PluginSubCommands::Config { command } => command,
            PluginSubCommands::Flat(command) => command,
        }
    }
}
