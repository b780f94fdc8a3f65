use anyhow::Result;
use args::Cli;
use clap::Parser;
use formatting::Format;
use tracing::debug;

use crate::{commands::command_from_args, logging::setup_logging};

mod args;
mod commands;
mod config;
mod dependencies;
mod formatting;
mod interaction;
mod logging;
mod models;
mod table;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.global_args.debug);

    let format = cli.global_args.format.unwrap_or(Format::Text);
    debug!(?format, "starting atlas-config");

    let mut command = command_from_args(cli.command.into(), format)?;
    command.execute().await
}
