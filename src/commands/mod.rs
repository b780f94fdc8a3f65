//! This module contains business logic for the commands for the application.
//!
//! The main entry point is the [`command_from_args`] function which converts CLI arguments into a command.
use anyhow::Result;

use crate::{
    args::ConfigArgs,
    commands::{
        delete::Delete, describe::Describe, edit::Edit, init::Init, list::List, rename::Rename,
        set::Set,
    },
    formatting::Format,
};
pub use core::{Command, CommandWithOutput, CommandWithOutputExt};

mod core;
pub mod delete;
pub mod describe;
pub mod edit;
pub mod init;
pub mod list;
pub mod rename;
pub mod set;
mod validators;

/// Convert CLI arguments into a command.
///
/// This function is the main entry point for the command execution logic.
/// It converts the CLI arguments into a command and returns it.
///
/// The output of the command will be formatted using the provided format and printed to stdout.
pub fn command_from_args(args: ConfigArgs, format: Format) -> Result<Box<dyn Command>> {
    match args {
        ConfigArgs::Init(init_args) => Init::try_from(init_args)?.with_print_to_stdout(format),
        ConfigArgs::Set(set_args) => Set::try_from(set_args)?.with_print_to_stdout(format),
        ConfigArgs::List(list_args) => List::try_from(list_args)?.with_print_to_stdout(format),
        ConfigArgs::Describe(describe_args) => {
            Describe::try_from(describe_args)?.with_print_to_stdout(format)
        }
        ConfigArgs::Rename(rename_args) => {
            Rename::try_from(rename_args)?.with_print_to_stdout(format)
        }
        ConfigArgs::Delete(delete_args) => {
            Delete::try_from(delete_args)?.with_print_to_stdout(format)
        }
        ConfigArgs::Edit(edit_args) => Edit::try_from(edit_args)?.with_print_to_stdout(format),
    }
}
