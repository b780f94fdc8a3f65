//! CLI argument parsing layer.
//!
//! This module provides the CLI interface using clap derive macros.
//! The business logic layer is [`crate::commands`], which receives these parsed arguments.

use clap::{Parser, Subcommand};

use crate::models::Service;

mod cli;

pub use cli::Cli;

/// Root command enum for profile management.
#[derive(Subcommand)]
#[command(about = "Configure and manage your user profiles")]
pub enum ConfigArgs {
    Init(Init),
    Set(Set),
    #[command(alias = "ls")]
    List(List),
    Describe(Describe),
    Rename(Rename),
    #[command(alias = "rm")]
    Delete(Delete),
    Edit(Edit),
}

/// Configure a profile to store access settings for your MongoDB deployment.
///
/// Prompts for API keys, the organization and project to use by default and the output format.
/// Existing values are offered as defaults.
#[derive(Parser)]
pub struct Init {
    /// Create a profile for MongoDB Atlas for Government.
    #[arg(long, conflicts_with = "service")]
    pub gov: bool,

    /// Service the profile connects to.
    #[arg(long, value_enum)]
    pub service: Option<Service>,

    /// Name of the profile to configure.
    #[arg(long, short = 'P')]
    pub profile: Option<String>,
}

/// Configure specific properties of a profile.
///
/// Boolean properties accept true/t/yes/y/1 and false/f/no/n/0.
#[derive(Parser)]
pub struct Set {
    /// Property to set in the profile.
    #[arg(index = 1)]
    pub property: String,

    /// Value for the property.
    #[arg(index = 2, allow_hyphen_values = true)]
    pub value: String,

    /// Name of the profile to update.
    #[arg(long, short = 'P')]
    pub profile: Option<String>,
}

/// Return a list of available profiles by name.
#[derive(Parser)]
pub struct List;

/// Return the profile you specify.
///
/// Secrets are redacted.
#[derive(Parser)]
pub struct Describe {
    /// Name of the profile.
    #[arg(index = 1)]
    pub name: String,
}

/// Rename a profile.
#[derive(Parser)]
pub struct Rename {
    /// Name of the profile to rename.
    #[arg(index = 1)]
    pub old_name: String,

    /// New name of the profile.
    #[arg(index = 2)]
    pub new_name: String,
}

/// Delete a profile.
///
/// The command prompts you to confirm the operation when you run the command without the --force option.
#[derive(Parser)]
pub struct Delete {
    /// Name of the profile to delete.
    #[arg(index = 1)]
    pub name: String,

    /// Flag that indicates whether to skip the confirmation prompt before proceeding with the requested action.
    #[arg(long)]
    pub force: bool,
}

/// Open the configuration file with the default text editor.
///
/// Uses $VISUAL, then $EDITOR, then vi (notepad on Windows).
#[derive(Parser)]
pub struct Edit;
