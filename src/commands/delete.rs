use std::fmt::Display;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;

use crate::{
    args,
    commands::CommandWithOutput,
    config::{self, DEFAULT_PROFILE, Profile, ProfileAccess},
    interaction::{
        ConfirmationPrompt, ConfirmationPromptOptions, ConfirmationPromptResult, Interaction,
    },
};

// Interaction dependencies for the delete command
pub trait DeleteInteraction: ConfirmationPrompt + Send {}
impl<T: ConfirmationPrompt + Send> DeleteInteraction for T {}

pub struct Delete {
    name: String,
    force: bool,

    profile: Profile,
    interaction: Box<dyn DeleteInteraction>,
}

impl TryFrom<args::Delete> for Delete {
    type Error = anyhow::Error;

    fn try_from(args: args::Delete) -> Result<Self> {
        Ok(Self {
            name: args.name,
            force: args.force,

            profile: Profile::new(
                DEFAULT_PROFILE,
                config::load_store().context("loading configuration")?,
            ),
            interaction: Box::new(Interaction::new()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DeleteResult {
    Deleted { profile_name: String },
    Canceled { profile_name: String },
}

impl Display for DeleteResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Deleted { profile_name } => write!(f, "Profile '{profile_name}' deleted"),
            Self::Canceled { .. } => write!(f, "Profile not deleted"),
        }
    }
}

#[async_trait]
impl CommandWithOutput for Delete {
    type Output = DeleteResult;

    async fn execute(&mut self) -> Result<Self::Output> {
        self.profile.set_name(&self.name, ProfileAccess::Read)?;

        if !self.force {
            let confirmation = self
                .interaction
                .confirm(
                    ConfirmationPromptOptions::builder()
                        .message(format!(
                            "Are you sure you want to delete the profile '{}'?",
                            self.name
                        ))
                        .help_text(
                            "The profile's settings and stored secrets are removed. This action cannot be undone."
                                .to_string(),
                        )
                        .default(false)
                        .build(),
                )
                .context("confirming deletion")?;

            if matches!(
                confirmation,
                ConfirmationPromptResult::No | ConfirmationPromptResult::Canceled
            ) {
                return Ok(DeleteResult::Canceled {
                    profile_name: self.name.clone(),
                });
            }
        }

        self.profile.delete()?;
        self.profile.save().context("saving configuration")?;

        Ok(DeleteResult::Deleted {
            profile_name: self.name.clone(),
        })
    }
}
