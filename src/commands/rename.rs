use std::fmt::Display;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use serde::Serialize;

use crate::{
    args,
    commands::CommandWithOutput,
    config::{self, DEFAULT_PROFILE, Profile, ProfileAccess, validate_profile_name},
    interaction::{
        ConfirmationPrompt, ConfirmationPromptOptions, ConfirmationPromptResult, Interaction,
    },
};

// Interaction dependencies for the rename command
pub trait RenameInteraction: ConfirmationPrompt + Send {}
impl<T: ConfirmationPrompt + Send> RenameInteraction for T {}

pub struct Rename {
    old_name: String,
    new_name: String,

    profile: Profile,
    interaction: Box<dyn RenameInteraction>,
}

impl TryFrom<args::Rename> for Rename {
    type Error = anyhow::Error;

    fn try_from(args: args::Rename) -> Result<Self> {
        Ok(Self {
            old_name: args.old_name,
            new_name: args.new_name,

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
pub enum RenameResult {
    Renamed { old_name: String, new_name: String },
    Canceled { old_name: String, new_name: String },
}

impl Display for RenameResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Renamed { old_name, new_name } => {
                write!(f, "The profile {old_name} was renamed to {new_name}.")
            }
            Self::Canceled { .. } => write!(f, "Profile not renamed"),
        }
    }
}

#[async_trait]
impl CommandWithOutput for Rename {
    type Output = RenameResult;

    async fn execute(&mut self) -> Result<Self::Output> {
        self.profile.set_name(&self.old_name, ProfileAccess::Read)?;
        if self.old_name == self.new_name {
            bail!("the new profile name must be different from '{}'", self.old_name);
        }
        validate_profile_name(&self.new_name)?;

        let overwrite = self.profile.exists(&self.new_name);
        if overwrite {
            let confirmation = self
                .interaction
                .confirm(
                    ConfirmationPromptOptions::builder()
                        .message(format!(
                            "There is already a profile called {}.\nDo you want to replace it?",
                            self.new_name
                        ))
                        .default(false)
                        .build(),
                )
                .context("confirming rename")?;

            if confirmation != ConfirmationPromptResult::Yes {
                return Ok(RenameResult::Canceled {
                    old_name: self.old_name.clone(),
                    new_name: self.new_name.clone(),
                });
            }
        }

        self.profile.rename(&self.new_name, overwrite)?;
        self.profile.save().context("saving configuration")?;

        Ok(RenameResult::Renamed {
            old_name: self.old_name.clone(),
            new_name: self.new_name.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;

    use super::*;
    use crate::{
        config::{Value, mocks::InMemoryStore},
        interaction::mocks::MockInteraction,
    };

    fn store() -> InMemoryStore {
        InMemoryStore::new()
            .with_profile("e2e", &[("service", Value::from("cloud"))])
            .with_profile("other", &[("output", Value::from("json"))])
    }

    fn rename_command(
        store: &InMemoryStore,
        old_name: &str,
        new_name: &str,
        interaction: MockInteraction,
    ) -> Rename {
        Rename {
            old_name: old_name.to_string(),
            new_name: new_name.to_string(),
            profile: Profile::new(DEFAULT_PROFILE, Box::new(store.clone())).with_env(|_| None),
            interaction: Box::new(interaction),
        }
    }

    #[tokio::test]
    async fn test_rename() {
        let store = store();
        let mut mock_interaction = MockInteraction::new();
        mock_interaction.expect_confirm().never();

        let mut command = rename_command(&store, "e2e", "renamed", mock_interaction);
        let result = command.execute().await.expect("execute should succeed");

        assert_eq!(
            result,
            RenameResult::Renamed {
                old_name: "e2e".to_string(),
                new_name: "renamed".to_string(),
            }
        );
        assert_eq!(result.to_string(), "The profile e2e was renamed to renamed.");
        assert!(store.profile("e2e").is_none());
        assert_eq!(
            store.profile("renamed").unwrap()["service"],
            Value::from("cloud")
        );
        assert_eq!(store.saves(), 1);
    }

    #[tokio::test]
    async fn test_rename_overwrite_confirmed() {
        let store = store();
        let mut mock_interaction = MockInteraction::new();
        mock_interaction
            .expect_confirm()
            .return_once(|_| Ok(ConfirmationPromptResult::Yes));

        let mut command = rename_command(&store, "e2e", "other", mock_interaction);
        let result = command.execute().await.expect("execute should succeed");

        assert!(matches!(result, RenameResult::Renamed { .. }));
        let other = store.profile("other").unwrap();
        assert_eq!(other["service"], Value::from("cloud"));
        assert!(!other.contains_key("output"));
    }

    #[tokio::test]
    async fn test_rename_overwrite_declined() {
        let store = store();
        let mut mock_interaction = MockInteraction::new();
        mock_interaction
            .expect_confirm()
            .return_once(|_| Ok(ConfirmationPromptResult::No));

        let mut command = rename_command(&store, "e2e", "other", mock_interaction);
        let result = command.execute().await.expect("execute should succeed");

        assert_eq!(result.to_string(), "Profile not renamed");
        assert!(store.profile("e2e").is_some());
        assert_eq!(store.saves(), 0);
    }

    #[tokio::test]
    async fn test_rename_overwrite_without_terminal() {
        let store = store();
        let mut mock_interaction = MockInteraction::new();
        mock_interaction
            .expect_confirm()
            .return_once(|_| Ok(ConfirmationPromptResult::Canceled));

        let mut command = rename_command(&store, "e2e", "other", mock_interaction);
        let result = command.execute().await.expect("execute should succeed");

        assert!(matches!(result, RenameResult::Canceled { .. }));
    }

    #[tokio::test]
    async fn test_rename_confirmation_failed() {
        let store = store();
        let mut mock_interaction = MockInteraction::new();
        mock_interaction
            .expect_confirm()
            .return_once(|_| Err(anyhow!("input error")));

        let mut command = rename_command(&store, "e2e", "other", mock_interaction);
        let err = command.execute().await.unwrap_err();

        assert_eq!(err.to_string(), "confirming rename");
    }

    #[tokio::test]
    async fn test_rename_missing_profile() {
        let store = store();
        let mut command = rename_command(&store, "missing", "renamed", MockInteraction::new());

        let err = command.execute().await.unwrap_err();

        assert_eq!(err.to_string(), "profile missing does not exist");
    }

    #[tokio::test]
    async fn test_rename_invalid_new_name() {
        let store = store();
        let mut command = rename_command(&store, "e2e", "default.123", MockInteraction::new());

        let err = command.execute().await.unwrap_err();

        assert!(err.to_string().starts_with("invalid profile name 'default.123'"));
        assert!(store.profile("e2e").is_some());
    }

    #[tokio::test]
    async fn test_rename_to_same_name() {
        let store = store();
        let mut command = rename_command(&store, "e2e", "e2e", MockInteraction::new());

        let err = command.execute().await.unwrap_err();

        assert_eq!(
            err.to_string(),
            "the new profile name must be different from 'e2e'"
        );
        assert_eq!(store.saves(), 0);
    }

    #[tokio::test]
    async fn test_rename_missing_profile_to_same_name() {
        let store = store();
        let mut command = rename_command(&store, "missing", "missing", MockInteraction::new());

        let err = command.execute().await.unwrap_err();

        assert_eq!(err.to_string(), "profile missing does not exist");
    }

    #[test]
    fn test_rename_result_json() {
        let result = RenameResult::Canceled {
            old_name: "e2e".to_string(),
            new_name: "other".to_string(),
        };

        assert_eq!(
            serde_json::to_string(&result).unwrap(),
            r#"{"outcome":"canceled","old_name":"e2e","new_name":"other"}"#
        );
    }
}
