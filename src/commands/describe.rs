//! Command to show the settings of one profile, with secrets redacted.

use std::{collections::BTreeMap, fmt::Display};

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;

use crate::{
    args,
    commands::CommandWithOutput,
    config::{self, DEFAULT_PROFILE, Profile, ProfileAccess, Value},
    table::Table,
};

pub struct Describe {
    name: String,

    profile: Profile,
}

impl TryFrom<args::Describe> for Describe {
    type Error = anyhow::Error;

    fn try_from(args: args::Describe) -> Result<Self> {
        Ok(Self {
            name: args.name,

            profile: Profile::new(
                DEFAULT_PROFILE,
                config::load_store().context("loading configuration")?,
            ),
        })
    }
}

/// Settings of the profile by name. Serialized as a JSON object.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DescribeResult(BTreeMap<String, Value>);

impl From<&DescribeResult> for Table {
    fn from(value: &DescribeResult) -> Self {
        Table::new(
            vec!["SETTING".to_string(), "VALUE".to_string()],
            value
                .0
                .iter()
                .map(|(setting, value)| vec![setting.clone(), value.to_string()])
                .collect(),
        )
    }
}

impl Display for DescribeResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Table::from(self).fmt(f)
    }
}

#[async_trait]
impl CommandWithOutput for Describe {
    type Output = DescribeResult;

    async fn execute(&mut self) -> Result<Self::Output> {
        self.profile.set_name(&self.name, ProfileAccess::Read)?;

        Ok(DescribeResult(self.profile.map()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::mocks::InMemoryStore,
        formatting::{Format, Formattable},
    };

    fn describe_command(store: InMemoryStore, name: &str) -> Describe {
        Describe {
            name: name.to_string(),
            profile: Profile::new(DEFAULT_PROFILE, Box::new(store)).with_env(|_| None),
        }
    }

    #[tokio::test]
    async fn test_describe_redacts_secrets() {
        let store = InMemoryStore::new().with_profile(
            "e2e",
            &[
                ("org_id", Value::from("5e429f2e06822c6eac4d59c9")),
                ("private_api_key", Value::from("secret")),
                ("ops_manager_skip_verify", Value::Bool(true)),
            ],
        );
        let mut command = describe_command(store, "e2e");

        let result = command.execute().await.expect("execute should succeed");

        assert_eq!(
            result.to_string(),
            "SETTING                    VALUE\n\
             ops_manager_skip_verify    true\n\
             org_id                     5e429f2e06822c6eac4d59c9\n\
             private_api_key            redacted"
        );
        assert_eq!(
            result.format(Format::Json).unwrap(),
            r#"{"ops_manager_skip_verify":true,"org_id":"5e429f2e06822c6eac4d59c9","private_api_key":"redacted"}"#
        );
    }

    #[tokio::test]
    async fn test_describe_missing_profile() {
        let mut command = describe_command(InMemoryStore::new(), "missing");

        let err = command.execute().await.unwrap_err();

        assert_eq!(err.to_string(), "profile missing does not exist");
    }

    #[tokio::test]
    async fn test_describe_empty_profile() {
        let mut command = describe_command(InMemoryStore::new().with_profile("e2e", &[]), "e2e");

        let result = command.execute().await.expect("execute should succeed");

        assert_eq!(result.to_string(), "SETTING    VALUE");
        assert_eq!(result.format(Format::Json).unwrap(), "{}");
    }
}
