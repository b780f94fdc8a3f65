use std::fmt::Display;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;

use crate::{
    args,
    commands::CommandWithOutput,
    config::{self, Profile, Property, Scope, properties::validate_value},
};

pub struct Set {
    property: String,
    value: String,

    profile: Profile,
}

impl TryFrom<args::Set> for Set {
    type Error = anyhow::Error;

    fn try_from(args: args::Set) -> Result<Self> {
        Ok(Self {
            property: args.property,
            value: args.value,

            profile: config::load_profile(args.profile.as_deref())
                .context("loading configuration")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SetResult {
    pub property: String,
    pub scope: Scope,
    /// Not set for global properties.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_name: Option<String>,
}

impl Display for SetResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Updated property '{}'", self.property)
    }
}

#[async_trait]
impl CommandWithOutput for Set {
    type Output = SetResult;

    async fn execute(&mut self) -> Result<Self::Output> {
        let property: Property = self.property.parse()?;
        let value = validate_value(property, &self.value)?;

        let profile_name = match property.scope() {
            Scope::Profile => {
                self.profile.set(property, value);
                Some(self.profile.name().to_string())
            }
            Scope::Global => {
                self.profile.set_global(property, value);
                None
            }
        };

        self.profile.save().context("saving configuration")?;

        Ok(SetResult {
            property: property.name().to_string(),
            scope: property.scope(),
            profile_name,
        })
    }
}
