//! Command to list the profiles in the configuration file.
//!
//! Only the file is read, so listing never touches the OS keychain.

use std::fmt::Display;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;

use crate::{
    args,
    commands::CommandWithOutput,
    config::{self, DEFAULT_PROFILE, Profile},
    table::Table,
};

pub struct List {
    profile: Profile,
}

impl TryFrom<args::List> for List {
    type Error = anyhow::Error;

    fn try_from(_: args::List) -> std::result::Result<Self, Self::Error> {
        Ok(List {
            profile: Profile::new(
                DEFAULT_PROFILE,
                Box::new(config::load_file_store().context("loading configuration")?),
            ),
        })
    }
}

/// Profile names, sorted.
///
/// Serialized as a plain JSON array.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ListResult(Vec<String>);

impl From<&ListResult> for Table {
    fn from(value: &ListResult) -> Self {
        Table::from_iter(&value.0, &[("PROFILE NAME", |name: &String| name.clone())])
    }
}

impl Display for ListResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Table::from(self).fmt(f)
    }
}

#[async_trait]
impl CommandWithOutput for List {
    type Output = ListResult;

    async fn execute(&mut self) -> Result<Self::Output> {
        Ok(ListResult(self.profile.list()))
    }
}
