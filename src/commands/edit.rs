use std::{fmt::Display, path::PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use crate::{
    args,
    commands::CommandWithOutput,
    config,
    dependencies::{EditorLauncher, SystemEditor},
};

pub struct Edit {
    path: PathBuf,

    editor: Box<dyn EditorLauncher + Send + Sync>,
}

impl TryFrom<args::Edit> for Edit {
    type Error = anyhow::Error;

    fn try_from(_: args::Edit) -> Result<Self> {
        Ok(Self {
            path: config::config_file().context("locating configuration file")?,
            editor: Box::new(SystemEditor::new()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditResult {
    pub path: PathBuf,
}

impl Display for EditResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Edited {}", self.path.display())
    }
}

#[async_trait]
impl CommandWithOutput for Edit {
    type Output = EditResult;

    async fn execute(&mut self) -> Result<Self::Output> {
        config::ensure_exists(&self.path).context("creating configuration file")?;

        debug!(path = %self.path.display(), "editing configuration file");
        self.editor.edit(&self.path).await?;

        Ok(EditResult {
            path: self.path.clone(),
        })
    }
}
