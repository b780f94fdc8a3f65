use std::{path::Path, process::Stdio};

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

#[cfg(target_os = "windows")]
const DEFAULT_EDITOR: &str = "notepad";

#[cfg(not(target_os = "windows"))]
const DEFAULT_EDITOR: &str = "vi";

// Dependency to open a file in the user's editor
#[async_trait]
pub trait EditorLauncher {
    /// Opens the file and waits for the editor to exit.
    async fn edit(&self, path: &Path) -> Result<()>;
}

/// Launches `$VISUAL`, then `$EDITOR`, then the platform default editor.
#[derive(Debug, Default, Clone)]
pub struct SystemEditor {
    command: Option<Vec<String>>,
}

impl SystemEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Always launch `command` instead of looking at the environment.
    #[cfg(test)]
    pub fn with_command(command: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            command: Some(command.into_iter().map(Into::into).collect()),
        }
    }

    fn command(&self) -> Vec<String> {
        match &self.command {
            Some(command) => command.clone(),
            None => editor_command(
                std::env::var("VISUAL").ok().as_deref(),
                std::env::var("EDITOR").ok().as_deref(),
            ),
        }
    }
}

#[async_trait]
impl EditorLauncher for SystemEditor {
    async fn edit(&self, path: &Path) -> Result<()> {
        let editor = self.command();
        let (program, args) = editor
            .split_first()
            .context("no editor configured")?;

        debug!(program, ?args, path = %path.display(), "launching editor");

        let status = Command::new(program)
            .args(args)
            .arg(path)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .with_context(|| format!("failed to launch editor '{program}'"))?;

        if !status.success() {
            bail!("editor '{program}' exited with {status}");
        }

        Ok(())
    }
}

/// The editor command line, split on whitespace so values like `code --wait` work.
pub fn editor_command(visual: Option<&str>, editor: Option<&str>) -> Vec<String> {
    [visual, editor]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|command| !command.is_empty())
        .unwrap_or(DEFAULT_EDITOR)
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
pub mod mocks {
    use super::*;
    use mockall::mock;

    mock! {
        pub Editor {}

        #[async_trait]
        impl EditorLauncher for Editor {
            async fn edit(&self, path: &Path) -> Result<()>;
        }
    }
}
