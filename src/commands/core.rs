//! Core traits shared by every command.
//!
//! - [`Command`] is a unit of work the binary executes.
//! - [`CommandWithOutput`] is a command producing a [`Formattable`] result.
//!
//! [`CommandWithOutputExt::with_print_to_stdout`] turns the latter into the former by printing
//! the result in the requested format.

use std::io::{self, Write};

use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::formatting::{Format, Formattable};

/// Trait for all commands.
///
/// A command is a unit of work the binary runs once per invocation.
#[async_trait]
pub trait Command {
    /// Execute the command.
    async fn execute(&mut self) -> Result<()>;
}

/// Trait for commands that return an output.
///
/// The output is formatted as text or JSON by the caller, never by the command itself.
#[async_trait]
pub trait CommandWithOutput {
    type Output;

    /// Execute the command and return the output.
    async fn execute(&mut self) -> Result<Self::Output>;
}

/// Command extensions trait.
pub trait CommandWithOutputExt {
    /// Convert a [`CommandWithOutput`] into a [`Command`] that prints the output to stdout.
    ///
    /// # Arguments
    ///
    /// * `format` - The format to print the output in.
    ///
    /// # Returns
    ///
    /// A [`Command`] that prints the output, followed by a newline, once it completes.
    fn with_print_to_stdout(self, format: Format) -> Result<Box<dyn Command>>;
}

/// Runs a [`CommandWithOutput`] and writes its formatted output, followed by a newline.
pub struct PrintOutputCommand<C> {
    command: C,
    format: Format,
    writer: Box<dyn Write + Send>,
}

impl<C> PrintOutputCommand<C>
where
    C: CommandWithOutput + Send,
    C::Output: Formattable,
{
    pub fn new(command: C, format: Format, writer: Box<dyn Write + Send>) -> Self {
        Self {
            command,
            format,
            writer,
        }
    }
}

#[async_trait]
impl<C> Command for PrintOutputCommand<C>
where
    C: CommandWithOutput + Send,
    C::Output: Formattable,
{
    async fn execute(&mut self) -> Result<()> {
        let output = self.command.execute().await?;
        let formatted_output = output.format(self.format)?;

        writeln!(self.writer, "{formatted_output}").context("writing command output")?;
        self.writer.flush().context("writing command output")
    }
}

impl<C> CommandWithOutputExt for C
where
    C: CommandWithOutput + Send + 'static,
    C::Output: Formattable,
{
    fn with_print_to_stdout(self, format: Format) -> Result<Box<dyn Command>> {
        Ok(Box::new(PrintOutputCommand::new(
            self,
            format,
            Box::new(io::stdout()),
        )))
    }
}
