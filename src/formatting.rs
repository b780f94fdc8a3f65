//! Output formatting for command results.
//!
//! The main entry point is the [`Formattable`] trait which provides a method to format an object as text or json.
use std::fmt::Display;

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Serialize;

/// Format of the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum)]
pub enum Format {
    #[default]
    Text,
    Json,
}

/// Trait for types that can be formatted as text or JSON.
///
/// Types implementing both [`Display`] and [`Serialize`] get it for free.
pub trait Formattable {
    fn format(&self, format: Format) -> Result<String>;
}

impl<T> Formattable for T
where
    T: Display + Serialize,
{
    fn format(&self, format: Format) -> Result<String> {
        Ok(match format {
            Format::Text => self.to_string(),
            Format::Json => serde_json::to_string(self).context("serializing to json")?,
        })
    }
}
