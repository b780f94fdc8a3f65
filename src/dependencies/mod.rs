//! This module defines traits for external dependencies (the user's editor, binaries on the `PATH`)
//! to make them easier to mock and substitute in tests. By abstracting external processes behind
//! traits, commands can be dependency-injected and tested without touching the machine.
pub mod binaries;
pub mod editor;

pub use binaries::*;
pub use editor::*;
