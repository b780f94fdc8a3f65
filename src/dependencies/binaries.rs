use std::path::PathBuf;

use which::which;

#[cfg(target_os = "windows")]
pub const MONGOSH_BIN: &str = "mongosh.exe";

#[cfg(not(target_os = "windows"))]
pub const MONGOSH_BIN: &str = "mongosh";

// Dependency to find executables on the PATH
pub trait BinaryLocator {
    fn locate(&self, name: &str) -> Option<PathBuf>;
}

#[derive(Debug, Default, Clone)]
pub struct PathLookup;

impl PathLookup {
    pub fn new() -> Self {
        Self
    }
}

impl BinaryLocator for PathLookup {
    fn locate(&self, name: &str) -> Option<PathBuf> {
        which(name).ok()
    }
}
