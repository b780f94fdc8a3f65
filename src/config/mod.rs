//! Profile configuration store.
//!
//! The [`Profile`] type is the entry point for commands. It wraps a [`Store`], which is the
//! storage port with two backends: the TOML [`FileStore`] and the OS keychain ([`KeyringStore`]),
//! combined by `ProxyStore` when the keychain is usable.
use std::{env, ffi::OsString, path::PathBuf};

use tracing::debug;

mod error;
mod file_store;
mod profile;
pub mod properties;
mod secure;
mod store;

pub use error::ConfigError;
pub use file_store::{FileStore, ensure_exists};
pub use profile::{DEFAULT_PROFILE, Profile, ProfileAccess, validate_profile_name};
pub use properties::{Property, Scope, Value};
pub use secure::{KeyringStore, OsKeyring, SecureStore};
pub use store::{Store, new_store};

#[cfg(test)]
pub mod mocks {
    pub use super::secure::mocks::*;
    pub use super::store::mocks::*;
}

/// Overrides the directory holding the configuration file.
pub const CONFIG_HOME_ENV: &str = "ATLAS_CONFIG_HOME";

/// Environment variables selecting the profile when `--profile` is not given, in priority order.
pub const PROFILE_ENV_VARS: [&str; 2] = ["MONGODB_ATLAS_PROFILE", "MCLI_PROFILE"];

/// Prefixes of environment variables overriding profile values, in priority order.
pub const ENV_PREFIXES: [&str; 2] = ["MONGODB_ATLAS_", "MCLI_"];

const CONFIG_DIR_NAME: &str = "atlascli";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Directory holding the configuration file.
///
/// `ATLAS_CONFIG_HOME` when set, otherwise `atlascli` inside the user's configuration directory.
pub fn config_home() -> Result<PathBuf, ConfigError> {
    resolve_config_home(env::var_os(CONFIG_HOME_ENV), dirs::config_dir())
}

fn resolve_config_home(
    home_override: Option<OsString>,
    user_config_dir: Option<PathBuf>,
) -> Result<PathBuf, ConfigError> {
    if let Some(home) = home_override.filter(|home| !home.is_empty()) {
        return Ok(PathBuf::from(home));
    }

    user_config_dir
        .map(|dir| dir.join(CONFIG_DIR_NAME))
        .ok_or(ConfigError::NoConfigHome)
}

pub fn config_file() -> Result<PathBuf, ConfigError> {
    Ok(config_home()?.join(CONFIG_FILE_NAME))
}

/// Name of the profile to use: the flag, then the environment, then `default`.
pub fn selected_profile_name(flag: Option<&str>) -> String {
    resolve_profile_name(flag, |var| env::var(var).ok())
}

fn resolve_profile_name(flag: Option<&str>, env: impl Fn(&str) -> Option<String>) -> String {
    flag.map(str::to_string)
        .or_else(|| {
            PROFILE_ENV_VARS
                .iter()
                .find_map(|var| env(var).filter(|name| !name.is_empty()))
        })
        .unwrap_or_else(|| DEFAULT_PROFILE.to_string())
}

/// Load the configuration file only, without touching the OS keychain.
pub fn load_file_store() -> Result<FileStore, ConfigError> {
    FileStore::load(config_file()?)
}

/// Load the configuration file and, when available, the secrets kept in the OS keychain.
pub fn load_store() -> Result<Box<dyn Store + Send>, ConfigError> {
    let file_store = load_file_store()?;
    let profile_names = file_store.profile_names();

    let keyring_store = KeyringStore::new(&profile_names, Box::new(OsKeyring::new()));
    let store = new_store(file_store, Box::new(keyring_store));
    debug!(secure = store.is_secure(), "loaded configuration store");

    Ok(store)
}

/// Load the full store and select a profile for writing.
///
/// An unknown profile name is accepted; the profile is created by the first write.
pub fn load_profile(flag: Option<&str>) -> Result<Profile, ConfigError> {
    let mut profile = Profile::new(DEFAULT_PROFILE, load_store()?);
    profile.set_name(&selected_profile_name(flag), ProfileAccess::Write)?;
    Ok(profile)
}
