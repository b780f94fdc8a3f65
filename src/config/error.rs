use std::path::PathBuf;

/// Errors returned by the profile store and its backends.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("profile {0} does not exist")]
    ProfileNotFound(String),

    #[error("profile {0} already exists")]
    ProfileAlreadyExists(String),

    #[error(
        "invalid profile name '{0}': use only letters, digits, '-' and '_' (for example 'default' or 'my-profile')"
    )]
    InvalidProfileName(String),

    #[error("invalid property: '{name}', valid properties are: {allowed}")]
    InvalidProperty { name: String, allowed: String },

    #[error("property '{0}' cannot be set with this command")]
    PropertyNotSettable(String),

    #[error("invalid value for {property}: {reason}")]
    InvalidValue { property: String, reason: String },

    #[error("failed to {action} {}: {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize the configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("secure storage error for profile '{profile}': {source}")]
    Keyring {
        profile: String,
        #[source]
        source: keyring::Error,
    },

    #[error("could not determine the configuration directory for this user")]
    NoConfigHome,
}

impl ConfigError {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }
}
