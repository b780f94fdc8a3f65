use std::{collections::BTreeMap, env};

use tracing::debug;

use crate::config::{
    ConfigError, ENV_PREFIXES, Store,
    properties::{Property, Scope, Value, parse_bool},
};

pub const DEFAULT_PROFILE: &str = "default";

/// Shown instead of a secret kept in the OS keychain.
pub const SECURE_REDACTION_MARKER: &str = "[redacted - source: secure storage]";
/// Shown instead of a secret kept in the configuration file.
pub const FILE_REDACTION_MARKER: &str = "redacted";

/// How a profile is going to be used once selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileAccess {
    /// The profile must already exist.
    Read,
    /// The profile may be new; it is created by the first write.
    Write,
}

type EnvLookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// The selected profile together with the store holding every profile.
pub struct Profile {
    name: String,
    store: Box<dyn Store + Send>,
    env: EnvLookup,
}

impl Profile {
    pub fn new(name: impl Into<String>, store: Box<dyn Store + Send>) -> Self {
        Self {
            name: name.into(),
            store,
            env: Box::new(|key| env::var(key).ok()),
        }
    }

    /// Replace the environment used for overrides.
    #[cfg(test)]
    pub(crate) fn with_env(
        mut self,
        env: impl Fn(&str) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        self.env = Box::new(env);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn exists(&self, name: &str) -> bool {
        self.store.profile_exists(name)
    }

    pub fn set_name(&mut self, name: &str, access: ProfileAccess) -> Result<(), ConfigError> {
        validate_profile_name(name)?;

        if access == ProfileAccess::Read && !self.exists(name) {
            return Err(ConfigError::ProfileNotFound(name.to_string()));
        }

        self.name = name.to_string();
        Ok(())
    }

    pub fn is_secure(&self) -> bool {
        self.store.is_secure()
    }

    pub fn redaction_marker(&self) -> &'static str {
        if self.is_secure() {
            SECURE_REDACTION_MARKER
        } else {
            FILE_REDACTION_MARKER
        }
    }

    /// Stored values of the selected profile with secrets redacted.
    pub fn map(&self) -> BTreeMap<String, Value> {
        let marker = self.redaction_marker();

        self.store
            .get_profile_values(&self.name)
            .into_iter()
            .map(|(key, value)| {
                let secret = Property::from_name(&key).is_some_and(Property::is_secure);
                if secret && !value.is_empty() {
                    (key, Value::from(marker))
                } else {
                    (key, value)
                }
            })
            .collect()
    }

    /// Effective value of a property: environment, then the profile, then the global value.
    pub fn get(&self, property: Property) -> Option<Value> {
        if let Some(raw) = self.env_override(property) {
            if !property.is_boolean() {
                return Some(Value::String(raw));
            }

            match parse_bool(&raw) {
                Some(value) => return Some(Value::Bool(value)),
                None => debug!(%property, %raw, "ignoring invalid boolean override"),
            }
        }

        self.store
            .get_profile_value(&self.name, property.name())
            .or_else(|| match property.scope() {
                Scope::Global => self.store.get_global_value(property.name()),
                Scope::Profile => None,
            })
    }

    /// Value of `MONGODB_ATLAS_<PROPERTY>` or `MCLI_<PROPERTY>`, in that order.
    pub fn env_override(&self, property: Property) -> Option<String> {
        let suffix = property.name().to_uppercase();

        ENV_PREFIXES
            .iter()
            .find_map(|prefix| (self.env)(&format!("{prefix}{suffix}")))
            .filter(|value| !value.is_empty())
    }

    pub fn set(&mut self, property: Property, value: Value) {
        self.store.set_profile_value(&self.name, property.name(), value);
    }

    pub fn set_global(&mut self, property: Property, value: Value) {
        self.store.set_global_value(property.name(), value);
    }

    pub fn save(&mut self) -> Result<(), ConfigError> {
        self.store.save()
    }

    /// Move the selected profile to `new` and select it.
    pub fn rename(&mut self, new: &str, overwrite: bool) -> Result<(), ConfigError> {
        if !self.exists(&self.name) {
            return Err(ConfigError::ProfileNotFound(self.name.clone()));
        }
        validate_profile_name(new)?;

        if self.exists(new) {
            if !overwrite {
                return Err(ConfigError::ProfileAlreadyExists(new.to_string()));
            }
            self.store.delete_profile(new)?;
        }

        self.store.rename_profile(&self.name, new)?;
        debug!(old = %self.name, new, "renamed profile");
        self.name = new.to_string();
        Ok(())
    }

    /// Names of every stored profile, sorted.
    pub fn list(&self) -> Vec<String> {
        self.store.profile_names()
    }

    pub fn delete(&mut self) -> Result<(), ConfigError> {
        if !self.exists(&self.name) {
            return Err(ConfigError::ProfileNotFound(self.name.clone()));
        }

        self.store.delete_profile(&self.name)
    }
}

/// Profile names become TOML table names, keep them to a safe alphabet.
pub fn validate_profile_name(name: &str) -> Result<(), ConfigError> {
    let invalid = || ConfigError::InvalidProfileName(name.to_string());

    if name.is_empty()
        || !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(invalid());
    }

    // A table with this name would collide with the global value
    if Property::from_name(name).is_some_and(|p| p.scope() == Scope::Global) {
        return Err(invalid());
    }

    Ok(())
}
