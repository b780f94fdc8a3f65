use std::collections::BTreeMap;

use tracing::debug;

use crate::config::{
    ConfigError, DEFAULT_PROFILE, FileStore, SecureStore,
    properties::{Property, Value},
    secure::is_secure_property,
};

/// Storage backend for profiles and global properties.
///
/// Setters, renames and deletes only change the in-memory view. Nothing reaches the disk or the
/// keychain until [`Store::save`] is called.
pub trait Store {
    /// Whether secret properties are kept out of the configuration file.
    fn is_secure(&self) -> bool;
    /// Profile names, sorted.
    fn profile_names(&self) -> Vec<String>;
    fn profile_exists(&self, name: &str) -> bool;
    fn get_profile_value(&self, profile: &str, property: &str) -> Option<Value>;
    /// Every stored property of `profile`, secrets included, keyed by property name.
    fn get_profile_values(&self, profile: &str) -> BTreeMap<String, Value>;
    /// Set one property of a profile, creating the profile if it does not exist yet.
    ///
    /// # Arguments
    ///
    /// * `profile` - The profile to write to.
    /// * `property` - The property name, already validated by the caller.
    /// * `value` - The new value.
    fn set_profile_value(&mut self, profile: &str, property: &str, value: Value);
    fn get_global_value(&self, property: &str) -> Option<Value>;
    fn set_global_value(&mut self, property: &str, value: Value);
    /// Move every property of `old` to `new`, replacing whatever `new` held.
    ///
    /// Fails with [`ConfigError::ProfileNotFound`] when `old` does not exist.
    fn rename_profile(&mut self, old: &str, new: &str) -> Result<(), ConfigError>;
    /// Remove a profile and all of its properties.
    fn delete_profile(&mut self, name: &str) -> Result<(), ConfigError>;
    /// Persist every pending change.
    fn save(&mut self) -> Result<(), ConfigError>;
}

/// Pick the store for this machine: secrets go to `secure` when it is available.
pub fn new_store(
    insecure: FileStore,
    secure: Box<dyn SecureStore + Send>,
) -> Box<dyn Store + Send> {
    if secure.available() {
        Box::new(ProxyStore::new(insecure, secure))
    } else {
        debug!("secure storage unavailable, keeping secrets in the configuration file");
        Box::new(insecure)
    }
}

/// Routes secret properties to a [`SecureStore`] and everything else to the [`FileStore`].
pub struct ProxyStore {
    insecure: FileStore,
    secure: Box<dyn SecureStore + Send>,
}

impl ProxyStore {
    pub fn new(insecure: FileStore, secure: Box<dyn SecureStore + Send>) -> Self {
        Self { insecure, secure }
    }
}

impl Store for ProxyStore {
    fn is_secure(&self) -> bool {
        true
    }

    fn profile_names(&self) -> Vec<String> {
        self.insecure.profile_names()
    }

    fn profile_exists(&self, name: &str) -> bool {
        self.insecure.profile_exists(name)
    }

    fn get_profile_value(&self, profile: &str, property: &str) -> Option<Value> {
        if is_secure_property(property) {
            self.secure.get(profile, property).map(Value::String)
        } else {
            self.insecure.get_profile_value(profile, property)
        }
    }

    fn get_profile_values(&self, profile: &str) -> BTreeMap<String, Value> {
        let mut values = self.insecure.get_profile_values(profile);
        // Secrets left in the file by an older version are shadowed by the keychain
        values.retain(|property, _| !is_secure_property(property));

        for property in Property::ALL.into_iter().filter(|p| p.is_secure()) {
            if let Some(value) = self.secure.get(profile, property.name()) {
                values.insert(property.name().to_string(), Value::String(value));
            }
        }

        values
    }

    fn set_profile_value(&mut self, profile: &str, property: &str, value: Value) {
        if is_secure_property(property) {
            // The file keeps an entry so the profile is still listed, but never the secret
            self.insecure.ensure_profile(profile);
            self.insecure.remove_profile_value(profile, property);
            self.secure.set(profile, property, &value.to_string());
        } else {
            self.insecure.set_profile_value(profile, property, value);
        }
    }

    fn get_global_value(&self, property: &str) -> Option<Value> {
        if is_secure_property(property) {
            self.secure.get(DEFAULT_PROFILE, property).map(Value::String)
        } else {
            self.insecure.get_global_value(property)
        }
    }

    fn set_global_value(&mut self, property: &str, value: Value) {
        if is_secure_property(property) {
            self.insecure.remove_global_value(property);
            self.secure.set(DEFAULT_PROFILE, property, &value.to_string());
        } else {
            self.insecure.set_global_value(property, value);
        }
    }

    fn rename_profile(&mut self, old: &str, new: &str) -> Result<(), ConfigError> {
        self.insecure.rename_profile(old, new)?;
        self.secure.rename_profile(old, new);
        Ok(())
    }

    fn delete_profile(&mut self, name: &str) -> Result<(), ConfigError> {
        self.insecure.delete_profile(name)?;
        self.secure.delete_profile(name);
        Ok(())
    }

    /// The file is staged first and only replaced once the keychain accepted every change.
    /// If replacing the file fails, the keychain changes are reverted.
    fn save(&mut self) -> Result<(), ConfigError> {
        let staged = self.insecure.stage()?;
        self.secure.save()?;

        staged.commit().inspect_err(|_| self.secure.revert())
    }
}
