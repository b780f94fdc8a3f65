//! Secret storage in the OS keychain.
//!
//! Secrets are cached when the store is created and changes are queued until [`SecureStore::save`],
//! so a command either writes all of its keychain changes or none of them.
use std::{
    collections::{HashMap, HashSet},
    env,
};

use keyring::Entry;
use tracing::{debug, trace, warn};

use crate::config::{ConfigError, properties::Property};

/// Setting this variable makes the tool behave as if no OS keychain was present.
pub const DISABLE_KEYRING_ENV: &str = "ATLAS_CONFIG_DISABLE_KEYRING";

const SERVICE_PREFIX: &str = "atlascli_";
const CHECK_SERVICE: &str = "atlascli_availability_check";
const CHECK_USER: &str = "check";

/// Storage for secret profile properties.
pub trait SecureStore {
    /// Whether the backend can be used on this machine.
    fn available(&self) -> bool;
    fn get(&self, profile: &str, property: &str) -> Option<String>;
    fn set(&mut self, profile: &str, property: &str, value: &str);
    fn rename_profile(&mut self, old: &str, new: &str);
    fn delete_profile(&mut self, profile: &str);
    /// Apply all pending changes.
    fn save(&mut self) -> Result<(), ConfigError>;
    /// Undo the last successful [`SecureStore::save`] and queue its changes again.
    ///
    /// Used when the configuration file could not be replaced after the keychain was updated.
    fn revert(&mut self);
}

/// Thin client over the OS keychain.
pub trait KeyringClient {
    fn available(&self) -> bool;
    fn get(&self, service: &str, user: &str) -> keyring::Result<String>;
    fn set(&self, service: &str, user: &str, password: &str) -> keyring::Result<()>;
    fn delete(&self, service: &str, user: &str) -> keyring::Result<()>;
}

/// [`KeyringClient`] backed by the platform credential store.
#[derive(Debug, Default, Clone)]
pub struct OsKeyring;

impl OsKeyring {
    pub fn new() -> Self {
        Self
    }
}

impl KeyringClient for OsKeyring {
    fn available(&self) -> bool {
        if env::var_os(DISABLE_KEYRING_ENV).is_some() {
            debug!("secure storage disabled by {DISABLE_KEYRING_ENV}");
            return false;
        }

        let check = || -> keyring::Result<()> {
            let entry = Entry::new(CHECK_SERVICE, CHECK_USER)?;
            entry.set_password(CHECK_USER)?;
            entry.delete_credential()
        };

        match check() {
            Ok(()) => true,
            Err(e) => {
                debug!(error = %e, "secure storage is not available");
                false
            }
        }
    }

    fn get(&self, service: &str, user: &str) -> keyring::Result<String> {
        Entry::new(service, user)?.get_password()
    }

    fn set(&self, service: &str, user: &str, password: &str) -> keyring::Result<()> {
        Entry::new(service, user)?.set_password(password)
    }

    fn delete(&self, service: &str, user: &str) -> keyring::Result<()> {
        match Entry::new(service, user)?.delete_credential() {
            Err(keyring::Error::NoEntry) => Ok(()),
            result => result,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PendingOp {
    Set {
        profile: String,
        property: String,
        value: String,
    },
    Delete {
        profile: String,
        property: String,
    },
}

impl PendingOp {
    fn key(&self) -> (&str, &str) {
        match self {
            PendingOp::Set {
                profile, property, ..
            }
            | PendingOp::Delete { profile, property } => (profile, property),
        }
    }
}

/// [`SecureStore`] over a [`KeyringClient`].
///
/// Each profile maps to the keychain service `atlascli_<profile>` with one entry per property.
pub struct KeyringStore {
    client: Box<dyn KeyringClient + Send>,
    available: bool,
    cache: HashMap<String, HashMap<String, String>>,
    // What the keychain held when loaded or last saved, used to undo a failed save
    persisted: HashMap<(String, String), String>,
    pending: Vec<PendingOp>,
    last_save: Option<LastSave>,
}

/// Changes applied by the last save together with the keychain state they replaced.
struct LastSave {
    applied: Vec<PendingOp>,
    persisted: HashMap<(String, String), String>,
}

impl KeyringStore {
    /// Create the store and read the secrets of every known profile.
    pub fn new(profile_names: &[String], client: Box<dyn KeyringClient + Send>) -> Self {
        let available = client.available();
        let mut store = Self {
            client,
            available,
            cache: HashMap::new(),
            persisted: HashMap::new(),
            pending: Vec::new(),
            last_save: None,
        };

        if available {
            for profile in profile_names {
                store.load_profile(profile);
            }
        }

        store
    }

    fn load_profile(&mut self, profile: &str) {
        let service = service_name(profile);
        let values = self.cache.entry(profile.to_string()).or_default();

        for property in secure_properties() {
            match self.client.get(&service, property) {
                Ok(value) => {
                    self.persisted
                        .insert((profile.to_string(), property.to_string()), value.clone());
                    values.insert(property.to_string(), value);
                }
                Err(keyring::Error::NoEntry) => {}
                Err(e) => debug!(profile, property, error = %e, "failed to read secret"),
            }
        }
    }

    fn apply(&self, op: &PendingOp) -> keyring::Result<()> {
        match op {
            PendingOp::Set {
                profile,
                property,
                value,
            } => self.client.set(&service_name(profile), property, value),
            PendingOp::Delete { profile, property } => {
                self.client.delete(&service_name(profile), property)
            }
        }
    }

    /// Put back what the keychain held (`persisted`) before `applied` ran, most recent first.
    fn roll_back(&self, applied: &[PendingOp], persisted: &HashMap<(String, String), String>) {
        let mut restored = HashSet::new();

        for op in applied.iter().rev() {
            let (profile, property) = op.key();
            if !restored.insert((profile, property)) {
                continue;
            }

            let service = service_name(profile);
            let result = match persisted.get(&(profile.to_string(), property.to_string())) {
                Some(value) => self.client.set(&service, property, value),
                None => self.client.delete(&service, property),
            };

            if let Err(e) = result {
                warn!(profile, property, error = %e, "failed to restore secret");
            }
        }
    }
}

impl SecureStore for KeyringStore {
    fn available(&self) -> bool {
        self.available
    }

    fn get(&self, profile: &str, property: &str) -> Option<String> {
        self.cache.get(profile)?.get(property).cloned()
    }

    fn set(&mut self, profile: &str, property: &str, value: &str) {
        if !is_secure_property(property) {
            return;
        }

        self.cache
            .entry(profile.to_string())
            .or_default()
            .insert(property.to_string(), value.to_string());
        self.pending.push(PendingOp::Set {
            profile: profile.to_string(),
            property: property.to_string(),
            value: value.to_string(),
        });
    }

    fn rename_profile(&mut self, old: &str, new: &str) {
        let moved = self.cache.remove(old).unwrap_or_default();
        let replaced = self.cache.remove(new).unwrap_or_default();

        for property in replaced.keys().filter(|p| !moved.contains_key(*p)) {
            self.pending.push(PendingOp::Delete {
                profile: new.to_string(),
                property: property.clone(),
            });
        }

        for (property, value) in &moved {
            self.pending.push(PendingOp::Delete {
                profile: old.to_string(),
                property: property.clone(),
            });
            self.pending.push(PendingOp::Set {
                profile: new.to_string(),
                property: property.clone(),
                value: value.clone(),
            });
        }

        self.cache.insert(new.to_string(), moved);
    }

    fn delete_profile(&mut self, profile: &str) {
        let Some(values) = self.cache.remove(profile) else {
            return;
        };

        for property in values.into_keys() {
            self.pending.push(PendingOp::Delete {
                profile: profile.to_string(),
                property,
            });
        }
    }

    fn save(&mut self) -> Result<(), ConfigError> {
        let pending = std::mem::take(&mut self.pending);

        for (index, op) in pending.iter().enumerate() {
            trace!(?op, "applying secure storage change");

            if let Err(source) = self.apply(op) {
                self.roll_back(&pending[..index], &self.persisted);
                // Keep the changes queued so the caller can retry
                self.pending = pending.clone();
                return Err(ConfigError::Keyring {
                    profile: op.key().0.to_string(),
                    source,
                });
            }
        }

        let before = self.persisted.clone();
        for op in &pending {
            match op {
                PendingOp::Set {
                    profile,
                    property,
                    value,
                } => {
                    self.persisted
                        .insert((profile.clone(), property.clone()), value.clone());
                }
                PendingOp::Delete { profile, property } => {
                    self.persisted.remove(&(profile.clone(), property.clone()));
                }
            }
        }
        self.last_save = Some(LastSave {
            applied: pending,
            persisted: before,
        });

        Ok(())
    }

    fn revert(&mut self) {
        let Some(last_save) = self.last_save.take() else {
            return;
        };

        debug!(
            changes = last_save.applied.len(),
            "reverting secure storage changes"
        );
        self.roll_back(&last_save.applied, &last_save.persisted);
        self.persisted = last_save.persisted;
        self.pending = last_save.applied;
    }
}

fn service_name(profile: &str) -> String {
    format!("{SERVICE_PREFIX}{profile}")
}

fn secure_properties() -> impl Iterator<Item = &'static str> {
    Property::ALL
        .into_iter()
        .filter(|p| p.is_secure())
        .map(Property::name)
}

pub fn is_secure_property(property: &str) -> bool {
    Property::from_name(property).is_some_and(Property::is_secure)
}


#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use mockall::{Sequence, predicate::eq};

    use super::mocks::MockKeyringClient;
    use super::*;

    fn names(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    /// A client where every secret of `profile` is missing except the given ones.
    fn client_with(
        profile: &'static str,
        existing: &'static [(&'static str, &'static str)],
    ) -> MockKeyringClient {
        let mut client = MockKeyringClient::new();
        client.expect_available().return_const(true);
        client
            .expect_get()
            .withf(move |service, _| service == format!("atlascli_{profile}"))
            .returning(move |_, user| {
                existing
                    .iter()
                    .find(|(property, _)| *property == user)
                    .map(|(_, value)| value.to_string())
                    .ok_or(keyring::Error::NoEntry)
            });
        client
    }

    #[test]
    fn test_new_loads_existing_secrets() {
        let mut client = MockKeyringClient::new();
        client.expect_available().return_const(true);
        client
            .expect_get()
            .returning(|service, user| match (service, user) {
                ("atlascli_profile1", "public_api_key") => Ok("existing_public_1".to_string()),
                ("atlascli_profile1", "access_token") => Ok("existing_access_1".to_string()),
                ("atlascli_profile2", "private_api_key") => Ok("existing_private_2".to_string()),
                _ => Err(keyring::Error::NoEntry),
            });

        let store = KeyringStore::new(&names(&["profile1", "profile2"]), Box::new(client));

        assert!(store.available());
        assert_eq!(
            store.get("profile1", "public_api_key").as_deref(),
            Some("existing_public_1")
        );
        assert_eq!(
            store.get("profile1", "access_token").as_deref(),
            Some("existing_access_1")
        );
        assert_eq!(
            store.get("profile2", "private_api_key").as_deref(),
            Some("existing_private_2")
        );
        assert_eq!(store.get("profile1", "private_api_key"), None);
        assert_eq!(store.get("missing", "public_api_key"), None);
        assert!(store.pending.is_empty());
    }

    #[test]
    fn test_new_skips_loading_when_unavailable() {
        let mut client = MockKeyringClient::new();
        client.expect_available().return_const(false);
        client.expect_get().never();

        let store = KeyringStore::new(&names(&["profile1"]), Box::new(client));

        assert!(!store.available());
    }

    #[test]
    fn test_set_queues_only_secure_properties() {
        let client = client_with("profile1", &[]);
        let mut store = KeyringStore::new(&names(&["profile1"]), Box::new(client));

        store.set("profile1", "public_api_key", "test_public_key");
        store.set("profile1", "org_id", "5e429f2e06822c6eac4d59c9");
        store.set("new_profile", "private_api_key", "new_private_key");

        assert_eq!(
            store.get("profile1", "public_api_key").as_deref(),
            Some("test_public_key")
        );
        assert_eq!(store.get("profile1", "org_id"), None);
        assert_eq!(
            store.get("new_profile", "private_api_key").as_deref(),
            Some("new_private_key")
        );
        assert_eq!(
            store.pending,
            vec![
                PendingOp::Set {
                    profile: "profile1".to_string(),
                    property: "public_api_key".to_string(),
                    value: "test_public_key".to_string(),
                },
                PendingOp::Set {
                    profile: "new_profile".to_string(),
                    property: "private_api_key".to_string(),
                    value: "new_private_key".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_save_applies_pending_operations() {
        let mut client = client_with("e2e", &[("public_api_key", "old")]);
        let mut seq = Sequence::new();
        client
            .expect_set()
            .with(eq("atlascli_e2e"), eq("public_api_key"), eq("new"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(()));
        client
            .expect_delete()
            .with(eq("atlascli_e2e"), eq("public_api_key"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));

        let mut store = KeyringStore::new(&names(&["e2e"]), Box::new(client));
        store.set("e2e", "public_api_key", "new");
        store.delete_profile("e2e");

        store.save().unwrap();

        assert!(store.pending.is_empty());
        assert!(store.persisted.is_empty());
    }

    #[test]
    fn test_rename_moves_secrets() {
        let client = client_with("e2e", &[("private_api_key", "secret")]);
        let mut store = KeyringStore::new(&names(&["e2e"]), Box::new(client));

        store.rename_profile("e2e", "renamed");

        assert_eq!(store.get("e2e", "private_api_key"), None);
        assert_eq!(
            store.get("renamed", "private_api_key").as_deref(),
            Some("secret")
        );
        assert_eq!(
            store.pending,
            vec![
                PendingOp::Delete {
                    profile: "e2e".to_string(),
                    property: "private_api_key".to_string(),
                },
                PendingOp::Set {
                    profile: "renamed".to_string(),
                    property: "private_api_key".to_string(),
                    value: "secret".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_failed_save_rolls_back_applied_changes() {
        let mut client = client_with("e2e", &[("public_api_key", "old_public")]);
        client
            .expect_set()
            .with(eq("atlascli_e2e"), eq("public_api_key"), eq("new_public"))
            .times(1)
            .returning(|_, _, _| Ok(()));
        client
            .expect_set()
            .with(eq("atlascli_e2e"), eq("private_api_key"), eq("new_private"))
            .times(1)
            .returning(|_, _, _| Err(keyring::Error::NoStorageAccess("locked".into())));
        // Roll back restores the value read when the store was created
        client
            .expect_set()
            .with(eq("atlascli_e2e"), eq("public_api_key"), eq("old_public"))
            .times(1)
            .returning(|_, _, _| Ok(()));

        let mut store = KeyringStore::new(&names(&["e2e"]), Box::new(client));
        store.set("e2e", "public_api_key", "new_public");
        store.set("e2e", "private_api_key", "new_private");

        let err = store.save().unwrap_err();

        assert!(matches!(err, ConfigError::Keyring { ref profile, .. } if profile == "e2e"));
        assert_eq!(store.pending.len(), 2);
    }

    #[test]
    fn test_revert_restores_previous_secrets() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut client = client_with("e2e", &[("public_api_key", "old_public")]);
        let set_calls = calls.clone();
        client.expect_set().returning(move |service, user, password| {
            set_calls
                .lock()
                .unwrap()
                .push(format!("set {service} {user} {password}"));
            Ok(())
        });
        let delete_calls = calls.clone();
        client.expect_delete().returning(move |service, user| {
            delete_calls
                .lock()
                .unwrap()
                .push(format!("delete {service} {user}"));
            Ok(())
        });

        let mut store = KeyringStore::new(&names(&["e2e"]), Box::new(client));
        store.set("e2e", "public_api_key", "new_public");
        store.set("e2e", "private_api_key", "new_private");
        store.save().unwrap();

        store.revert();

        assert_eq!(
            *calls.lock().unwrap(),
            vec![
                "set atlascli_e2e public_api_key new_public",
                "set atlascli_e2e private_api_key new_private",
                "delete atlascli_e2e private_api_key",
                "set atlascli_e2e public_api_key old_public",
            ]
        );
        assert_eq!(store.pending.len(), 2);
        assert_eq!(
            store.persisted.get(&("e2e".to_string(), "public_api_key".to_string())),
            Some(&"old_public".to_string())
        );

        // Nothing left to undo
        store.revert();
        assert_eq!(calls.lock().unwrap().len(), 4);
    }

    #[test]
    fn test_revert_without_save_does_nothing() {
        let mut client = client_with("e2e", &[]);
        client.expect_set().never();
        client.expect_delete().never();

        let mut store = KeyringStore::new(&names(&["e2e"]), Box::new(client));
        store.set("e2e", "public_api_key", "queued");

        store.revert();

        assert_eq!(store.pending.len(), 1);
    }

    #[cfg(any(target_os = "linux", target_os = "macos", target_os = "windows"))]
    #[test]
    fn test_default_keychain_outlives_reboots() {
        use keyring::credential::{CredentialBuilderApi, CredentialPersistence};

        let persistence = keyring::default::default_credential_builder().persistence();

        assert!(
            matches!(persistence, CredentialPersistence::UntilDelete),
            "secrets saved to the OS keychain would not survive a reboot"
        );
    }

    #[test]
    fn test_is_secure_property() {
        assert!(is_secure_property("public_api_key"));
        assert!(is_secure_property("private_api_key"));
        assert!(is_secure_property("access_token"));
        assert!(is_secure_property("refresh_token"));
        assert!(!is_secure_property("base_url"));
        assert!(!is_secure_property("project_id"));
        assert!(!is_secure_property("output"));
        assert!(!is_secure_property(""));
    }
}
