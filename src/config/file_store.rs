//! TOML backed configuration file.
//!
//! Global properties are top-level keys, each profile is a top-level table:
//!
//! ```toml
//! skip_update_check = true
//!
//! [default]
//! org_id = "5e429f2e06822c6eac4d59c9"
//! ```
use std::{
    collections::BTreeMap,
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use tracing::{debug, trace};

use crate::config::{
    ConfigError, DEFAULT_PROFILE, Store,
    properties::{Property, Scope, Value},
};

const BASE_URL_ALIAS: &str = "base_url";

#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    document: toml::Table,
}

impl FileStore {
    /// Read the configuration file. A missing file is an empty configuration.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();

        let document = match fs::read_to_string(&path) {
            Ok(contents) => toml::from_str::<toml::Table>(&contents).map_err(|source| {
                ConfigError::Parse {
                    path: path.clone(),
                    source,
                }
            })?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "configuration file not found, starting empty");
                toml::Table::new()
            }
            Err(e) => return Err(ConfigError::io("read", path, e)),
        };

        let mut store = Self { path, document };
        store.fold_base_url_alias();
        store.fold_unnamed_profile();
        Ok(store)
    }

    /// `base_url` is the older name of `ops_manager_url`. The current name wins when both are set.
    fn fold_base_url_alias(&mut self) {
        fn fold(table: &mut toml::Table) -> bool {
            if !table.get(BASE_URL_ALIAS).is_some_and(|value| !value.is_table()) {
                return false;
            }
            let Some(value) = table.remove(BASE_URL_ALIAS) else {
                return false;
            };
            table.entry(Property::OpsManagerUrl.name()).or_insert(value);
            true
        }

        let mut folded = fold(&mut self.document);
        for (_, value) in self.document.iter_mut() {
            if let Some(table) = value.as_table_mut() {
                folded |= fold(table);
            }
        }

        if folded {
            debug!("reading {BASE_URL_ALIAS} as {}", Property::OpsManagerUrl);
        }
    }

    /// Older configuration files kept the default profile's settings at the top level.
    /// Move them into the `default` table so every profile looks the same in memory.
    fn fold_unnamed_profile(&mut self) {
        let unnamed: Vec<String> = self
            .document
            .iter()
            .filter(|(key, value)| {
                !value.is_table()
                    && Property::from_name(key).is_some_and(|p| p.scope() == Scope::Profile)
            })
            .map(|(key, _)| key.clone())
            .collect();

        if unnamed.is_empty() {
            return;
        }

        debug!(properties = ?unnamed, "moving top-level properties into the default profile");
        for key in unnamed {
            if let Some(value) = self.document.remove(&key) {
                self.profile_table_mut(DEFAULT_PROFILE)
                    .entry(key)
                    .or_insert(value);
            }
        }
    }

    fn profile_table(&self, profile: &str) -> Option<&toml::Table> {
        self.document.get(profile).and_then(toml::Value::as_table)
    }

    fn profile_table_mut(&mut self, profile: &str) -> &mut toml::Table {
        let entry = self
            .document
            .entry(profile.to_string())
            .or_insert_with(|| toml::Value::Table(toml::Table::new()));

        if !entry.is_table() {
            *entry = toml::Value::Table(toml::Table::new());
        }

        match entry {
            toml::Value::Table(table) => table,
            _ => unreachable!("entry was just replaced with a table"),
        }
    }

    /// Make sure a profile table exists, even when all of its values live elsewhere.
    pub fn ensure_profile(&mut self, profile: &str) {
        self.profile_table_mut(profile);
    }

    /// Drop a property from a profile table, keeping the table itself.
    pub fn remove_profile_value(&mut self, profile: &str, property: &str) {
        let removed = self
            .document
            .get_mut(profile)
            .and_then(toml::Value::as_table_mut)
            .and_then(|table| table.remove(property));

        if removed.is_some() {
            trace!(profile, property, "removed property from configuration file");
        }
    }

    /// Drop a top-level property.
    pub fn remove_global_value(&mut self, property: &str) {
        if self
            .document
            .get(property)
            .is_some_and(|value| !value.is_table())
        {
            self.document.remove(property);
            trace!(property, "removed global property from configuration file");
        }
    }

    /// Write the configuration to a temporary sibling of the real file.
    ///
    /// Nothing is visible to readers until [`StagedFile::commit`] is called. Dropping the
    /// returned [`StagedFile`] without committing removes the temporary file.
    ///
    /// # Returns
    ///
    /// The staged file, or [`ConfigError::Io`] when the directory or the temporary file cannot
    /// be written.
    pub fn stage(&self) -> Result<StagedFile, ConfigError> {
        // Globals first so they are not read back as part of the last profile table
        let (globals, profiles): (Vec<_>, Vec<_>) = self
            .document
            .iter()
            .partition(|(_, value)| !value.is_table());
        let ordered: toml::Table = globals
            .into_iter()
            .chain(profiles)
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        let contents = toml::to_string_pretty(&ordered)?;

        if let Some(dir) = self.path.parent() {
            create_config_dir(dir).map_err(|e| ConfigError::io("create", dir, e))?;
        }

        let temp = self.path.with_extension("toml.tmp");
        let staged = StagedFile {
            temp,
            target: self.path.clone(),
            committed: false,
        };

        write_private(&staged.temp, &contents)
            .map_err(|e| ConfigError::io("write", &staged.temp, e))?;
        trace!(path = %staged.temp.display(), "staged configuration file");

        Ok(staged)
    }
}

impl Store for FileStore {
    fn is_secure(&self) -> bool {
        false
    }

    fn profile_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .document
            .iter()
            .filter(|(_, value)| value.is_table())
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }

    fn profile_exists(&self, name: &str) -> bool {
        self.profile_table(name).is_some()
    }

    fn get_profile_value(&self, profile: &str, property: &str) -> Option<Value> {
        self.profile_table(profile)?.get(property).and_then(value_from_toml)
    }

    fn get_profile_values(&self, profile: &str) -> BTreeMap<String, Value> {
        self.profile_table(profile)
            .map(|table| {
                table
                    .iter()
                    .filter_map(|(key, value)| Some((key.clone(), value_from_toml(value)?)))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn set_profile_value(&mut self, profile: &str, property: &str, value: Value) {
        self.profile_table_mut(profile)
            .insert(property.to_string(), value_to_toml(value));
    }

    fn get_global_value(&self, property: &str) -> Option<Value> {
        self.document
            .get(property)
            .filter(|value| !value.is_table())
            .and_then(value_from_toml)
    }

    fn set_global_value(&mut self, property: &str, value: Value) {
        self.document.insert(property.to_string(), value_to_toml(value));
    }

    fn rename_profile(&mut self, old: &str, new: &str) -> Result<(), ConfigError> {
        if !self.profile_exists(old) {
            return Err(ConfigError::ProfileNotFound(old.to_string()));
        }

        if let Some(table) = self.document.remove(old) {
            self.document.insert(new.to_string(), table);
        }
        Ok(())
    }

    fn delete_profile(&mut self, name: &str) -> Result<(), ConfigError> {
        if !self.profile_exists(name) {
            return Err(ConfigError::ProfileNotFound(name.to_string()));
        }

        self.document.remove(name);
        Ok(())
    }

    fn save(&mut self) -> Result<(), ConfigError> {
        self.stage()?.commit()
    }
}

/// A fully written configuration file waiting to replace the real one.
///
/// Dropping it without committing removes the temporary file.
#[derive(Debug)]
pub struct StagedFile {
    temp: PathBuf,
    target: PathBuf,
    committed: bool,
}

impl StagedFile {
    pub fn commit(mut self) -> Result<(), ConfigError> {
        fs::rename(&self.temp, &self.target)
            .map_err(|e| ConfigError::io("replace", &self.target, e))?;
        self.committed = true;
        debug!(path = %self.target.display(), "saved configuration file");
        Ok(())
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if !self.committed {
            let _ = fs::remove_file(&self.temp);
        }
    }
}

/// Create the configuration file if it does not exist yet.
pub fn ensure_exists(path: &Path) -> Result<(), ConfigError> {
    if path.exists() {
        return Ok(());
    }

    if let Some(dir) = path.parent() {
        create_config_dir(dir).map_err(|e| ConfigError::io("create", dir, e))?;
    }
    write_private(path, "").map_err(|e| ConfigError::io("create", path, e))
}

fn create_config_dir(dir: &Path) -> io::Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }

    builder.create(dir)
}

fn write_private(path: &Path, contents: &str) -> io::Result<()> {
    // The mode only applies on creation, start from a fresh file
    match fs::remove_file(path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => return Err(e),
        _ => {}
    }

    let mut options = fs::OpenOptions::new();
    options.write(true).create_new(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    file.write_all(contents.as_bytes())?;
    file.sync_all()
}

fn value_from_toml(value: &toml::Value) -> Option<Value> {
    match value {
        toml::Value::String(s) => Some(Value::String(s.clone())),
        toml::Value::Boolean(b) => Some(Value::Bool(*b)),
        toml::Value::Integer(i) => Some(Value::String(i.to_string())),
        toml::Value::Float(f) => Some(Value::String(f.to_string())),
        toml::Value::Datetime(d) => Some(Value::String(d.to_string())),
        toml::Value::Array(_) | toml::Value::Table(_) => None,
    }
}

fn value_to_toml(value: Value) -> toml::Value {
    match value {
        Value::String(s) => toml::Value::String(s),
        Value::Bool(b) => toml::Value::Boolean(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_path(temp_dir: &TempDir) -> PathBuf {
        temp_dir.path().join("atlascli").join("config.toml")
    }

    fn write_config(temp_dir: &TempDir, contents: &str) -> PathBuf {
        let path = config_path(temp_dir);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::load(config_path(&temp_dir)).unwrap();

        assert!(store.profile_names().is_empty());
        assert!(!store.profile_exists(DEFAULT_PROFILE));
    }

    #[test]
    fn test_load_profiles_and_globals() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(
            &temp_dir,
            r#"
skip_update_check = true

[e2e]
org_id = "5cac6a2179358edabd12b572"
service = "cloud"

[atlas]
ops_manager_url = "http://om.example.com/"
"#,
        );

        let store = FileStore::load(path).unwrap();

        assert_eq!(store.profile_names(), vec!["atlas", "e2e"]);
        assert_eq!(
            store.get_profile_value("e2e", "org_id"),
            Some(Value::from("5cac6a2179358edabd12b572"))
        );
        assert_eq!(store.get_profile_value("atlas", "org_id"), None);
        assert_eq!(
            store.get_global_value("skip_update_check"),
            Some(Value::Bool(true))
        );
        assert_eq!(store.get_global_value("e2e"), None);
        assert_eq!(store.get_profile_values("e2e").len(), 2);
    }

    #[test]
    fn test_load_invalid_toml() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(&temp_dir, "[default\norg_id = ");

        let err = FileStore::load(path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_unnamed_profile_is_folded_into_default() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(
            &temp_dir,
            r#"
org_id = "5cac6a2179358edabd12b572"
telemetry_enabled = false

[atlas]
service = "cloud"
"#,
        );

        let store = FileStore::load(path).unwrap();

        assert_eq!(store.profile_names(), vec!["atlas", "default"]);
        assert_eq!(
            store.get_profile_value(DEFAULT_PROFILE, "org_id"),
            Some(Value::from("5cac6a2179358edabd12b572"))
        );
        assert_eq!(store.get_global_value("org_id"), None);
        assert_eq!(
            store.get_global_value("telemetry_enabled"),
            Some(Value::Bool(false))
        );
    }

    #[test]
    fn test_base_url_is_read_as_ops_manager_url() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(
            &temp_dir,
            r#"
base_url = "http://legacy.example.com/"

[om]
base_url = "http://om.example.com/"

[both]
base_url = "http://old.example.com/"
ops_manager_url = "http://new.example.com/"
"#,
        );

        let mut store = FileStore::load(&path).unwrap();

        assert_eq!(
            store.get_profile_value("om", "ops_manager_url"),
            Some(Value::from("http://om.example.com/"))
        );
        assert_eq!(
            store.get_profile_value("both", "ops_manager_url"),
            Some(Value::from("http://new.example.com/"))
        );
        assert_eq!(
            store.get_profile_value(DEFAULT_PROFILE, "ops_manager_url"),
            Some(Value::from("http://legacy.example.com/"))
        );
        assert_eq!(store.get_profile_value("om", "base_url"), None);

        store.save().unwrap();
        assert!(!fs::read_to_string(&path).unwrap().contains("base_url"));
    }

    #[test]
    fn test_save_and_reload() {
        let temp_dir = TempDir::new().unwrap();
        let path = config_path(&temp_dir);

        let mut store = FileStore::load(&path).unwrap();
        store.set_profile_value("default", "org_id", Value::from("5e429f2e06822c6eac4d59c9"));
        store.set_profile_value("default", "ops_manager_skip_verify", Value::Bool(true));
        store.set_global_value("skip_update_check", Value::Bool(true));
        store.save().unwrap();

        let reloaded = FileStore::load(&path).unwrap();
        assert!(reloaded.profile_exists("default"));
        assert_eq!(
            reloaded.get_profile_value("default", "org_id"),
            Some(Value::from("5e429f2e06822c6eac4d59c9"))
        );
        assert_eq!(
            reloaded.get_profile_value("default", "ops_manager_skip_verify"),
            Some(Value::Bool(true))
        );
        assert_eq!(
            reloaded.get_global_value("skip_update_check"),
            Some(Value::Bool(true))
        );
        assert!(!path.with_extension("toml.tmp").exists());
    }

    #[test]
    fn test_save_keeps_unknown_keys() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(
            &temp_dir,
            r#"
[default]
custom_setting = "kept"
"#,
        );

        let mut store = FileStore::load(&path).unwrap();
        store.set_profile_value("default", "output", Value::from("json"));
        store.save().unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("custom_setting = \"kept\""));
        assert!(contents.contains("output = \"json\""));
    }

    #[cfg(unix)]
    #[test]
    fn test_save_writes_private_file() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let path = config_path(&temp_dir);

        let mut store = FileStore::load(&path).unwrap();
        store.set_profile_value("default", "service", Value::from("cloud"));
        store.save().unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_dropped_stage_leaves_original_untouched() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(&temp_dir, "[default]\nservice = \"cloud\"\n");

        let mut store = FileStore::load(&path).unwrap();
        store.set_profile_value("default", "service", Value::from("ops-manager"));

        let staged = store.stage().unwrap();
        assert!(path.with_extension("toml.tmp").exists());
        drop(staged);

        assert!(!path.with_extension("toml.tmp").exists());
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "[default]\nservice = \"cloud\"\n"
        );
    }

    #[test]
    fn test_rename_profile() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = FileStore::load(config_path(&temp_dir)).unwrap();
        store.set_profile_value("e2e", "org_id", Value::from("5e429f2e06822c6eac4d59c9"));

        store.rename_profile("e2e", "renamed").unwrap();

        assert!(!store.profile_exists("e2e"));
        assert_eq!(
            store.get_profile_value("renamed", "org_id"),
            Some(Value::from("5e429f2e06822c6eac4d59c9"))
        );
        assert!(matches!(
            store.rename_profile("e2e", "other"),
            Err(ConfigError::ProfileNotFound(name)) if name == "e2e"
        ));
    }

    #[test]
    fn test_delete_profile() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = FileStore::load(config_path(&temp_dir)).unwrap();
        store.set_profile_value("e2e", "service", Value::from("cloud"));

        store.delete_profile("e2e").unwrap();

        assert!(!store.profile_exists("e2e"));
        assert!(matches!(
            store.delete_profile("e2e"),
            Err(ConfigError::ProfileNotFound(_))
        ));
    }

    #[test]
    fn test_ensure_profile_creates_empty_table() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = FileStore::load(config_path(&temp_dir)).unwrap();

        store.ensure_profile("secrets-only");

        assert!(store.profile_exists("secrets-only"));
        assert!(store.get_profile_values("secrets-only").is_empty());
    }

    #[test]
    fn test_remove_profile_value() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(
            &temp_dir,
            "telemetry_enabled = true\n\n[e2e]\npublic_api_key = \"plaintext\"\nservice = \"cloud\"\n",
        );
        let mut store = FileStore::load(&path).unwrap();

        store.remove_profile_value("e2e", "public_api_key");
        store.remove_profile_value("missing", "public_api_key");
        store.remove_global_value("telemetry_enabled");
        // A profile table is not a global value
        store.remove_global_value("e2e");
        store.save().unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert!(!contents.contains("plaintext"));
        assert!(!contents.contains("telemetry_enabled"));
        assert!(!store.profile_exists("missing"));
        assert_eq!(
            store.get_profile_value("e2e", "service"),
            Some(Value::from("cloud"))
        );
    }

    #[test]
    fn test_ensure_exists_creates_file_once() {
        let temp_dir = TempDir::new().unwrap();
        let path = config_path(&temp_dir);

        ensure_exists(&path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "");

        fs::write(&path, "[default]\n").unwrap();
        ensure_exists(&path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "[default]\n");
    }
}
