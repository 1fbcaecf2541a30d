//! Key/value storage backends for the session token.
//!
//! The token store never touches a concrete backend directly; it is handed a
//! [`KeyValueStorage`] at construction so tests can run against
//! [`MemoryStorage`] while the CLI persists to disk or the OS keychain.

use std::collections::{BTreeMap, HashMap};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use keyring::Entry;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, warn};

/// Storage file name in the data directory
pub const STORAGE_FILE: &str = "storage.json";

/// Keychain service name used for keyring entries
pub const SERVICE_NAME: &str = "retailpos";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Storage file {path} is not a string map: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Keychain error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("Keychain accepted {key} but did not keep it")]
    NotPersisted { key: String },
}

/// A synchronous string key/value store.
pub trait KeyValueStorage: Send + Sync {
    /// Gets the value for the given key, or None if not found
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Sets the value for the given key, replacing any previous value
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes the entry for the given key. Missing keys are not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// In-process storage, lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // A poisoned map is still a valid map; nothing here can leave it half-written.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries().remove(key);
        Ok(())
    }
}

/// A JSON object file of string values, re-read on every access.
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    /// Storage backed by `storage.json` inside `dir`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(STORAGE_FILE))
    }

    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StorageError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let contents = std::fs::read_to_string(&self.path).map_err(|e| self.io_error(e))?;
        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&contents).map_err(|source| StorageError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    /// Entries to update. A corrupt file is replaced rather than blocking writes.
    fn read_for_update(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match self.read_all() {
            Err(StorageError::Corrupt { source, .. }) => {
                warn!(path = %self.path.display(), error = %source, "Discarding unreadable storage file");
                Ok(BTreeMap::new())
            }
            other => other,
        }
    }

    /// Write through a temp file in the same directory, renamed into place
    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir).map_err(|e| self.io_error(e))?;

        let contents = serde_json::to_string_pretty(entries).map_err(|source| StorageError::Corrupt {
            path: self.path.clone(),
            source,
        })?;
        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| self.io_error(e))?;
        tmp.write_all(contents.as_bytes()).map_err(|e| self.io_error(e))?;
        tmp.as_file().sync_all().map_err(|e| self.io_error(e))?;
        tmp.persist(&self.path).map_err(|e| self.io_error(e.error))?;
        Ok(())
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.read_for_update()?;
        entries.insert(key.to_string(), value.to_string());
        self.write_all(&entries)?;
        debug!(key, path = %self.path.display(), "Stored entry");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = match self.read_all() {
            Ok(entries) => entries,
            Err(StorageError::Corrupt { source, .. }) => {
                warn!(path = %self.path.display(), error = %source, "Discarding unreadable storage file");
                return self.write_all(&BTreeMap::new());
            }
            Err(e) => return Err(e),
        };
        if entries.remove(key).is_none() {
            return Ok(());
        }
        self.write_all(&entries)?;
        debug!(key, path = %self.path.display(), "Removed entry");
        Ok(())
    }
}

/// OS keychain storage, one keychain entry per key.
pub struct KeyringStorage {
    service: String,
}

impl KeyringStorage {
    pub fn new() -> Self {
        Self::with_service(SERVICE_NAME)
    }

    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self, key: &str) -> Result<Entry, StorageError> {
        Ok(Entry::new(&self.service, key)?)
    }
}

impl Default for KeyringStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStorage for KeyringStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match self.entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Reads the value back through a fresh entry, so a keychain that
    /// accepts writes without keeping them is reported instead of ignored.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entry(key)?.set_password(value)?;
        match self.get(key)? {
            Some(stored) if stored == value => Ok(()),
            _ => Err(StorageError::NotPersisted {
                key: key.to_string(),
            }),
        }
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match self.entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage_overwrite_and_remove() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get("jwt").unwrap(), None);

        storage.set("jwt", "first").unwrap();
        storage.set("jwt", "second").unwrap();
        assert_eq!(storage.get("jwt").unwrap().as_deref(), Some("second"));

        storage.remove("jwt").unwrap();
        storage.remove("jwt").unwrap(); // missing key is fine
        assert_eq!(storage.get("jwt").unwrap(), None);
    }

    #[test]
    fn test_file_storage_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::in_dir(dir.path().join("nested"));
        assert_eq!(storage.get("jwt").unwrap(), None);
        storage.remove("jwt").unwrap();
        assert!(!storage.path().exists());
    }

    #[test]
    fn test_file_storage_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        FileStorage::in_dir(dir.path().join("nested")).set("jwt", "a.b.c").unwrap();

        let reopened = FileStorage::in_dir(dir.path().join("nested"));
        assert_eq!(reopened.get("jwt").unwrap().as_deref(), Some("a.b.c"));

        reopened.remove("jwt").unwrap();
        assert_eq!(FileStorage::in_dir(dir.path().join("nested")).get("jwt").unwrap(), None);
        // File stays behind as an empty map
        let contents = std::fs::read_to_string(reopened.path()).unwrap();
        assert_eq!(contents.trim(), "{}");
    }

    #[test]
    fn test_file_storage_keeps_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::in_dir(dir.path());
        storage.set("theme", "dark").unwrap();
        storage.set("jwt", "tok").unwrap();
        storage.remove("jwt").unwrap();
        assert_eq!(storage.get("theme").unwrap().as_deref(), Some("dark"));
    }

    #[test]
    fn test_file_storage_recovers_from_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(STORAGE_FILE);
        std::fs::write(&path, r#"{"jwt": "a.b"#).unwrap();

        let storage = FileStorage::new(path.clone());
        storage.remove("jwt").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap().trim(), "{}");

        std::fs::write(&path, r#"{"jwt": "a.b"#).unwrap();
        storage.set("jwt", "h.p.s").unwrap();
        assert_eq!(storage.get("jwt").unwrap().as_deref(), Some("h.p.s"));
    }

    #[test]
    fn test_file_storage_write_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::in_dir(dir.path());
        storage.set("jwt", "one").unwrap();
        storage.set("jwt", "two").unwrap();

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from(STORAGE_FILE)]);
    }

    #[test]
    fn test_keyring_storage_never_drops_silently() {
        let service = format!("retailpos-test-{}", std::process::id());
        let storage = KeyringStorage::with_service(service);

        // Without a usable keychain the write must fail rather than vanish
        match storage.set("jwt", "abc") {
            Ok(()) => {
                assert_eq!(storage.get("jwt").unwrap().as_deref(), Some("abc"));
                storage.remove("jwt").unwrap();
                assert_eq!(storage.get("jwt").unwrap(), None);
            }
            Err(e) => assert!(matches!(
                e,
                StorageError::NotPersisted { .. } | StorageError::Keyring(_)
            )),
        }
    }

    #[test]
    fn test_file_storage_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(STORAGE_FILE);
        std::fs::write(&path, "[1, 2, 3]").unwrap();

        let storage = FileStorage::new(path);
        assert!(matches!(storage.get("jwt"), Err(StorageError::Corrupt { .. })));
    }
}
