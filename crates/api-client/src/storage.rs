//! Persistent key/value storage for session credentials
//!
//! The client reads the bearer token from `<prefix>_token` before every
//! attempt and clears `<prefix>_token` / `<prefix>_user` on a 401.

use magicsaas_core::{Error, ErrorCode, Result, ResultExt};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};
use tracing::debug;

/// String key/value store holding the session token and user
pub trait CredentialStore: Send + Sync {
    /// Read a value
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete a value; deleting a missing key is not an error
    fn remove(&self, key: &str) -> Result<()>;
}

/// In-process store, lost when the process exits
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style method to seed a value
    #[must_use]
    pub fn with_value(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), value.into());
        self
    }

    pub fn len(&self) -> usize {
        self.values.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CredentialStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}

/// Store backed by a single JSON object on disk
///
/// Every operation re-reads the file, so several processes sharing the file
/// see each other's sign-in and sign-out.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    lock: RwLock<()>,
}

impl FileStore {
    /// Store at an explicit path; the file is created on first write
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: RwLock::new(()),
        }
    }

    /// `<data dir>/magicsaas/credentials.json`
    pub fn default_location() -> Result<Self> {
        let dir = dirs::data_dir().ok_or_else(|| {
            Error::new(ErrorCode::FileNotFound, "No user data directory on this platform")
        })?;
        Ok(Self::new(dir.join("magicsaas").join("credentials.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let raw = fs::read(&self.path)
            .map_err(|e| Error::io(format!("Failed to read {}", self.path.display())).with_source(e))?;
        if raw.iter().all(u8::is_ascii_whitespace) {
            return Ok(BTreeMap::new());
        }
        serde_json::from_slice(&raw)
            .map_err(Error::from)
            .context(format!("Reading {}", self.path.display()))
    }

    fn save(&self, values: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| Error::io(format!("Failed to create {}", parent.display())).with_source(e))?;
        }
        let json = serde_json::to_vec_pretty(values)?;
        fs::write(&self.path, json)
            .map_err(|e| Error::io(format!("Failed to write {}", self.path.display())).with_source(e))?;
        debug!(path = %self.path.display(), keys = values.len(), "Credentials saved");
        Ok(())
    }
}

impl CredentialStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let _guard = self.lock.read().unwrap_or_else(PoisonError::into_inner);
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.lock.write().unwrap_or_else(PoisonError::into_inner);
        let mut values = self.load()?;
        values.insert(key.to_string(), value.to_string());
        self.save(&values)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let _guard = self.lock.write().unwrap_or_else(PoisonError::into_inner);
        let mut values = self.load()?;
        if values.remove(key).is_some() {
            self.save(&values)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new().with_value("magicsaas_token", "abc");
        assert_eq!(store.get("magicsaas_token").unwrap().as_deref(), Some("abc"));

        store.set("magicsaas_user", "{}").unwrap();
        assert_eq!(store.len(), 2);

        store.remove("magicsaas_token").unwrap();
        store.remove("never-set").unwrap();
        assert_eq!(store.get("magicsaas_token").unwrap(), None);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_file_store_persists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("credentials.json");

        let store = FileStore::new(&path);
        assert_eq!(store.get("magicsaas_token").unwrap(), None);

        store.set("magicsaas_token", "abc").unwrap();
        store.set("magicsaas_user", r#"{"id":1}"#).unwrap();

        let reopened = FileStore::new(&path);
        assert_eq!(reopened.get("magicsaas_token").unwrap().as_deref(), Some("abc"));

        reopened.remove("magicsaas_token").unwrap();
        assert_eq!(store.get("magicsaas_token").unwrap(), None);
        assert_eq!(store.get("magicsaas_user").unwrap().as_deref(), Some(r#"{"id":1}"#));
    }

    #[test]
    fn test_file_store_rejects_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("credentials.json");
        fs::write(&path, "not json").unwrap();

        let store = FileStore::new(&path);
        let err = store.get("magicsaas_token").unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigParseError);
    }

    #[test]
    fn test_file_store_empty_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("credentials.json");
        fs::write(&path, "\n").unwrap();

        assert_eq!(FileStore::new(&path).get("anything").unwrap(), None);
    }
}
