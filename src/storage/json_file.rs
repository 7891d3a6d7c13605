use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use anyhow::{anyhow, Context, Result};
use log::warn;

use super::KeyValueStore;

/// All keys live in one JSON object on disk, rewritten on every mutation.
pub struct JsonFileStore {
    path: PathBuf,
    data: RwLock<BTreeMap<String, String>>,
}

impl JsonFileStore {
    /// Open (or lazily create) the store at `path`. An unreadable or corrupt
    /// file starts the store empty; it is overwritten on the next write.
    pub fn new(path: PathBuf) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed to create storage directory {}", parent.display())
            })?;
        }

        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read storage from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                warn!("Ignoring corrupt storage file {}: {err}", path.display());
                BTreeMap::new()
            })
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, data: &BTreeMap<String, String>) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write storage to {}", self.path.display()))
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let guard = self
            .data
            .read()
            .map_err(|_| anyhow!("storage lock poisoned"))?;
        Ok(guard.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut guard = self
            .data
            .write()
            .map_err(|_| anyhow!("storage lock poisoned"))?;
        guard.insert(key.to_owned(), value.to_owned());
        self.persist(&guard)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut guard = self
            .data
            .write()
            .map_err(|_| anyhow!("storage lock poisoned"))?;
        if guard.remove(key).is_some() {
            self.persist(&guard)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_survive_reopen() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nested/storage.json");

        let store = JsonFileStore::new(path.clone()).unwrap();
        store.set("qr-scanner-last-camera", "cam-2").unwrap();
        drop(store);

        let reopened = JsonFileStore::new(path).unwrap();
        assert_eq!(
            reopened.get("qr-scanner-last-camera").unwrap().as_deref(),
            Some("cam-2")
        );
    }

    #[test]
    fn test_corrupt_file_starts_empty() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("storage.json");
        fs::write(&path, "{ not json").unwrap();

        let store = JsonFileStore::new(path.clone()).unwrap();
        assert_eq!(store.get("anything").unwrap(), None);

        store.set("k", "v").unwrap();
        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("\"k\""));
    }

    #[test]
    fn test_remove_persists() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("storage.json");
        let store = JsonFileStore::new(path.clone()).unwrap();
        store.set("k", "v").unwrap();
        store.remove("k").unwrap();

        let reopened = JsonFileStore::new(path).unwrap();
        assert_eq!(reopened.get("k").unwrap(), None);
    }
}
