//! File-backed key-value store.
//!
//! All keys live in one JSON object on disk:
//! ```json
//! {
//!   "gatehouse:accessTokenExpireTime": "1772355600000",
//!   "gatehouse:token": "{\"token\":\"...\",\"expiresIn\":604800}"
//! }
//! ```
//! Writes go to a sibling temp file that is then renamed over the original,
//! so a crash mid-write never leaves a truncated session file. Reads of an
//! unparsable file fail; writes replace it.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use gatehouse_application::ports::{KeyValueStore, StorageError};
use tokio::fs;

use crate::serialization::{from_json_bytes, to_json_stable_bytes};

const APP_DIR: &str = "gatehouse";
const SESSION_FILE: &str = "session.json";

type Entries = BTreeMap<String, String>;

/// `KeyValueStore` persisted as a single JSON file.
#[derive(Debug)]
pub struct FileKeyValueStore {
    path: PathBuf,
    /// Serialises read-modify-write cycles.
    write_lock: tokio::sync::Mutex<()>,
}

impl FileKeyValueStore {
    /// Creates a store at `path`. The file is created on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Platform default: `<data dir>/gatehouse/session.json`.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_dir().map(|dir| dir.join(APP_DIR).join(SESSION_FILE))
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    async fn load(&self) -> Result<Entries, StorageError> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Entries::new()),
            Err(e) => return Err(StorageError::Io(format!("{}: {e}", self.path.display()))),
        };
        let entries: Option<Entries> = from_json_bytes(&bytes)
            .map_err(|e| StorageError::Serialization(format!("{}: {e}", self.path.display())))?;
        Ok(entries.unwrap_or_default())
    }

    async fn save(&self, entries: &Entries) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::Io(format!("{}: {e}", parent.display())))?;
        }

        let content =
            to_json_stable_bytes(entries).map_err(|e| StorageError::Serialization(e.to_string()))?;
        let temp = self.temp_path();
        fs::write(&temp, &content)
            .await
            .map_err(|e| StorageError::Io(format!("{}: {e}", temp.display())))?;
        fs::rename(&temp, &self.path)
            .await
            .map_err(|e| StorageError::Io(format!("{}: {e}", self.path.display())))?;

        tracing::trace!(path = %self.path.display(), keys = entries.len(), "Session file written");
        Ok(())
    }

    async fn update<F>(&self, change: F) -> Result<(), StorageError>
    where
        F: FnOnce(&mut Entries) -> bool + Send,
    {
        let _guard = self.write_lock.lock().await;
        let (mut entries, recovered) = match self.load().await {
            Ok(entries) => (entries, false),
            Err(StorageError::Serialization(e)) => {
                tracing::warn!(error = %e, "Replacing unreadable session file");
                (Entries::new(), true)
            }
            Err(e) => return Err(e),
        };
        if change(&mut entries) || recovered {
            self.save(&entries).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.load().await?.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string()).as_deref() != Some(value)
        })
        .await
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.update(|entries| entries.remove(key).is_some()).await
    }

    async fn remove_all(&self, keys: &[&str]) -> Result<(), StorageError> {
        self.update(|entries| {
            let before = entries.len();
            entries.retain(|key, _| !keys.contains(&key.as_str()));
            entries.len() != before
        })
        .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> FileKeyValueStore {
        FileKeyValueStore::new(dir.path().join("nested").join("session.json"))
    }

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        assert_eq!(store.get("gatehouse:token").await.unwrap(), None);
        store.remove("gatehouse:token").await.unwrap();
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn test_values_survive_reopen() {
        let dir = TempDir::new().unwrap();
        store(&dir).set("gatehouse:token", "{\"token\":\"t\"}").await.unwrap();
        store(&dir).set("gatehouse:user_info", "{}").await.unwrap();

        let reopened = store(&dir);
        assert_eq!(
            reopened.get("gatehouse:token").await.unwrap().as_deref(),
            Some("{\"token\":\"t\"}")
        );
        assert!(!reopened.temp_path().exists());

        let content = std::fs::read_to_string(reopened.path()).unwrap();
        assert!(content.ends_with("}\n"));
    }

    #[tokio::test]
    async fn test_remove_all_keeps_other_keys() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.set("a", "1").await.unwrap();
        store.set("b", "2").await.unwrap();
        store.set("c", "3").await.unwrap();

        store.remove_all(&["a", "c", "missing"]).await.unwrap();

        assert_eq!(store.get("a").await.unwrap(), None);
        assert_eq!(store.get("b").await.unwrap().as_deref(), Some("2"));
        assert_eq!(store.get("c").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_corrupt_file_reported() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), "{not json").unwrap();

        let result = store.get("a").await;
        assert!(matches!(result, Err(StorageError::Serialization(_))));
    }

    #[tokio::test]
    async fn test_corrupt_file_replaced_on_write() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), "{truncated").unwrap();

        store.remove_all(&["gatehouse:token", "gatehouse:user_info"]).await.unwrap();
        assert_eq!(store.get("gatehouse:token").await.unwrap(), None);

        std::fs::write(store.path(), "{truncated").unwrap();
        store.set("gatehouse:token", "{}").await.unwrap();
        assert_eq!(store.get("gatehouse:token").await.unwrap().as_deref(), Some("{}"));
    }

    #[test]
    fn test_temp_path_is_sibling() {
        let store = FileKeyValueStore::new("/var/lib/gatehouse/session.json");
        assert_eq!(
            store.temp_path(),
            PathBuf::from("/var/lib/gatehouse/session.json.tmp")
        );
    }
}
