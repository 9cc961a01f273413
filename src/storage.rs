//! Local client-side persistence.
//!
//! The marketplace frontend keeps a handful of values on the device: the
//! authenticated user blob written by the login flow, and the policy mirror
//! flags. This module provides the key-value abstraction over that state
//! with a file-backed store for real use and an in-memory store for tests.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Key under which the login flow persists the authenticated user as JSON.
pub const USER_KEY: &str = "user";

/// String key-value persistence shared by the 2FA flows.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// Volatile store for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryStore {
    map: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.map.lock().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.map.lock().unwrap().insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.map.lock().unwrap().remove(key);
    }
}

/// Store backed by a single JSON object on disk, written through on every
/// mutation so a crash never loses more than the in-flight write.
pub struct FileStore {
    path: PathBuf,
    map: Mutex<HashMap<String, String>>,
}

impl FileStore {
    /// Opens the store at `path`, creating parent directories as needed.
    /// A missing file starts empty; a corrupt file is treated as empty and
    /// overwritten on the next write.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let map = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|err| {
                log::warn!("discarding corrupt local store {}: {err}", path.display());
                HashMap::new()
            }),
            Err(err) if err.kind() == io::ErrorKind::NotFound => HashMap::new(),
            Err(err) => return Err(err),
        };

        Ok(Self {
            path,
            map: Mutex::new(map),
        })
    }

    fn persist(&self, map: &HashMap<String, String>) {
        let raw = match serde_json::to_string_pretty(map) {
            Ok(raw) => raw,
            Err(err) => {
                log::error!("failed to serialize local store: {err}");
                return;
            },
        };
        if let Err(err) = fs::write(&self.path, raw) {
            log::error!("failed to write local store {}: {err}", self.path.display());
        }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.map.lock().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let mut map = self.map.lock().unwrap();
        map.insert(key.to_string(), value.to_string());
        self.persist(&map);
    }

    fn remove(&self, key: &str) {
        let mut map = self.map.lock().unwrap();
        map.remove(key);
        self.persist(&map);
    }
}

/// Reads the authenticated user's id from the persisted `user` blob.
///
/// The blob is whatever the login flow stored; the id may be a JSON string
/// or a number. Returns `None` when the blob is absent, unparsable, or has
/// no id, which callers treat as a missing-user-context precondition.
pub fn stored_user_id(store: &dyn KeyValueStore) -> Option<String> {
    let raw = store.get(USER_KEY)?;
    let blob: serde_json::Value = serde_json::from_str(&raw).ok()?;
    match &blob["id"] {
        serde_json::Value::String(id) if !id.is_empty() => Some(id.clone()),
        serde_json::Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert_eq!(store.get("k"), None);
        store.set("k", "v");
        assert_eq!(store.get("k"), Some("v".to_string()));
        store.remove("k");
        assert_eq!(store.get("k"), None);
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        {
            let store = FileStore::open(&path).unwrap();
            store.set("user", r#"{"id":"u-1"}"#);
        }

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get("user"), Some(r#"{"id":"u-1"}"#.to_string()));
    }

    #[test]
    fn test_file_store_corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, "not json").unwrap();

        let store = FileStore::open(&path).unwrap();
        assert_eq!(store.get("anything"), None);
    }

    #[test]
    fn test_stored_user_id_string_and_number() {
        let store = MemoryStore::new();

        store.set(USER_KEY, r#"{"id":"u-42","email":"a@b.c"}"#);
        assert_eq!(stored_user_id(&store), Some("u-42".to_string()));

        store.set(USER_KEY, r#"{"id":42}"#);
        assert_eq!(stored_user_id(&store), Some("42".to_string()));
    }

    #[test]
    fn test_stored_user_id_missing_or_malformed() {
        let store = MemoryStore::new();
        assert_eq!(stored_user_id(&store), None);

        store.set(USER_KEY, "not json");
        assert_eq!(stored_user_id(&store), None);

        store.set(USER_KEY, r#"{"email":"a@b.c"}"#);
        assert_eq!(stored_user_id(&store), None);

        store.set(USER_KEY, r#"{"id":""}"#);
        assert_eq!(stored_user_id(&store), None);
    }
}
