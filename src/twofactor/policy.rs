//! Organization policy: whether admin accounts must have 2FA.
//!
//! The flag has two sources: the admin-settings object fetched from the
//! server, and a locally persisted mirror written when an admin toggles
//! the setting. The mirror makes the change effective everywhere
//! immediately, without waiting for a settings refetch. The two sources
//! are OR'd: either one requiring 2FA is sufficient.

use std::sync::{Arc, Mutex};

use tokio::sync::watch;

use crate::storage::KeyValueStore;

/// Current mirror key.
pub const MIRROR_KEY: &str = "twofactor.required";

/// Key written by older releases; still read so existing installs keep
/// their policy across the rename.
pub const LEGACY_MIRROR_KEY: &str = "require2FA";

/// Process-wide enforcement policy with publish/subscribe updates.
pub struct PolicyStore {
    storage: Arc<dyn KeyValueStore>,
    settings_flag: Mutex<bool>,
    mirror_flag: Mutex<bool>,
    tx: watch::Sender<bool>,
}

impl PolicyStore {
    /// Loads the mirror from local storage. The server-sourced settings
    /// flag starts false until `apply_settings` delivers it.
    pub fn load(storage: Arc<dyn KeyValueStore>) -> Self {
        let mirror = read_flag(&*storage, MIRROR_KEY) || read_flag(&*storage, LEGACY_MIRROR_KEY);
        let (tx, _) = watch::channel(mirror);
        Self {
            storage,
            settings_flag: Mutex::new(false),
            mirror_flag: Mutex::new(mirror),
            tx,
        }
    }

    /// Whether the organization currently requires 2FA for admins.
    pub fn is_required(&self) -> bool {
        *self.settings_flag.lock().unwrap() || *self.mirror_flag.lock().unwrap()
    }

    /// A receiver that yields the effective flag on every change.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }

    /// Records the flag from a fresh admin-settings fetch.
    pub fn apply_settings(&self, required: bool) {
        *self.settings_flag.lock().unwrap() = required;
        self.publish();
    }

    /// Records an admin's local toggle and persists the mirror under both
    /// keys so it survives restarts.
    pub fn set_required(&self, required: bool) {
        *self.mirror_flag.lock().unwrap() = required;
        let value = if required { "true" } else { "false" };
        self.storage.set(MIRROR_KEY, value);
        self.storage.set(LEGACY_MIRROR_KEY, value);
        log::debug!("2FA requirement mirror set to {required}");
        self.publish();
    }

    fn publish(&self) {
        self.tx.send_replace(self.is_required());
    }
}

fn read_flag(storage: &dyn KeyValueStore, key: &str) -> bool {
    storage.get(key).is_some_and(|raw| raw == "true")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn test_either_mirror_key_is_sufficient() {
        let storage = Arc::new(MemoryStore::new());
        storage.set(LEGACY_MIRROR_KEY, "true");
        let policy = PolicyStore::load(Arc::clone(&storage) as Arc<dyn KeyValueStore>);
        assert!(policy.is_required());

        let storage = Arc::new(MemoryStore::new());
        storage.set(MIRROR_KEY, "true");
        let policy = PolicyStore::load(storage);
        assert!(policy.is_required());
    }

    #[test]
    fn test_settings_and_mirror_are_ored() {
        let policy = PolicyStore::load(Arc::new(MemoryStore::new()));
        assert!(!policy.is_required());

        policy.apply_settings(true);
        assert!(policy.is_required());

        // the stale settings flag keeps the requirement on until a refetch
        policy.set_required(false);
        assert!(policy.is_required());

        policy.apply_settings(false);
        assert!(!policy.is_required());
    }

    #[test]
    fn test_toggle_persists_both_keys() {
        let storage = Arc::new(MemoryStore::new());
        let policy = PolicyStore::load(Arc::clone(&storage) as Arc<dyn KeyValueStore>);

        policy.set_required(true);
        assert_eq!(storage.get(MIRROR_KEY), Some("true".to_string()));
        assert_eq!(storage.get(LEGACY_MIRROR_KEY), Some("true".to_string()));

        // a new process picks the flag up without any server round trip
        let reloaded = PolicyStore::load(Arc::clone(&storage) as Arc<dyn KeyValueStore>);
        assert!(reloaded.is_required());
    }

    #[test]
    fn test_subscribers_see_changes() {
        let policy = PolicyStore::load(Arc::new(MemoryStore::new()));
        let rx = policy.subscribe();
        assert!(!*rx.borrow());

        policy.set_required(true);
        assert!(*rx.borrow());
    }
}
