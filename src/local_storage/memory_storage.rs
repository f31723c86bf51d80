use super::{LocalStorage, StorageError};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

/// Map-backed storage. Lives as long as the process does.
#[derive(Default)]
pub struct InMemoryStorage {
    entries: Mutex<HashMap<String, String>>,
    fail_writes: AtomicBool,
    failing_keys: Mutex<HashSet<String>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// When enabled every `write_text` fails as if the storage quota was exceeded.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Makes writes to `key` alone fail, other keys keep working.
    pub fn fail_writes_to(&self, key: &str) {
        if let Ok(mut keys) = self.failing_keys.lock() {
            keys.insert(key.to_string());
        }
    }

    fn rejects(&self, key: &str) -> bool {
        self.fail_writes.load(Ordering::SeqCst)
            || self
                .failing_keys
                .lock()
                .map(|keys| keys.contains(key))
                .unwrap_or(false)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.lock()
            .map(|entries| entries.contains_key(key))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, String>>, StorageError> {
        self.entries
            .lock()
            .map_err(|_| StorageError::Unavailable("in-memory storage lock poisoned".to_string()))
    }
}

impl LocalStorage for InMemoryStorage {
    fn read_text(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn write_text(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.rejects(key) {
            return Err(StorageError::Write {
                key: key.to_string(),
                reason: "quota exceeded".to_string(),
            });
        }
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_key(&self, key: &str) -> Result<(), StorageError> {
        self.lock()?.remove(key);
        Ok(())
    }
}
