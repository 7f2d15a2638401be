use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::slot::KeyValueStore;

#[derive(Debug, thiserror::Error)]
#[error("memory store lock poisoned")]
pub struct MemoryStoreError;

/// プロセス内のKeyValueStore。クローンは同じ内容を共有する。
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    type Error = MemoryStoreError;

    fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
        let entries = self.entries.lock().map_err(|_| MemoryStoreError)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Self::Error> {
        let mut entries = self.entries.lock().map_err(|_| MemoryStoreError)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
