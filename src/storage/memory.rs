use std::{
    collections::HashMap,
    path::PathBuf,
    sync::{Arc, Mutex, MutexGuard},
};

use crate::errors::LedgerError;

use super::{KeyValueStore, Result};

/// In-process store. Clones share the same map, so a test can keep a handle
/// while the repository owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
    quarantined: Arc<Mutex<Vec<(String, String)>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Payloads set aside by `quarantine`, oldest first.
    pub fn quarantined(&self) -> Vec<(String, String)> {
        self.quarantined
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    fn entries(&self) -> Result<MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| LedgerError::Storage("memory store lock poisoned".into()))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries()?.remove(key);
        Ok(())
    }

    fn quarantine(&self, key: &str) -> Result<Option<PathBuf>> {
        let payload = self.entries()?.get(key).cloned();
        if let Some(payload) = payload {
            self.quarantined
                .lock()
                .map_err(|_| LedgerError::Storage("memory store lock poisoned".into()))?
                .push((key.to_string(), payload));
        }
        Ok(None)
    }

    fn describe(&self) -> String {
        "in-memory store".into()
    }
}
