use std::collections::HashMap;

use parking_lot::RwLock;
use serde_json::Value;

use super::WalletStore;
use crate::errors::WalletResult;

/// In-process storage collaborator. Used in tests and as the default
/// backing when no durable store is wired in.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl WalletStore for MemoryStore {
    fn get(&self, keys: &[&str]) -> WalletResult<HashMap<String, Value>> {
        let entries = self.entries.read();
        Ok(keys
            .iter()
            .filter_map(|key| entries.get(*key).map(|value| (key.to_string(), value.clone())))
            .collect())
    }

    fn set(&self, new_entries: HashMap<String, Value>) -> WalletResult<()> {
        let mut entries = self.entries.write();
        entries.extend(new_entries);
        Ok(())
    }

    fn remove(&self, keys: &[&str]) -> WalletResult<()> {
        let mut entries = self.entries.write();
        for key in keys {
            entries.remove(*key);
        }
        Ok(())
    }
}
