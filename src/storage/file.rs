use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde_json::Value;

use super::WalletStore;
use crate::errors::{WalletError, WalletResult};

/// Durable storage collaborator backed by a single JSON document.
///
/// Writes go through a temp file and an atomic rename, so a crash
/// mid-write leaves either the old document or the new one, never a
/// torn mix.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> WalletResult<HashMap<String, Value>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        let bytes = fs::read(&self.path)?;
        serde_json::from_slice(&bytes)
            .map_err(|e| WalletError::StorageError(format!("Corrupted store document: {}", e)))
    }

    fn write_document(&self, document: &HashMap<String, Value>) -> WalletResult<()> {
        let dir = self
            .path
            .parent()
            .ok_or_else(|| WalletError::StorageError("Invalid store path".to_string()))?;
        fs::create_dir_all(dir)?;

        let tmp_path = self.path.with_extension("new");
        let serialized = serde_json::to_vec(document)?;
        let mut file = File::create(&tmp_path)?;
        file.write_all(&serialized)?;
        file.sync_all()?;
        drop(file);
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

impl WalletStore for FileStore {
    fn get(&self, keys: &[&str]) -> WalletResult<HashMap<String, Value>> {
        let document = self.read_document()?;
        Ok(keys
            .iter()
            .filter_map(|key| document.get(*key).map(|value| (key.to_string(), value.clone())))
            .collect())
    }

    fn set(&self, entries: HashMap<String, Value>) -> WalletResult<()> {
        let _guard = self.write_lock.lock();
        let mut document = self.read_document()?;
        document.extend(entries);
        self.write_document(&document)
    }

    fn remove(&self, keys: &[&str]) -> WalletResult<()> {
        let _guard = self.write_lock.lock();
        let mut document = self.read_document()?;
        for key in keys {
            document.remove(*key);
        }
        self.write_document(&document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn values_survive_a_fresh_store_instance() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("wallet.store");

        let store = FileStore::new(&path);
        store
            .set(HashMap::from([
                ("encrypted_wallet".to_string(), json!("blob")),
                ("walletExists".to_string(), json!(true)),
            ]))
            .unwrap();
        drop(store);

        let reopened = FileStore::new(&path);
        let fetched = reopened.get(&["encrypted_wallet", "walletExists"]).unwrap();
        assert_eq!(fetched["encrypted_wallet"], json!("blob"));
        assert_eq!(fetched["walletExists"], json!(true));
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("never-written.store"));
        assert!(store.get(&["anything"]).unwrap().is_empty());
    }

    #[test]
    fn remove_persists_to_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("wallet.store");

        let store = FileStore::new(&path);
        store
            .set(HashMap::from([
                ("a".to_string(), json!(1)),
                ("b".to_string(), json!(2)),
            ]))
            .unwrap();
        store.remove(&["a"]).unwrap();

        let reopened = FileStore::new(&path);
        let fetched = reopened.get(&["a", "b"]).unwrap();
        assert!(!fetched.contains_key("a"));
        assert_eq!(fetched["b"], json!(2));
    }

    #[test]
    fn corrupted_document_is_a_storage_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("wallet.store");
        fs::write(&path, b"{ not json").unwrap();

        let store = FileStore::new(&path);
        let err = store.get(&["key"]).unwrap_err();
        assert!(matches!(err, WalletError::StorageError(_)));
    }
}
