pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use std::collections::HashMap;

use serde_json::Value;

use crate::errors::WalletResult;

/// Storage key for the encrypted wallet blob.
pub const ENCRYPTED_WALLET_KEY: &str = "encrypted_wallet";
/// Storage key for the advisory password fingerprint.
pub const PASSWORD_HASH_KEY: &str = "password_hash";
/// Storage key for the wallet-existence flag.
pub const WALLET_EXISTS_KEY: &str = "walletExists";

/// The persistent key-value collaborator (chrome.storage.local shape).
///
/// Missing keys are simply absent from `get` results, never an error.
/// Each `set` call is atomic from the caller's perspective; the lifecycle
/// manager relies on this to commit the blob/hash/flag triple together.
pub trait WalletStore: Send + Sync {
    fn get(&self, keys: &[&str]) -> WalletResult<HashMap<String, Value>>;
    fn set(&self, entries: HashMap<String, Value>) -> WalletResult<()>;
    fn remove(&self, keys: &[&str]) -> WalletResult<()>;
}
