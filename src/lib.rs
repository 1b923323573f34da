// lib.rs - Key-custody core for the swap-wallet extension

pub mod encryption;
pub mod errors;
pub mod keys;
pub mod manager;
pub mod storage;

// Re-export common types
pub use encryption::{decrypt, encrypt, hash_password, verify_password};
pub use errors::{WalletError, WalletResult};
pub use keys::{generate, import_from_mnemonic, import_from_private_key, signing_keypair, WalletRecord};
pub use manager::WalletManager;
pub use storage::{FileStore, MemoryStore, WalletStore};
