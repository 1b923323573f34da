//! Wallet lifecycle: generate, import, persist, unlock, lock, delete.
//!
//! The manager owns the only in-memory copy of the decrypted wallet and
//! serializes every operation touching the blob/hash/flag storage triple
//! behind one mutex. Key derivation runs on the blocking thread pool so
//! callers suspend instead of stalling the executor.

use std::collections::HashMap;
use std::sync::Arc;

use ed25519_dalek::SigningKey;
use secrecy::SecretString;
use serde_json::Value;
use tokio::sync::Mutex;
use tokio::task;
use zeroize::Zeroizing;

use crate::encryption;
use crate::errors::{WalletError, WalletResult};
use crate::keys::{self, WalletRecord};
use crate::storage::{
    WalletStore, ENCRYPTED_WALLET_KEY, PASSWORD_HASH_KEY, WALLET_EXISTS_KEY,
};

/// Owns the single-wallet lifecycle. Constructed once per process;
/// always starts locked, even when a wallet exists in storage.
pub struct WalletManager {
    store: Arc<dyn WalletStore>,
    session: Mutex<Option<WalletRecord>>,
}

impl WalletManager {
    pub fn new(store: Arc<dyn WalletStore>) -> Self {
        Self {
            store,
            session: Mutex::new(None),
        }
    }

    /// Produce a fresh wallet from OS entropy. Does not persist.
    pub async fn generate(&self) -> WalletResult<WalletRecord> {
        task::spawn_blocking(keys::generate)
            .await
            .map_err(join_error)?
    }

    /// Rebuild a wallet from a recovery phrase. Does not persist.
    pub async fn import_from_mnemonic(&self, phrase: &str) -> WalletResult<WalletRecord> {
        let phrase = Zeroizing::new(phrase.to_string());
        task::spawn_blocking(move || keys::import_from_mnemonic(&phrase))
            .await
            .map_err(join_error)?
    }

    /// Rebuild a wallet from a base58 private key. Does not persist.
    pub fn import_from_private_key(&self, encoded: &str) -> WalletResult<WalletRecord> {
        keys::import_from_private_key(encoded)
    }

    /// Reconstruct the signing keypair for transaction signing. Pure.
    pub fn signing_keypair(&self, wallet: &WalletRecord) -> WalletResult<SigningKey> {
        keys::signing_keypair(wallet)
    }

    /// Encrypt and persist the wallet, then hold it unlocked in memory.
    ///
    /// The blob, password hash and existence flag are committed in a
    /// single `set` call; any failure leaves storage and the in-memory
    /// session exactly as they were.
    pub async fn save(&self, wallet: WalletRecord, password: SecretString) -> WalletResult<()> {
        let mut session = self.session.lock().await;

        let record = wallet.clone();
        let (blob, password_hash) =
            task::spawn_blocking(move || -> WalletResult<(String, String)> {
                let password_hash = encryption::hash_password(&password);
                let payload = Zeroizing::new(serde_json::to_string(&record).map_err(|e| {
                    WalletError::EncryptionError(format!("Wallet serialization failed: {}", e))
                })?);
                let blob = encryption::encrypt(payload.as_str(), &password)?;
                Ok((blob, password_hash))
            })
            .await
            .map_err(join_error)??;

        self.store.set(HashMap::from([
            (ENCRYPTED_WALLET_KEY.to_string(), Value::String(blob)),
            (PASSWORD_HASH_KEY.to_string(), Value::String(password_hash)),
            (WALLET_EXISTS_KEY.to_string(), Value::Bool(true)),
        ]))?;

        *session = Some(wallet);
        log::info!("Wallet saved and unlocked");
        Ok(())
    }

    /// Unlock: read the blob, decrypt it, and hold the wallet in memory.
    ///
    /// A decryption failure always surfaces as `IncorrectPassword`; the
    /// stored password hash is advisory and never consulted here. The
    /// session stays locked on any failure.
    pub async fn load(&self, password: SecretString) -> WalletResult<WalletRecord> {
        let mut session = self.session.lock().await;

        let stored = self.store.get(&[ENCRYPTED_WALLET_KEY])?;
        let blob = match stored.get(ENCRYPTED_WALLET_KEY) {
            None => return Err(WalletError::NoWallet),
            Some(value) => value
                .as_str()
                .ok_or_else(|| {
                    WalletError::StorageError("Encrypted blob has unexpected type".to_string())
                })?
                .to_string(),
        };

        let wallet = task::spawn_blocking(move || -> WalletResult<WalletRecord> {
            let payload = encryption::decrypt(&blob, &password)?;
            serde_json::from_str(payload.as_str()).map_err(|e| {
                WalletError::DecryptionError(format!("Malformed wallet payload: {}", e))
            })
        })
        .await
        .map_err(join_error)?
        .map_err(|err| match err {
            WalletError::DecryptionError(_) => {
                log::warn!("Unlock rejected");
                WalletError::IncorrectPassword
            }
            other => other,
        })?;

        *session = Some(wallet.clone());
        log::info!("Wallet unlocked");
        Ok(wallet)
    }

    /// Discard the in-memory wallet. Storage is untouched.
    pub async fn lock(&self) {
        let mut session = self.session.lock().await;
        if session.take().is_some() {
            log::info!("Wallet locked");
        }
    }

    /// Remove the wallet from storage and memory. Irreversible.
    pub async fn delete(&self) -> WalletResult<()> {
        let mut session = self.session.lock().await;
        self.store
            .remove(&[ENCRYPTED_WALLET_KEY, PASSWORD_HASH_KEY, WALLET_EXISTS_KEY])?;
        *session = None;
        log::info!("Wallet deleted");
        Ok(())
    }

    /// Whether a wallet is persisted. Does not attempt decryption.
    pub fn exists(&self) -> WalletResult<bool> {
        let stored = self.store.get(&[WALLET_EXISTS_KEY])?;
        Ok(stored
            .get(WALLET_EXISTS_KEY)
            .and_then(Value::as_bool)
            .unwrap_or(false))
    }

    pub async fn is_locked(&self) -> bool {
        self.session.lock().await.is_none()
    }

    /// Public key of the unlocked wallet, if any.
    pub async fn public_key(&self) -> Option<String> {
        self.session
            .lock()
            .await
            .as_ref()
            .map(|wallet| wallet.public_key.clone())
    }
}

fn join_error(error: task::JoinError) -> WalletError {
    WalletError::Unknown(format!("Background task failed: {}", error))
}
