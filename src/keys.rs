//! Wallet record and ed25519 keypair derivation.
//!
//! Follows the Solana convention: the keypair is derived from the first
//! 32 bytes of the BIP-39 seed, and `secret_key` is the base58 encoding
//! of the 64-byte keypair bytes (seed ‖ public key).

use bip39::{Language, Mnemonic};
use ed25519_dalek::SigningKey;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::errors::{WalletError, WalletResult};

const ENTROPY_LEN: usize = 16; // 128 bits -> 12 words
const KEYPAIR_LEN: usize = 64;

/// The custodied wallet secret. Never persisted unencrypted.
///
/// Serialized field names match the extension's stored JSON payload
/// (`publicKey`, `secretKey`); `mnemonic` is `null` for wallets imported
/// from a raw private key.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(rename_all = "camelCase")]
pub struct WalletRecord {
    pub mnemonic: Option<String>,
    pub public_key: String,
    pub secret_key: String,
}

impl std::fmt::Debug for WalletRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletRecord")
            .field("mnemonic", &self.mnemonic.as_ref().map(|_| "<redacted>"))
            .field("public_key", &self.public_key)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

/// Generate a fresh wallet from 128 bits of OS entropy.
pub fn generate() -> WalletResult<WalletRecord> {
    let mut entropy = Zeroizing::new(vec![0u8; ENTROPY_LEN]);
    OsRng.fill_bytes(entropy.as_mut());

    let mnemonic = Mnemonic::from_entropy(entropy.as_ref())
        .map_err(|e| WalletError::Unknown(format!("Mnemonic generation failed: {}", e)))?;

    Ok(record_from_mnemonic(&mnemonic))
}

/// Rebuild a wallet from a BIP-39 recovery phrase.
///
/// Deterministic: the same phrase always yields the same keypair.
pub fn import_from_mnemonic(phrase: &str) -> WalletResult<WalletRecord> {
    let mnemonic = Mnemonic::parse_in_normalized(Language::English, phrase)
        .map_err(|e| WalletError::InvalidMnemonic(e.to_string()))?;

    Ok(record_from_mnemonic(&mnemonic))
}

/// Rebuild a wallet from a base58-encoded 64-byte keypair.
///
/// No recovery phrase exists for this path, so `mnemonic` is absent.
pub fn import_from_private_key(encoded: &str) -> WalletResult<WalletRecord> {
    let decoded = bs58::decode(encoded)
        .into_vec()
        .map_err(|_| WalletError::InvalidKeyFormat("Not valid base58".to_string()))?;

    let keypair_bytes: [u8; KEYPAIR_LEN] = decoded.try_into().map_err(|_| {
        WalletError::InvalidKeyFormat(format!("Expected {} key bytes", KEYPAIR_LEN))
    })?;

    let signing_key = SigningKey::from_keypair_bytes(&keypair_bytes)
        .map_err(|_| WalletError::InvalidKeyFormat("Inconsistent keypair bytes".to_string()))?;

    Ok(WalletRecord {
        mnemonic: None,
        public_key: bs58::encode(signing_key.verifying_key().as_bytes()).into_string(),
        secret_key: encoded.to_string(),
    })
}

/// Reconstruct the runtime signing keypair for transaction signing.
pub fn signing_keypair(wallet: &WalletRecord) -> WalletResult<SigningKey> {
    let decoded = bs58::decode(&wallet.secret_key)
        .into_vec()
        .map_err(|_| WalletError::InvalidKeyFormat("Not valid base58".to_string()))?;

    let keypair_bytes: [u8; KEYPAIR_LEN] = decoded.try_into().map_err(|_| {
        WalletError::InvalidKeyFormat(format!("Expected {} key bytes", KEYPAIR_LEN))
    })?;

    SigningKey::from_keypair_bytes(&keypair_bytes)
        .map_err(|_| WalletError::InvalidKeyFormat("Inconsistent keypair bytes".to_string()))
}

fn record_from_mnemonic(mnemonic: &Mnemonic) -> WalletRecord {
    let seed = Zeroizing::new(mnemonic.to_seed(""));

    let mut keypair_seed = Zeroizing::new([0u8; 32]);
    keypair_seed.copy_from_slice(&seed[..32]);
    let signing_key = SigningKey::from_bytes(&keypair_seed);

    WalletRecord {
        mnemonic: Some(mnemonic.to_string()),
        public_key: bs58::encode(signing_key.verifying_key().as_bytes()).into_string(),
        secret_key: bs58::encode(signing_key.to_keypair_bytes()).into_string(),
    }
}
