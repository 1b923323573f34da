//! Password-based key derivation and authenticated encryption of the
//! wallet secret.
//!
//! The at-rest format is `base64(salt ‖ nonce ‖ ciphertext)` with a
//! 16-byte PBKDF2 salt and a 24-byte secret-box nonce, both freshly
//! random per encryption. Decryption failure does not distinguish a
//! wrong password from tampered ciphertext.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use crypto_secretbox::aead::{Aead, KeyInit};
use crypto_secretbox::{Nonce, XSalsa20Poly1305};
use hmac::Hmac;
use rand::rngs::OsRng;
use rand::RngCore;
use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::errors::{WalletError, WalletResult};

pub const SALT_LEN: usize = 16;
pub const NONCE_LEN: usize = 24;
pub const KEY_LEN: usize = 32;

/// PBKDF2-HMAC-SHA256 iteration count. Raising this is always safe;
/// lowering it weakens every blob encrypted afterwards.
pub const PBKDF2_ITERATIONS: u32 = 100_000;

/// Derive a 32-byte encryption key from a password and salt.
///
/// Deterministic for identical inputs; the salt embedded in each blob
/// makes the derivation unique per encryption.
pub fn derive_key(
    password: &SecretString,
    salt: &[u8; SALT_LEN],
) -> WalletResult<Zeroizing<[u8; KEY_LEN]>> {
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    pbkdf2::pbkdf2::<Hmac<Sha256>>(
        password.expose_secret().as_bytes(),
        salt,
        PBKDF2_ITERATIONS,
        key.as_mut(),
    )
    .map_err(|e| WalletError::EncryptionError(format!("Key derivation failed: {}", e)))?;
    Ok(key)
}

/// Encrypt a plaintext string under a password.
///
/// Returns the opaque base64 blob suitable for the storage collaborator.
pub fn encrypt(plaintext: &str, password: &SecretString) -> WalletResult<String> {
    let mut rng = OsRng;
    let mut salt = [0u8; SALT_LEN];
    rng.fill_bytes(&mut salt);
    let mut nonce_bytes = [0u8; NONCE_LEN];
    rng.fill_bytes(&mut nonce_bytes);

    let key = derive_key(password, &salt)?;
    let cipher = XSalsa20Poly1305::new_from_slice(key.as_ref())
        .map_err(|e| WalletError::EncryptionError(format!("Invalid encryption key: {}", e)))?;
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce_bytes), plaintext.as_bytes())
        .map_err(|_| WalletError::EncryptionError("Secret-box seal failed".to_string()))?;

    let mut combined = Vec::with_capacity(SALT_LEN + NONCE_LEN + ciphertext.len());
    combined.extend_from_slice(&salt);
    combined.extend_from_slice(&nonce_bytes);
    combined.extend_from_slice(&ciphertext);

    Ok(BASE64.encode(combined))
}

/// Decrypt a blob produced by [`encrypt`].
///
/// Every failure mode (malformed base64, truncated blob, authentication
/// failure, non-UTF-8 plaintext) surfaces as `DecryptionError`; the
/// lifecycle manager decides the user-facing wording.
pub fn decrypt(blob: &str, password: &SecretString) -> WalletResult<Zeroizing<String>> {
    let combined = BASE64
        .decode(blob)
        .map_err(|_| WalletError::DecryptionError("Malformed encrypted blob".to_string()))?;

    if combined.len() < SALT_LEN + NONCE_LEN {
        return Err(WalletError::DecryptionError(
            "Encrypted blob shorter than salt and nonce".to_string(),
        ));
    }

    let mut salt = [0u8; SALT_LEN];
    salt.copy_from_slice(&combined[..SALT_LEN]);
    let nonce_bytes = &combined[SALT_LEN..SALT_LEN + NONCE_LEN];
    let ciphertext = &combined[SALT_LEN + NONCE_LEN..];

    let key = derive_key(password, &salt)?;
    let cipher = XSalsa20Poly1305::new_from_slice(key.as_ref())
        .map_err(|e| WalletError::DecryptionError(format!("Invalid encryption key: {}", e)))?;
    let plaintext = Zeroizing::new(
        cipher
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|_| {
                WalletError::DecryptionError(
                    "Authentication failed: wrong password or corrupted data".to_string(),
                )
            })?,
    );

    String::from_utf8(plaintext.to_vec())
        .map(Zeroizing::new)
        .map_err(|_| WalletError::DecryptionError("Decrypted payload is not UTF-8".to_string()))
}

/// One-way password fingerprint stored alongside the blob.
///
/// Advisory pre-check only; authorization is proven by a successful
/// [`decrypt`], never by this hash.
pub fn hash_password(password: &SecretString) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.expose_secret().as_bytes());
    BASE64.encode(hasher.finalize())
}

/// Check a password against a stored fingerprint.
pub fn verify_password(password: &SecretString, hash: &str) -> bool {
    hash_password(password) == hash
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret(password: &str) -> SecretString {
        SecretString::from(password.to_string())
    }

    #[test]
    fn encrypt_decrypt_round_trip() {
        let password = secret("correct horse battery staple");
        let blob = encrypt("wallet payload", &password).unwrap();
        let plaintext = decrypt(&blob, &password).unwrap();
        assert_eq!(plaintext.as_str(), "wallet payload");
    }

    #[test]
    fn wrong_password_is_rejected() {
        let blob = encrypt("sensitive", &secret("password-one")).unwrap();
        let err = decrypt(&blob, &secret("password-two")).unwrap_err();
        assert!(matches!(err, WalletError::DecryptionError(_)));
    }

    #[test]
    fn salt_and_nonce_are_unique_per_call() {
        let password = secret("same password");
        let first = BASE64.decode(encrypt("same data", &password).unwrap()).unwrap();
        let second = BASE64.decode(encrypt("same data", &password).unwrap()).unwrap();
        assert_ne!(
            first[..SALT_LEN + NONCE_LEN],
            second[..SALT_LEN + NONCE_LEN]
        );
    }

    #[test]
    fn blob_layout_has_expected_length() {
        let plaintext = "exact length check";
        let blob = encrypt(plaintext, &secret("pw")).unwrap();
        let combined = BASE64.decode(blob).unwrap();
        // salt + nonce + plaintext + 16-byte Poly1305 tag
        assert_eq!(combined.len(), SALT_LEN + NONCE_LEN + plaintext.len() + 16);
    }

    #[test]
    fn tampered_ciphertext_is_detected() {
        let password = secret("tamper test");
        let blob = encrypt("integrity matters", &password).unwrap();
        let mut combined = BASE64.decode(blob).unwrap();
        combined[SALT_LEN + NONCE_LEN] ^= 0x01;
        let tampered = BASE64.encode(combined);
        let err = decrypt(&tampered, &password).unwrap_err();
        assert!(matches!(err, WalletError::DecryptionError(_)));
    }

    #[test]
    fn truncated_blob_is_rejected() {
        let err = decrypt(&BASE64.encode([0u8; SALT_LEN]), &secret("pw")).unwrap_err();
        assert!(matches!(err, WalletError::DecryptionError(_)));
    }

    #[test]
    fn malformed_base64_is_rejected() {
        let err = decrypt("not base64 at all!!!", &secret("pw")).unwrap_err();
        assert!(matches!(err, WalletError::DecryptionError(_)));
    }

    #[test]
    fn derive_key_is_deterministic_per_salt() {
        let password = secret("stable");
        let salt = [7u8; SALT_LEN];
        let first = derive_key(&password, &salt).unwrap();
        let second = derive_key(&password, &salt).unwrap();
        assert_eq!(first.as_ref(), second.as_ref());

        let other_salt = [8u8; SALT_LEN];
        let third = derive_key(&password, &other_salt).unwrap();
        assert_ne!(first.as_ref(), third.as_ref());
    }

    #[test]
    fn password_hash_round_trip() {
        let password = secret("verify me");
        let hash = hash_password(&password);
        assert!(verify_password(&password, &hash));
        assert!(!verify_password(&secret("someone else"), &hash));
    }
}
