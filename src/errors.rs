use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum WalletError {
    // Import validation errors (user-correctable)
    InvalidMnemonic(String),
    InvalidKeyFormat(String),

    // Lifecycle errors
    NoWallet,
    IncorrectPassword,

    // Cryptographic primitive failures (unexpected, fatal)
    EncryptionError(String),
    DecryptionError(String),

    // Storage collaborator failures
    StorageError(String),

    // Generic errors
    Unknown(String),
}

impl fmt::Display for WalletError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            WalletError::InvalidMnemonic(msg) => write!(f, "Invalid mnemonic phrase: {}", msg),
            WalletError::InvalidKeyFormat(msg) => write!(f, "Invalid private key format: {}", msg),

            WalletError::NoWallet => write!(f, "No wallet found"),
            WalletError::IncorrectPassword => {
                write!(f, "Incorrect password or corrupted wallet data")
            }

            WalletError::EncryptionError(msg) => write!(f, "Encryption error: {}", msg),
            WalletError::DecryptionError(msg) => write!(f, "Decryption error: {}", msg),

            WalletError::StorageError(msg) => write!(f, "Storage error: {}", msg),

            WalletError::Unknown(msg) => write!(f, "Unknown error: {}", msg),
        }
    }
}

impl std::error::Error for WalletError {}

pub type WalletResult<T> = Result<T, WalletError>;

impl From<std::io::Error> for WalletError {
    fn from(error: std::io::Error) -> Self {
        WalletError::StorageError(error.to_string())
    }
}

impl From<serde_json::Error> for WalletError {
    fn from(error: serde_json::Error) -> Self {
        WalletError::StorageError(format!("JSON error: {}", error))
    }
}
