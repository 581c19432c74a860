use thiserror::Error;

/// All errors that can occur in sealbox.
#[derive(Debug, Error)]
pub enum SealboxError {
    // --- Request validation ---
    #[error("Invalid {field}: {message}")]
    Validation { field: &'static str, message: String },

    // --- Entity state ---
    #[error("Secret '{0}' already exists")]
    AlreadyExists(String),

    #[error("Secret '{0}' not found")]
    NotFound(String),

    // --- Key indirection ---
    #[error("Key reference '{0}' could not be resolved")]
    KeyNotFound(String),

    // --- Crypto errors ---
    #[error("Invalid output format: {0}")]
    InvalidFormat(String),

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    // --- Config errors ---
    #[error("Config error: {0}")]
    Config(String),

    // --- Storage collaborator errors ---
    #[error("Storage error: {0}")]
    Storage(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for sealbox results.
pub type Result<T> = std::result::Result<T, SealboxError>;
