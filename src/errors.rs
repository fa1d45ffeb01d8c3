use thiserror::Error;

/// All errors that can occur in HostVault.
#[derive(Debug, Error)]
pub enum VaultError {
    // --- Credential errors ---
    #[error("Invalid credential type '{0}' — expected 'password' or 'keyfile'")]
    InvalidCredentialType(String),

    // --- Lifecycle errors ---
    #[error("Vault is locked — unlock it first")]
    VaultLocked,

    #[error("Invalid password")]
    InvalidPassword,

    // --- Crypto errors ---
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Decryption failed — wrong key or corrupted data")]
    DecryptionFailed,

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    // --- Store errors ---
    #[error("Secret store error: {0}")]
    StoreIo(String),

    #[error("Record '{0}' not found")]
    RecordNotFound(String),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- Serialization errors ---
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("User cancelled operation")]
    UserCancelled,
}

impl From<rusqlite::Error> for VaultError {
    fn from(e: rusqlite::Error) -> Self {
        VaultError::StoreIo(e.to_string())
    }
}

/// Convenience type alias for HostVault results.
pub type Result<T> = std::result::Result<T, VaultError>;
