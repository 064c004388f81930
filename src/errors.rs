use thiserror::Error;

/// All errors that can occur in HseVault.
///
/// Expired sessions and unknown login identifiers are deliberately absent:
/// the first is a lazily detected state, the second is downgraded to a
/// guest identity.
#[derive(Debug, Error)]
pub enum HseVaultError {
    // --- Key material errors ---
    #[error("Key import failed — stored key material is unusable: {0}")]
    KeyImportFailure(String),

    // --- Crypto errors ---
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    // --- Store errors ---
    #[error("Invalid record key: {0}")]
    InvalidKeyName(String),

    #[error("Record key '{0}' is reserved and cannot be used as a record")]
    ReservedKey(String),

    // --- Session errors ---
    #[error("Invalid session token: {0}")]
    InvalidToken(String),

    #[error("No active session — run `hsevault login <identifier>` first")]
    NotAuthenticated,

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- Audit errors ---
    #[error("Audit error: {0}")]
    AuditError(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- Serialization errors ---
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),
}

impl HseVaultError {
    /// Returns `true` for failures that make every record under the
    /// current key unreadable.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::KeyImportFailure(_))
    }
}

/// Convenience type alias for HseVault results.
pub type Result<T> = std::result::Result<T, HseVaultError>;
