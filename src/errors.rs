use thiserror::Error;

/// All errors that can occur in burnlink.
#[derive(Debug, Error)]
pub enum BurnLinkError {
    // --- Crypto errors ---
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    /// Wrong key, tampered ciphertext and mismatched nonce all land here on purpose.
    #[error("Decryption failed: invalid key or corrupted data")]
    DecryptionFailed,

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    // --- Secret lifecycle (terminal, never retried) ---
    #[error("Secret not found: it never existed or has already been destroyed")]
    NotFound,

    #[error("Secret expired: its time limit passed and it was purged")]
    Expired,

    #[error("Secret burned: its view limit was reached")]
    Burned,

    // --- Relay errors ---
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Could not allocate a unique secret id after {0} attempts")]
    IdExhausted(usize),

    #[error("Relay unreachable: {0}")]
    Relay(String),

    #[error("Unexpected relay response: {0}")]
    UnexpectedResponse(String),

    // --- Link errors ---
    #[error("Invalid link: {0}")]
    InvalidLink(String),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("User cancelled operation")]
    UserCancelled,
}

impl BurnLinkError {
    /// True for the outcomes that mean the secret is gone for good.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::NotFound | Self::Expired | Self::Burned | Self::DecryptionFailed
        )
    }
}

/// Convenience type alias for burnlink results.
pub type Result<T> = std::result::Result<T, BurnLinkError>;
