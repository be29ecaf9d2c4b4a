//! Error types for did-wallet.
//!
//! All errors are strongly typed and propagated without panicking.
//! Private key material is never included in error messages.

/// Wallet error types covering all operations.
///
/// Collaborator failures (`StorageFailure`, `RegistryUnavailable`) are
/// surfaced unchanged in kind; [`IdentityError::during`] only annotates the
/// message with the operation that failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    #[error("Invalid structure: {0}")]
    InvalidStructure(String),

    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Wallet item not found: {0}")]
    WalletItemNotFound(String),

    #[error("Wallet item already exists: {0}")]
    WalletItemAlreadyExists(String),

    #[error("Storage failure: {0}")]
    StorageFailure(String),

    #[error("Registry unavailable: {0}")]
    RegistryUnavailable(String),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Signature verification failed")]
    SignatureInvalid,

    #[error("Invalid passphrase")]
    InvalidPassphrase,

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Discriminant of an [`IdentityError`], for callers that match on kind only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidStructure,
    UnsupportedAlgorithm,
    WalletItemNotFound,
    WalletItemAlreadyExists,
    StorageFailure,
    RegistryUnavailable,
    InvalidKey,
    SignatureInvalid,
    InvalidPassphrase,
    SerializationError,
}

impl IdentityError {
    /// Return the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidStructure(_) => ErrorKind::InvalidStructure,
            Self::UnsupportedAlgorithm(_) => ErrorKind::UnsupportedAlgorithm,
            Self::WalletItemNotFound(_) => ErrorKind::WalletItemNotFound,
            Self::WalletItemAlreadyExists(_) => ErrorKind::WalletItemAlreadyExists,
            Self::StorageFailure(_) => ErrorKind::StorageFailure,
            Self::RegistryUnavailable(_) => ErrorKind::RegistryUnavailable,
            Self::InvalidKey(_) => ErrorKind::InvalidKey,
            Self::SignatureInvalid => ErrorKind::SignatureInvalid,
            Self::InvalidPassphrase => ErrorKind::InvalidPassphrase,
            Self::SerializationError(_) => ErrorKind::SerializationError,
        }
    }

    /// Prefix the message with the name of the failing operation.
    ///
    /// The variant is preserved, so `kind()` is unchanged.
    pub fn during(self, op: &str) -> Self {
        match self {
            Self::InvalidStructure(m) => Self::InvalidStructure(format!("{op}: {m}")),
            Self::UnsupportedAlgorithm(m) => Self::UnsupportedAlgorithm(format!("{op}: {m}")),
            Self::WalletItemNotFound(m) => Self::WalletItemNotFound(format!("{op}: {m}")),
            Self::WalletItemAlreadyExists(m) => {
                Self::WalletItemAlreadyExists(format!("{op}: {m}"))
            }
            Self::StorageFailure(m) => Self::StorageFailure(format!("{op}: {m}")),
            Self::RegistryUnavailable(m) => Self::RegistryUnavailable(format!("{op}: {m}")),
            Self::InvalidKey(m) => Self::InvalidKey(format!("{op}: {m}")),
            Self::SerializationError(m) => Self::SerializationError(format!("{op}: {m}")),
            other @ (Self::SignatureInvalid | Self::InvalidPassphrase) => other,
        }
    }
}

impl From<std::io::Error> for IdentityError {
    fn from(e: std::io::Error) -> Self {
        Self::StorageFailure(e.to_string())
    }
}

impl From<serde_json::Error> for IdentityError {
    fn from(e: serde_json::Error) -> Self {
        Self::SerializationError(e.to_string())
    }
}

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, IdentityError>;
