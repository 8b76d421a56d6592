//! Error types for satchel.

use thiserror::Error;

/// Top-level result type for satchel operations.
pub type Result<T> = std::result::Result<T, SatchelError>;

/// Top-level error type for satchel.
#[derive(Debug, Error)]
pub enum SatchelError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("vault error: {0}")]
    Vault(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Errors rejected before a settings record may be persisted.
///
/// Validation runs on every save; nothing invalid reaches disk, so the
/// messages name the offending entry precisely.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("extension override #{index} has an empty extension")]
    EmptyExtension { index: usize },

    #[error("duplicate extension override '{extension}'")]
    DuplicateExtension { extension: String },

    #[error("extension override '{extension}' must not contain '{found}'")]
    InvalidExtensionCharacter { extension: String, found: char },
}
