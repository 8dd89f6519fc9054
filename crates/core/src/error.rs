//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Input rejected by the pantry domain before it reaches a store.
///
/// Store and network failures belong to the infra layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A field failed validation (e.g. blank name).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A partial update that would not change anything.
    #[error("validation failed: patch must change at least one field")]
    EmptyPatch,

    #[error("unknown sort key '{0}' (expected none, category, expiryDate, addedDate or userId)")]
    UnknownSortKey(String),

    /// An item id was empty or contained a path separator.
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }
}
