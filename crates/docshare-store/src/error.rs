//! Error types for the storage layer.

use docshare_core::{DenyReason, DocumentId, PermissionLevelParseError, UserId};
use thiserror::Error;

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database connection or query error.
    #[error("database error: {0}")]
    Connection(#[from] sqlx::Error),

    /// Document not found.
    #[error("document not found: {0}")]
    DocumentNotFound(DocumentId),

    /// User not found.
    #[error("user not found: {0}")]
    UserNotFound(UserId),

    /// A user with this email is already registered.
    #[error("email already registered: {0}")]
    DuplicateEmail(String),

    /// A stored permission level could not be decoded.
    #[error("corrupt permission row: {0}")]
    InvalidLevel(#[from] PermissionLevelParseError),

    /// Migration error.
    #[error("migration error: {0}")]
    MigrationError(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// Write rejected by the backend (raised by the in-memory store's
    /// fault injection).
    #[error("write failed: {0}")]
    WriteFailed(String),
}

impl StoreError {
    /// Whether this error means the referenced record does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::DocumentNotFound(_) | Self::UserNotFound(_))
    }
}

/// Result type alias for document service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Failures surfaced by [`DocumentService`](crate::DocumentService).
///
/// Authorization failures are always passed through unchanged. Store errors
/// that mean "record absent" become `NotFound`; everything else the store
/// reports is `PersistenceFailed`.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// No identity where one is required.
    #[error("authentication required")]
    Unauthenticated,

    /// Identity known, grant insufficient.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Referenced document or user does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Request payload rejected.
    #[error("validation failed: {0}")]
    ValidationFailed(String),

    /// The underlying store operation failed.
    #[error("persistence failed: {0}")]
    PersistenceFailed(#[source] StoreError),
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        if err.is_not_found() {
            Self::NotFound(err.to_string())
        } else {
            Self::PersistenceFailed(err)
        }
    }
}

impl From<DenyReason> for ServiceError {
    fn from(reason: DenyReason) -> Self {
        match reason {
            DenyReason::Unauthenticated => Self::Unauthenticated,
            DenyReason::Forbidden => Self::Forbidden(reason.to_string()),
        }
    }
}
