//! Domain-level error types.

use thiserror::Error;

/// Validation errors raised by value object constructors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// User identifier is empty after normalization
    #[error("user id must not be empty")]
    EmptyUserId,

    /// User identifier exceeds the length limit
    #[error("user id exceeds the maximum length")]
    UserIdTooLong,

    /// Message body is empty after trimming
    #[error("message content must not be empty")]
    EmptyMessage,

    /// Message body exceeds the length limit
    #[error("message content too long ({0} characters, max 1000)")]
    MessageTooLong(usize),

    /// Message identifier is empty
    #[error("message id must not be empty")]
    EmptyMessageId,
}

/// Errors raised by the durable message store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The store is unreachable or failed internally
    #[error("message store unavailable: {0}")]
    Unavailable(String),
}

/// Errors raised when pushing events to a connection
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PushError {
    /// The target user has no registered connection
    #[error("user '{0}' has no live connection")]
    NotConnected(String),

    /// The connection channel was closed mid-send
    #[error("failed to push event to '{0}'")]
    PushFailed(String),
}

/// Errors raised by the user directory (identity collaborator)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Credential missing from the request
    #[error("no credential provided")]
    MissingToken,

    /// Credential does not resolve to a known user
    #[error("invalid credential")]
    InvalidToken,
}

/// Errors raised when registering a new user
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryError {
    /// Username already taken
    #[error("username '{0}' is already registered")]
    DuplicateUsername(String),

    /// Username failed validation
    #[error("invalid username: {0}")]
    InvalidUsername(String),
}
