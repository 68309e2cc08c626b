//! UseCase-level error types.
//!
//! Everything here is reported to the originating connection only, never
//! broadcast, and never terminates the connection.

use thiserror::Error;

use crate::domain::{DomainError, StoreError};

/// Errors raised by the message send path
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendMessageError {
    /// Content failed validation (empty / too long)
    #[error("invalid message: {0}")]
    InvalidMessage(#[from] DomainError),

    /// Recipient does not resolve to an existing user record
    #[error("recipient not found")]
    UnknownRecipient,

    /// The durable store rejected the append; nothing was delivered
    #[error("failed to send message")]
    Persistence(#[from] StoreError),
}

/// Errors raised by the disconnect path
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DisconnectError {
    /// This connection was already replaced by a newer login; the registry
    /// entry belongs to someone else now and presence must not change
    #[error("connection was superseded by a newer login")]
    Superseded,
}

/// Errors raised when fetching a conversation page
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchConversationError {
    /// The requested peer does not exist
    #[error("peer not found")]
    UnknownPeer,

    /// The durable store failed
    #[error("failed to fetch conversation")]
    Persistence(#[from] StoreError),
}

/// Errors raised when acknowledging a conversation as read
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarkReadError {
    /// The requested peer does not exist
    #[error("peer not found")]
    UnknownPeer,

    /// The durable store failed
    #[error("failed to update read state")]
    Persistence(#[from] StoreError),
}
