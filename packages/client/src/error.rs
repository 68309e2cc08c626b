//! Error types for the chat client.

use thiserror::Error;

/// Client-specific errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server refused the credential (connection never established)
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Connection error (network drop, server gone)
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The HTTP API rejected a request (e.g. duplicate username)
    #[error("API error: {0}")]
    ApiError(String),
}
