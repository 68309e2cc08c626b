//! HTTP API DTOs.

use serde::{Deserialize, Serialize};

use super::websocket::MessageDto;

/// Request body for `POST /api/users`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterUserRequest {
    pub username: String,
}

/// Response body for `POST /api/users`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterUserResponse {
    pub user_id: String,
    pub username: String,
    /// Opaque bearer token for subsequent API and WebSocket access
    pub token: String,
}

/// One user as returned by `GET /api/users`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummaryDto {
    pub user_id: String,
    pub username: String,
}

/// Query parameters for `GET /api/messages/{peer_id}`
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ConversationQuery {
    /// Unix timestamp in milliseconds; only messages strictly older are returned
    pub before: Option<i64>,
    /// Page size (default 50, capped at 200)
    pub limit: Option<usize>,
}

/// Response body for `GET /api/messages/{peer_id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationResponse {
    pub messages: Vec<MessageDto>,
}

/// Generic error body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
