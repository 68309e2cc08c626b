//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
};

use crate::{
    domain::{AuthError, DirectoryError, UserId},
    infrastructure::dto::http::{
        ConversationQuery, ConversationResponse, ErrorResponse, RegisterUserRequest,
        RegisterUserResponse, UserSummaryDto,
    },
    infrastructure::dto::websocket::MessageDto,
    ui::state::AppState,
    usecase::FetchConversationError,
};

/// Extract and verify the bearer token from the `Authorization` header.
///
/// Fails with 401 before any other processing; an unauthenticated request
/// never reaches a use case.
pub async fn authenticate(headers: &HeaderMap, state: &AppState) -> Result<UserId, StatusCode> {
    let token = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(StatusCode::UNAUTHORIZED)?;

    state.directory.verify_token(token).await.map_err(|e| {
        match e {
            AuthError::MissingToken => tracing::debug!("Request without credential rejected"),
            AuthError::InvalidToken => tracing::debug!("Request with invalid credential rejected"),
        }
        StatusCode::UNAUTHORIZED
    })
}

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Register a new user and issue an opaque bearer token.
pub async fn register_user(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RegisterUserRequest>,
) -> Result<(StatusCode, Json<RegisterUserResponse>), (StatusCode, Json<ErrorResponse>)> {
    match state.directory.register_user(&request.username).await {
        Ok((record, token)) => Ok((
            StatusCode::CREATED,
            Json(RegisterUserResponse {
                user_id: record.id.into_string(),
                username: record.username,
                token,
            }),
        )),
        Err(e @ DirectoryError::DuplicateUsername(_)) => Err((
            StatusCode::CONFLICT,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )),
        Err(e @ DirectoryError::InvalidUsername(_)) => Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )),
    }
}

/// List all registered users except the caller.
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<UserSummaryDto>>, StatusCode> {
    let caller = authenticate(&headers, &state).await?;

    let users: Vec<UserSummaryDto> = state
        .directory
        .list_users()
        .await
        .into_iter()
        .filter(|record| record.id != caller)
        .map(UserSummaryDto::from)
        .collect();

    Ok(Json(users))
}

/// Get the conversation page between the caller and `peer_id`.
///
/// Side effect: the peer→caller direction is marked read (fetching the
/// history counts as reading it).
pub async fn get_conversation(
    State(state): State<Arc<AppState>>,
    Path(peer_id): Path<String>,
    Query(query): Query<ConversationQuery>,
    headers: HeaderMap,
) -> Result<Json<ConversationResponse>, StatusCode> {
    let caller = authenticate(&headers, &state).await?;

    match state
        .fetch_conversation_usecase
        .execute(&caller, &peer_id, query.before, query.limit)
        .await
    {
        Ok(messages) => Ok(Json(ConversationResponse {
            messages: messages.into_iter().map(MessageDto::from).collect(),
        })),
        Err(FetchConversationError::UnknownPeer) => Err(StatusCode::NOT_FOUND),
        Err(FetchConversationError::Persistence(e)) => {
            tracing::error!("Conversation fetch failed: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
