//! HTTP API client for registration, user listing and conversation history.

use fumi_server::infrastructure::dto::http::{
    ConversationResponse, ErrorResponse, RegisterUserRequest, RegisterUserResponse,
    UserSummaryDto,
};
use fumi_server::infrastructure::dto::websocket::MessageDto;

use crate::error::ClientError;

/// Thin wrapper around the server's HTTP API.
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
    token: Option<String>,
}

impl ApiClient {
    /// # Arguments
    ///
    /// * `base_url` - e.g. "http://127.0.0.1:8080" (no trailing slash)
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
            token: None,
        }
    }

    /// Register a new user and remember the issued token for later calls.
    pub async fn register(&mut self, username: &str) -> Result<RegisterUserResponse, ClientError> {
        let response = self
            .http
            .post(format!("{}/api/users", self.base_url))
            .json(&RegisterUserRequest {
                username: username.to_string(),
            })
            .send()
            .await
            .map_err(|e| ClientError::ConnectionError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ClientError::ApiError(Self::error_body(response).await));
        }

        let registered: RegisterUserResponse = response
            .json()
            .await
            .map_err(|e| ClientError::ApiError(e.to_string()))?;
        self.token = Some(registered.token.clone());
        Ok(registered)
    }

    /// List all other registered users.
    pub async fn list_users(&self) -> Result<Vec<UserSummaryDto>, ClientError> {
        let response = self
            .http
            .get(format!("{}/api/users", self.base_url))
            .bearer_auth(self.token()?)
            .send()
            .await
            .map_err(|e| ClientError::ConnectionError(e.to_string()))?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ClientError::AuthenticationFailed(
                "token rejected".to_string(),
            ));
        }
        if !response.status().is_success() {
            return Err(ClientError::ApiError(Self::error_body(response).await));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ApiError(e.to_string()))
    }

    /// Fetch the conversation page with `peer_id` (ascending by time).
    pub async fn fetch_conversation(
        &self,
        peer_id: &str,
        before: Option<i64>,
        limit: Option<usize>,
    ) -> Result<Vec<MessageDto>, ClientError> {
        let mut request = self
            .http
            .get(format!("{}/api/messages/{}", self.base_url, peer_id))
            .bearer_auth(self.token()?);
        if let Some(before) = before {
            request = request.query(&[("before", before.to_string())]);
        }
        if let Some(limit) = limit {
            request = request.query(&[("limit", limit.to_string())]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ClientError::ConnectionError(e.to_string()))?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ClientError::AuthenticationFailed(
                "token rejected".to_string(),
            ));
        }
        if !response.status().is_success() {
            return Err(ClientError::ApiError(Self::error_body(response).await));
        }

        let conversation: ConversationResponse = response
            .json()
            .await
            .map_err(|e| ClientError::ApiError(e.to_string()))?;
        Ok(conversation.messages)
    }

    fn token(&self) -> Result<&str, ClientError> {
        self.token
            .as_deref()
            .ok_or_else(|| ClientError::AuthenticationFailed("not registered yet".to_string()))
    }

    async fn error_body(response: reqwest::Response) -> String {
        let status = response.status();
        match response.json::<ErrorResponse>().await {
            Ok(body) => body.error,
            Err(_) => format!("request failed with status {}", status),
        }
    }
}
