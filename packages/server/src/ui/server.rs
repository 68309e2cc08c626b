//! Server execution logic.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::domain::UserDirectory;
use crate::usecase::{
    ConnectUserUseCase, DisconnectUserUseCase, FetchConversationUseCase,
    MarkConversationReadUseCase, SendDirectMessageUseCase, TypingRelayUseCase,
};

use super::{
    handler::{get_conversation, health_check, list_users, register_user, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// Direct-message chat server
///
/// This struct encapsulates the server configuration and provides methods to
/// run the server.
///
/// # Example
///
/// ```ignore
/// let server = Server::new(
///     connect_user_usecase,
///     disconnect_user_usecase,
///     send_message_usecase,
///     typing_relay_usecase,
///     fetch_conversation_usecase,
///     mark_read_usecase,
///     directory,
/// );
/// server.run("127.0.0.1".to_string(), 8080).await?;
/// ```
pub struct Server {
    connect_user_usecase: Arc<ConnectUserUseCase>,
    disconnect_user_usecase: Arc<DisconnectUserUseCase>,
    send_message_usecase: Arc<SendDirectMessageUseCase>,
    typing_relay_usecase: Arc<TypingRelayUseCase>,
    fetch_conversation_usecase: Arc<FetchConversationUseCase>,
    mark_read_usecase: Arc<MarkConversationReadUseCase>,
    directory: Arc<dyn UserDirectory>,
}

impl Server {
    /// Create a new Server instance
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        connect_user_usecase: Arc<ConnectUserUseCase>,
        disconnect_user_usecase: Arc<DisconnectUserUseCase>,
        send_message_usecase: Arc<SendDirectMessageUseCase>,
        typing_relay_usecase: Arc<TypingRelayUseCase>,
        fetch_conversation_usecase: Arc<FetchConversationUseCase>,
        mark_read_usecase: Arc<MarkConversationReadUseCase>,
        directory: Arc<dyn UserDirectory>,
    ) -> Self {
        Self {
            connect_user_usecase,
            disconnect_user_usecase,
            send_message_usecase,
            typing_relay_usecase,
            fetch_conversation_usecase,
            mark_read_usecase,
            directory,
        }
    }

    /// Build the axum router with all routes and shared state.
    ///
    /// Exposed separately from [`run`](Self::run) so tests can serve the app
    /// on an ephemeral port.
    pub fn build_router(self) -> Router {
        let app_state = Arc::new(AppState {
            connect_user_usecase: self.connect_user_usecase,
            disconnect_user_usecase: self.disconnect_user_usecase,
            send_message_usecase: self.send_message_usecase,
            typing_relay_usecase: self.typing_relay_usecase,
            fetch_conversation_usecase: self.fetch_conversation_usecase,
            mark_read_usecase: self.mark_read_usecase,
            directory: self.directory,
        });

        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/users", post(register_user).get(list_users))
            .route("/api/messages/{peer_id}", get(get_conversation))
            .layer(TraceLayer::new_for_http())
            .with_state(app_state)
    }

    /// Run the chat server
    ///
    /// # Arguments
    ///
    /// * `host` - The host address to bind to (e.g., "127.0.0.1")
    /// * `port` - The port number to bind to (e.g., 8080)
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address
    /// or if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let app = self.build_router();

        let bind_addr = format!("{}:{}", host, port);
        let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

        tracing::info!("fumi chat server listening on {}", listener.local_addr()?);
        tracing::info!("Connect to: ws://{}/ws", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
