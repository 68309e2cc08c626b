//! WebSocket connection handlers.
//!
//! Connection lifecycle: verify the credential before the upgrade (a bad
//! token never reaches the registry), register the connection, send the
//! presence snapshot directly on the socket sink, then broadcast
//! presence-online. Incoming frames from the pusher channel only start
//! draining after the snapshot went out, which gives every observer the
//! "snapshot before increments" ordering.

use std::sync::Arc;

use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;

use crate::{
    domain::{ConnectionTicket, PusherChannel, UserId},
    infrastructure::dto::websocket::{ClientEvent, MessageDto, ServerEvent},
    ui::state::AppState,
    usecase::DisconnectError,
};

/// Query parameters for WebSocket connection
#[derive(Debug, Deserialize)]
pub struct ConnectQuery {
    pub token: Option<String>,
}

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ConnectQuery>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, StatusCode> {
    // Token comes from the query string or the Authorization header
    let token = query
        .token
        .or_else(|| {
            headers
                .get(axum::http::header::AUTHORIZATION)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.strip_prefix("Bearer "))
                .map(str::to_string)
        })
        .ok_or_else(|| {
            tracing::warn!("WebSocket connect without credential rejected");
            StatusCode::UNAUTHORIZED
        })?;

    // Authentication failure refuses the connection before it is established;
    // it never enters the registry.
    let user_id = match state.directory.verify_token(&token).await {
        Ok(user_id) => user_id,
        Err(e) => {
            tracing::warn!("WebSocket connect with bad credential rejected: {}", e);
            return Err(StatusCode::UNAUTHORIZED);
        }
    };

    tracing::info!("User '{}' authenticated, upgrading connection", user_id);
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, user_id)))
}

/// Spawns a task that receives events from the rx channel and pushes them to
/// the WebSocket sender.
///
/// The handshake (presence snapshot) is written to the sink before this loop
/// starts, so queued events never overtake it.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            if sender.send(Message::Text(event.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, user_id: UserId) {
    let (mut sender, receiver) = socket.split();

    // Channel this connection's events will be delivered through. A clone is
    // kept for reporting errors back to this connection only.
    let (tx, rx) = mpsc::unbounded_channel();
    let self_tx = tx.clone();

    // Register the connection. The presence snapshot is computed inside the
    // same lock that inserts the entry, so it cannot interleave with other
    // connects.
    let outcome = state
        .connect_user_usecase
        .execute(user_id.clone(), tx)
        .await;
    tracing::info!("User '{}' connected and registered", user_id);

    // Send the presence snapshot to the new connection, exactly once,
    // directly on the sink (the pusher loop has not started yet).
    {
        let initial = ServerEvent::PresenceInitial {
            online_user_ids: outcome
                .peers_online
                .iter()
                .map(|id| id.as_str().to_string())
                .collect(),
        };
        let initial_json = serde_json::to_string(&initial).unwrap();
        if let Err(e) = sender.send(Message::Text(initial_json.into())).await {
            tracing::error!("Failed to send presence snapshot to '{}': {}", user_id, e);
            finish_connection(&state, &user_id, outcome.ticket).await;
            return;
        }
        tracing::info!("Sent presence snapshot to '{}'", user_id);
    }

    // Tell everyone else this user appeared. On a replacing login the peers
    // already consider the user online; the extra event is idempotent on the
    // client side.
    {
        let online = ServerEvent::PresenceOnline {
            user_id: user_id.as_str().to_string(),
        };
        let online_json = serde_json::to_string(&online).unwrap();
        if let Err(e) = state
            .connect_user_usecase
            .broadcast_online(&user_id, &online_json)
            .await
        {
            tracing::warn!("Failed to broadcast presence-online: {}", e);
        }
    }

    // Outbound: drain the pusher channel into the socket
    let mut send_task = pusher_loop(rx, sender);

    // Inbound: process frames from this client one at a time, in arrival
    // order (per-connection sends are sequential by construction)
    let recv_state = state.clone();
    let recv_user_id = user_id.clone();
    let mut recv_task = tokio::spawn(async move {
        let mut receiver = receiver;
        while let Some(frame) = receiver.next().await {
            let frame = match frame {
                Ok(frame) => frame,
                Err(e) => {
                    tracing::debug!("WebSocket error for '{}': {}", recv_user_id, e);
                    break;
                }
            };

            match frame {
                Message::Text(text) => {
                    handle_client_event(&recv_state, &recv_user_id, &self_tx, &text).await;
                }
                Message::Ping(_) => {
                    // Ping/pong is handled automatically by the WebSocket protocol
                    tracing::debug!("Received ping from '{}'", recv_user_id);
                }
                Message::Close(_) => {
                    tracing::info!("User '{}' requested close", recv_user_id);
                    break;
                }
                _ => {}
            }
        }
    });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    finish_connection(&state, &user_id, outcome.ticket).await;
}

/// Unregister the connection and broadcast presence-offline to whoever
/// remains. A stale disconnect (this connection was replaced by a newer
/// login) changes nothing: the user is still online.
async fn finish_connection(state: &Arc<AppState>, user_id: &UserId, ticket: ConnectionTicket) {
    match state.disconnect_user_usecase.execute(user_id, ticket).await {
        Ok(targets) => {
            tracing::info!("User '{}' disconnected and removed from registry", user_id);

            let offline = ServerEvent::PresenceOffline {
                user_id: user_id.as_str().to_string(),
            };
            let offline_json = serde_json::to_string(&offline).unwrap();
            if let Err(e) = state
                .disconnect_user_usecase
                .broadcast_offline(targets, &offline_json)
                .await
            {
                tracing::warn!("Failed to broadcast presence-offline: {}", e);
            }
        }
        Err(DisconnectError::Superseded) => {
            tracing::debug!(
                "Stale connection for '{}' closed; newer login stays online",
                user_id
            );
        }
    }
}

/// Dispatch one inbound client event.
///
/// Failures are reported to this connection only, through `self_tx`, and
/// never terminate the connection. Unparseable frames are logged and
/// dropped.
async fn handle_client_event(
    state: &Arc<AppState>,
    user_id: &UserId,
    self_tx: &PusherChannel,
    text: &str,
) {
    let event = match serde_json::from_str::<ClientEvent>(text) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!("Ignoring unparseable frame from '{}': {}", user_id, e);
            return;
        }
    };

    match event {
        ClientEvent::MessageSend {
            recipient_id,
            content,
        } => {
            match state
                .send_message_usecase
                .execute(user_id.clone(), &recipient_id, &content)
                .await
            {
                Ok(message) => {
                    let recipient = message.recipient.clone();
                    let dto = MessageDto::from(message);

                    // Ack to the sender first (confirms persistence), then
                    // realtime delivery to the recipient if online.
                    let ack = ServerEvent::MessageAck {
                        message: dto.clone(),
                    };
                    let ack_json = serde_json::to_string(&ack).unwrap();
                    state.send_message_usecase.deliver_ack(user_id, &ack_json).await;

                    let incoming = ServerEvent::MessageIncoming { message: dto };
                    let incoming_json = serde_json::to_string(&incoming).unwrap();
                    let delivered = state
                        .send_message_usecase
                        .deliver_incoming(&recipient, &incoming_json)
                        .await;

                    tracing::info!(
                        "Message from '{}' to '{}' persisted (realtime delivery: {})",
                        user_id,
                        recipient,
                        delivered
                    );
                }
                Err(e) => {
                    tracing::warn!("Send from '{}' failed: {}", user_id, e);
                    let error = ServerEvent::MessageError {
                        reason: e.to_string(),
                    };
                    let error_json = serde_json::to_string(&error).unwrap();
                    if self_tx.send(error_json).is_err() {
                        tracing::debug!("Connection for '{}' gone before error report", user_id);
                    }
                }
            }
        }
        ClientEvent::TypingStart { recipient_id } => {
            let event = ServerEvent::TypingStarted {
                user_id: user_id.as_str().to_string(),
            };
            let event_json = serde_json::to_string(&event).unwrap();
            state
                .typing_relay_usecase
                .forward(&recipient_id, &event_json)
                .await;
        }
        ClientEvent::TypingStop { recipient_id } => {
            let event = ServerEvent::TypingStopped {
                user_id: user_id.as_str().to_string(),
            };
            let event_json = serde_json::to_string(&event).unwrap();
            state
                .typing_relay_usecase
                .forward(&recipient_id, &event_json)
                .await;
        }
        ClientEvent::MessageRead { peer_id } => {
            if let Err(e) = state.mark_read_usecase.execute(user_id, &peer_id).await {
                tracing::warn!("Read acknowledgment from '{}' failed: {}", user_id, e);
            }
        }
    }
}
