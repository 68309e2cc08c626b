//! WebSocket client session management.
//!
//! One session = one WebSocket connection. The session owns the
//! [`ChatStore`] and updates it from a single select loop (server frames and
//! user input are interleaved in one task, so the store never needs
//! locking).

use std::collections::HashMap;
use std::sync::Arc;

use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async, tungstenite::protocol::Message,
};

use fumi_server::domain::UserId;
use fumi_server::infrastructure::dto::websocket::{ClientEvent, ServerEvent};
use fumi_shared::time::SystemClock;

use crate::{
    api::ApiClient, error::ClientError, formatter::MessageFormatter, store::ChatStore,
    ui::redisplay_prompt,
};

type WsWriter = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;

/// Derive the WebSocket endpoint from the HTTP base URL.
pub fn websocket_url(server_url: &str) -> String {
    let base = server_url.trim_end_matches('/');
    let ws_base = if let Some(rest) = base.strip_prefix("https://") {
        format!("wss://{}", rest)
    } else if let Some(rest) = base.strip_prefix("http://") {
        format!("ws://{}", rest)
    } else {
        base.to_string()
    };
    format!("{}/ws", ws_base)
}

/// What the input handler decided about the session
enum InputOutcome {
    Continue,
    Quit,
}

/// Run one WebSocket client session until the connection drops or the user
/// quits.
pub async fn run_client_session(
    server_url: &str,
    token: &str,
    local_user_id: &str,
    local_username: &str,
    api: &ApiClient,
) -> Result<(), ClientError> {
    let url = format!("{}?token={}", websocket_url(server_url), token);

    let (ws_stream, _response) = match connect_async(&url).await {
        Ok(result) => result,
        Err(e) => {
            let error_msg = e.to_string();

            // An HTTP 401 before the upgrade means the credential was
            // rejected; reconnecting with the same token is pointless.
            if error_msg.contains("401") || error_msg.contains("Unauthorized") {
                return Err(ClientError::AuthenticationFailed(error_msg));
            }

            return Err(ClientError::ConnectionError(error_msg));
        }
    };

    tracing::info!("Connected to chat server");
    println!(
        "\nYou are '{}'. Commands: /users, /chat <user>, /quit. Plain text goes to the selected conversation.\n",
        local_username
    );

    // Display names for peers, refreshed once per session
    let users = api.list_users().await?;
    let mut names: HashMap<String, String> = HashMap::new();
    let mut ids_by_name: HashMap<String, String> = HashMap::new();
    for user in users {
        names.insert(user.user_id.clone(), user.username.clone());
        ids_by_name.insert(user.username, user.user_id);
    }

    let local_id = UserId::parse(local_user_id)
        .map_err(|e| ClientError::ApiError(format!("server returned invalid user id: {}", e)))?;
    let mut store = ChatStore::new(local_id, Arc::new(SystemClock));
    let mut selected: Option<UserId> = None;

    let (mut write, mut read) = ws_stream.split();

    // Create channel for rustyline input
    let (input_tx, mut input_rx) = mpsc::unbounded_channel::<String>();

    // Spawn a blocking thread for rustyline (synchronous readline)
    let prompt_name = local_username.to_string();
    let _readline_handle = std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                eprintln!("Failed to initialize readline: {}", e);
                return;
            }
        };

        let prompt = format!("{}> ", prompt_name);

        loop {
            match rl.readline(&prompt) {
                Ok(line) => {
                    let line = line.trim();
                    if !line.is_empty() {
                        rl.add_history_entry(line).ok();
                        if input_tx.send(line.to_string()).is_err() {
                            break;
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    // Ctrl+C
                    tracing::info!("Interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    // Ctrl+D
                    tracing::info!("EOF");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    break;
                }
            }
        }
    });

    // One loop, one owner of the store: server frames and input lines are
    // interleaved here, never processed concurrently.
    loop {
        tokio::select! {
            frame = read.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        handle_server_frame(&mut store, &names, local_username, &text);
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        tracing::info!("Server closed the connection");
                        return Err(ClientError::ConnectionError(
                            "Connection lost".to_string(),
                        ));
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::warn!("WebSocket read error: {}", e);
                        return Err(ClientError::ConnectionError(e.to_string()));
                    }
                }
            }
            line = input_rx.recv() => {
                match line {
                    Some(line) => {
                        let outcome = handle_input_line(
                            &mut write,
                            &mut store,
                            &mut selected,
                            &names,
                            &ids_by_name,
                            local_username,
                            api,
                            &line,
                        )
                        .await?;
                        if matches!(outcome, InputOutcome::Quit) {
                            return Ok(());
                        }
                    }
                    // Readline thread ended (Ctrl+C / Ctrl+D): normal exit
                    None => return Ok(()),
                }
            }
        }
    }
}

/// Resolve one server frame into the store and render it.
fn handle_server_frame(
    store: &mut ChatStore,
    names: &HashMap<String, String>,
    local_username: &str,
    text: &str,
) {
    let event = match serde_json::from_str::<ServerEvent>(text) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!("Ignoring unparseable server frame: {}", e);
            return;
        }
    };

    store.apply(&event);
    store.sweep_typing();

    let display_name =
        |raw: &str| -> String { names.get(raw).cloned().unwrap_or_else(|| raw.to_string()) };

    let formatted = match &event {
        ServerEvent::PresenceInitial { online_user_ids } => {
            let online: Vec<String> = online_user_ids.iter().map(|id| display_name(id)).collect();
            MessageFormatter::format_presence_initial(&online)
        }
        ServerEvent::PresenceOnline { user_id } => {
            MessageFormatter::format_presence_online(&display_name(user_id))
        }
        ServerEvent::PresenceOffline { user_id } => {
            MessageFormatter::format_presence_offline(&display_name(user_id))
        }
        ServerEvent::MessageAck { message } => MessageFormatter::format_ack(message.created_at),
        ServerEvent::MessageIncoming { message } => MessageFormatter::format_incoming_message(
            &display_name(&message.sender_id),
            &message.content,
            message.created_at,
        ),
        ServerEvent::MessageError { reason } => MessageFormatter::format_message_error(reason),
        ServerEvent::TypingStarted { user_id } => {
            MessageFormatter::format_typing_started(&display_name(user_id))
        }
        ServerEvent::TypingStopped { user_id } => {
            MessageFormatter::format_typing_stopped(&display_name(user_id))
        }
    };

    print!("{}", formatted);
    redisplay_prompt(local_username);
}

/// Dispatch one line of user input: a command or a message to the selected
/// conversation.
#[allow(clippy::too_many_arguments)]
async fn handle_input_line(
    write: &mut WsWriter,
    store: &mut ChatStore,
    selected: &mut Option<UserId>,
    names: &HashMap<String, String>,
    ids_by_name: &HashMap<String, String>,
    local_username: &str,
    api: &ApiClient,
    line: &str,
) -> Result<InputOutcome, ClientError> {
    if line == "/quit" {
        return Ok(InputOutcome::Quit);
    }

    if line == "/users" {
        // Re-derive from the store: presence may have changed since the
        // last render
        let online = store.online_users();
        let online_names: Vec<String> = online
            .iter()
            .map(|id| {
                names
                    .get(id.as_str())
                    .cloned()
                    .unwrap_or_else(|| id.to_string())
            })
            .collect();
        print!(
            "{}",
            MessageFormatter::format_presence_initial(&online_names)
        );
        redisplay_prompt(local_username);
        return Ok(InputOutcome::Continue);
    }

    if let Some(target) = line.strip_prefix("/chat ") {
        let target = target.trim();
        let peer_raw = ids_by_name
            .get(target)
            .cloned()
            .unwrap_or_else(|| target.to_string());

        let peer = match UserId::parse(&peer_raw) {
            Ok(peer) => peer,
            Err(_) => {
                println!("Unknown user '{}'", target);
                redisplay_prompt(local_username);
                return Ok(InputOutcome::Continue);
            }
        };

        // Fetching the history also marks the peer→me direction read on
        // the server
        match api.fetch_conversation(peer.as_str(), None, None).await {
            Ok(history) => {
                store.set_conversation(&peer, history);
                let peer_name = names
                    .get(peer.as_str())
                    .cloned()
                    .unwrap_or_else(|| peer.to_string());
                print!(
                    "{}",
                    MessageFormatter::format_history(
                        &peer_name,
                        store.conversation(&peer),
                        store.local_user().as_str(),
                    )
                );
                *selected = Some(peer);
            }
            Err(ClientError::ApiError(reason)) => {
                println!("Could not open conversation: {}", reason);
            }
            Err(e) => return Err(e),
        }
        redisplay_prompt(local_username);
        return Ok(InputOutcome::Continue);
    }

    // Plain text goes to the selected conversation
    let Some(peer) = selected.as_ref() else {
        println!("No conversation selected. Use /chat <user> first.");
        redisplay_prompt(local_username);
        return Ok(InputOutcome::Continue);
    };

    let send_event = ClientEvent::MessageSend {
        recipient_id: peer.as_str().to_string(),
        content: line.to_string(),
    };
    send_client_event(write, &send_event).await?;

    // Submitting the line ends the composing state; clear any stale typing
    // indicator on the peer's side
    let stop_event = ClientEvent::TypingStop {
        recipient_id: peer.as_str().to_string(),
    };
    send_client_event(write, &stop_event).await?;

    Ok(InputOutcome::Continue)
}

async fn send_client_event(write: &mut WsWriter, event: &ClientEvent) -> Result<(), ClientError> {
    let json = serde_json::to_string(event)
        .map_err(|e| ClientError::ConnectionError(format!("failed to serialize event: {}", e)))?;
    write
        .send(Message::Text(json.into()))
        .await
        .map_err(|e| ClientError::ConnectionError(e.to_string()))
}
