//! WebSocket wire protocol DTOs.
//!
//! Every event travelling over the per-connection duplex channel is one of
//! these two enums, serialized as internally-tagged JSON (`"type"` field,
//! kebab-case). The client crate consumes these definitions directly, so the
//! protocol is defined in exactly one place.

use serde::{Deserialize, Serialize};

/// A persisted direct message as it appears on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDto {
    pub id: String,
    pub sender_id: String,
    pub recipient_id: String,
    pub content: String,
    /// Unix timestamp in milliseconds (UTC)
    pub created_at: i64,
    pub read: bool,
}

/// Events pushed from the server to a client connection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerEvent {
    /// Full presence snapshot, sent exactly once right after connecting
    PresenceInitial { online_user_ids: Vec<String> },
    /// A peer came online
    PresenceOnline { user_id: String },
    /// A peer went offline
    PresenceOffline { user_id: String },
    /// Confirmation to the sender that the message was persisted
    MessageAck { message: MessageDto },
    /// A new message addressed to this connection's user
    MessageIncoming { message: MessageDto },
    /// A send failed; reported to the sender only
    MessageError { reason: String },
    /// A peer started typing in the conversation with this user
    TypingStarted { user_id: String },
    /// A peer stopped typing
    TypingStopped { user_id: String },
}

/// Events sent from a client to the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientEvent {
    /// Send a direct message to another user
    MessageSend { recipient_id: String, content: String },
    /// Started typing in the conversation with `recipient_id`
    TypingStart { recipient_id: String },
    /// Stopped typing
    TypingStop { recipient_id: String },
    /// Mark the conversation with `peer_id` as read (peer → me direction)
    MessageRead { peer_id: String },
}
