//! Client-side chat state: the local mirror of presence, conversations and
//! typing flags.
//!
//! All three structures are fed exclusively through [`ChatStore::apply`],
//! the single entry point for inbound server events. The store is owned by
//! the session's event loop and never shared across tasks, so no locking is
//! needed. Every read used for rendering re-derives from the current state
//! (presence can change between renders, typing flags expire against the
//! clock).
//!
//! Identifier normalization happens here too: whatever representation an
//! event carries, it goes through `UserId::parse` before any set membership
//! test or map access.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use fumi_server::domain::UserId;
use fumi_server::infrastructure::dto::websocket::{MessageDto, ServerEvent};
use fumi_shared::time::Clock;

/// A typing flag goes stale this many milliseconds after the last
/// typing-started signal, even if the peer's typing-stopped never arrives.
pub const TYPING_EXPIRY_MILLIS: i64 = 3_000;

/// Local mirror of the chat state as observed by one user.
pub struct ChatStore {
    /// The observing user; determines the conversation key of each message
    local_user: UserId,
    /// Who is currently online, seeded by presence-initial and updated
    /// incrementally
    online_users: HashSet<UserId>,
    /// Per-peer message lists, keyed by the conversation partner
    conversations: HashMap<UserId, Vec<MessageDto>>,
    /// Every message id present in any conversation bucket
    seen_message_ids: HashSet<String>,
    /// Last typing-started instant per peer (milliseconds)
    typing: HashMap<UserId, i64>,
    clock: Arc<dyn Clock>,
}

impl ChatStore {
    pub fn new(local_user: UserId, clock: Arc<dyn Clock>) -> Self {
        Self {
            local_user,
            online_users: HashSet::new(),
            conversations: HashMap::new(),
            seen_message_ids: HashSet::new(),
            typing: HashMap::new(),
            clock,
        }
    }

    pub fn local_user(&self) -> &UserId {
        &self.local_user
    }

    /// Resolve one inbound server event into the local structures.
    pub fn apply(&mut self, event: &ServerEvent) {
        match event {
            ServerEvent::PresenceInitial { online_user_ids } => {
                // Replace wholly: the snapshot is authoritative at connect time
                self.online_users = online_user_ids
                    .iter()
                    .filter_map(|raw| Self::normalize(raw))
                    .collect();
            }
            ServerEvent::PresenceOnline { user_id } => {
                if let Some(user_id) = Self::normalize(user_id) {
                    self.online_users.insert(user_id);
                }
            }
            ServerEvent::PresenceOffline { user_id } => {
                if let Some(user_id) = Self::normalize(user_id) {
                    self.online_users.remove(&user_id);
                    // An offline peer is by definition not typing anymore
                    self.typing.remove(&user_id);
                }
            }
            ServerEvent::MessageAck { message } | ServerEvent::MessageIncoming { message } => {
                self.insert_message(message);
            }
            ServerEvent::MessageError { .. } => {
                // Nothing to reconcile; the session layer displays the reason
            }
            ServerEvent::TypingStarted { user_id } => {
                if let Some(user_id) = Self::normalize(user_id) {
                    let now = self.clock.now_millis();
                    self.typing.insert(user_id, now);
                }
            }
            ServerEvent::TypingStopped { user_id } => {
                if let Some(user_id) = Self::normalize(user_id) {
                    self.typing.remove(&user_id);
                }
            }
        }
    }

    /// Insert a message into its conversation bucket.
    ///
    /// The bucket key is the participant that is not the local user. A
    /// message id already present in any bucket is dropped, not re-inserted.
    /// Returns whether the message was actually stored.
    pub fn insert_message(&mut self, message: &MessageDto) -> bool {
        if self.seen_message_ids.contains(&message.id) {
            return false;
        }

        let Some(sender) = Self::normalize(&message.sender_id) else {
            tracing::warn!("Dropping message '{}' with invalid sender id", message.id);
            return false;
        };
        let Some(recipient) = Self::normalize(&message.recipient_id) else {
            tracing::warn!("Dropping message '{}' with invalid recipient id", message.id);
            return false;
        };

        let conversation_key = if sender == self.local_user {
            recipient
        } else if recipient == self.local_user {
            sender
        } else {
            tracing::warn!(
                "Message '{}' does not involve the local user, bucketing under sender",
                message.id
            );
            sender
        };

        self.seen_message_ids.insert(message.id.clone());
        self.conversations
            .entry(conversation_key)
            .or_default()
            .push(message.clone());
        true
    }

    /// Replace the conversation with `peer` by a freshly fetched history page.
    pub fn set_conversation(&mut self, peer: &UserId, messages: Vec<MessageDto>) {
        if let Some(old) = self.conversations.remove(peer) {
            for message in &old {
                self.seen_message_ids.remove(&message.id);
            }
        }
        for message in messages {
            self.insert_message(&message);
        }
    }

    /// All currently online peers, sorted for stable display.
    pub fn online_users(&self) -> Vec<UserId> {
        let mut users: Vec<UserId> = self.online_users.iter().cloned().collect();
        users.sort();
        users
    }

    pub fn is_online(&self, user_id: &UserId) -> bool {
        self.online_users.contains(user_id)
    }

    /// The conversation with `peer`, in arrival order.
    pub fn conversation(&self, peer: &UserId) -> &[MessageDto] {
        self.conversations
            .get(peer)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Total number of stored messages across all buckets.
    pub fn message_count(&self) -> usize {
        self.conversations.values().map(Vec::len).sum()
    }

    /// Whether `peer` is currently typing, re-derived against the clock:
    /// a typing flag older than [`TYPING_EXPIRY_MILLIS`] no longer counts,
    /// even if the server never sent typing-stopped.
    pub fn is_typing(&self, peer: &UserId) -> bool {
        match self.typing.get(peer) {
            Some(started_at) => self.clock.now_millis() - started_at < TYPING_EXPIRY_MILLIS,
            None => false,
        }
    }

    /// Drop expired typing flags. Called opportunistically by the session
    /// loop; correctness does not depend on it because `is_typing`
    /// re-derives anyway.
    pub fn sweep_typing(&mut self) {
        let now = self.clock.now_millis();
        self.typing
            .retain(|_, started_at| now - *started_at < TYPING_EXPIRY_MILLIS);
    }

    fn normalize(raw: &str) -> Option<UserId> {
        match UserId::parse(raw) {
            Ok(user_id) => Some(user_id),
            Err(e) => {
                tracing::warn!("Dropping event with invalid user id '{}': {}", raw, e);
                None
            }
        }
    }
}
