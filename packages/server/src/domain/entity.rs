//! Domain entities.

use serde::{Deserialize, Serialize};

use super::value_object::{MessageContent, MessageId, Timestamp, UserId};

/// A persisted point-to-point message.
///
/// Immutable once created, except for the `read` flag which is flipped by an
/// explicit read acknowledgment from the recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectMessage {
    pub id: MessageId,
    pub sender: UserId,
    pub recipient: UserId,
    pub content: MessageContent,
    pub created_at: Timestamp,
    pub read: bool,
}

impl DirectMessage {
    /// The conversation partner as seen from `local`'s side.
    ///
    /// Returns `None` when `local` is neither participant.
    pub fn peer_of(&self, local: &UserId) -> Option<&UserId> {
        if &self.sender == local {
            Some(&self.recipient)
        } else if &self.recipient == local {
            Some(&self.sender)
        } else {
            None
        }
    }

    /// Whether this message belongs to the two-party conversation of `a` and `b`
    pub fn belongs_to(&self, a: &UserId, b: &UserId) -> bool {
        (&self.sender == a && &self.recipient == b) || (&self.sender == b && &self.recipient == a)
    }
}

/// A registered user as exposed by the user directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    pub username: String,
}
