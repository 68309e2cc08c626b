//! Domain value objects.
//!
//! Every identifier or text payload entering the core passes through one of
//! these constructors. `UserId::parse` is the single normalization point for
//! user identifiers: whatever representation arrives on the wire, from a
//! credential, or from storage, it is trimmed into one canonical string form
//! before it is ever used as a map key or compared.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::DomainError;

/// Maximum length of a user identifier (characters)
pub const MAX_USER_ID_CHARS: usize = 128;

/// Maximum length of a message body (characters)
pub const MAX_MESSAGE_CHARS: usize = 1000;

/// Canonical user identifier.
///
/// Always stored in normalized form (surrounding whitespace stripped,
/// non-empty). Two `UserId`s compare equal iff their canonical strings are
/// equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Normalize a raw identifier into its canonical form.
    pub fn parse(raw: impl AsRef<str>) -> Result<Self, DomainError> {
        let normalized = raw.as_ref().trim();
        if normalized.is_empty() {
            return Err(DomainError::EmptyUserId);
        }
        if normalized.chars().count() > MAX_USER_ID_CHARS {
            return Err(DomainError::UserIdTooLong);
        }
        Ok(Self(normalized.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for UserId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl TryFrom<&str> for UserId {
    type Error = DomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Message body text.
///
/// Trimmed on construction; must be non-empty and at most
/// [`MAX_MESSAGE_CHARS`] characters after trimming.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageContent(String);

impl MessageContent {
    pub fn new(raw: impl AsRef<str>) -> Result<Self, DomainError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(DomainError::EmptyMessage);
        }
        let chars = trimmed.chars().count();
        if chars > MAX_MESSAGE_CHARS {
            return Err(DomainError::MessageTooLong(chars));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Unix timestamp in milliseconds (UTC)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(millis: i64) -> Self {
        Self(millis)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

/// Unique message identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    pub fn new(raw: impl AsRef<str>) -> Result<Self, DomainError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(DomainError::EmptyMessageId);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// MessageId の生成ファクトリ
pub struct MessageIdFactory;

impl MessageIdFactory {
    /// Generate a fresh random message id (UUID v4)
    pub fn generate() -> MessageId {
        MessageId(Uuid::new_v4().to_string())
    }
}

/// UserId の生成ファクトリ（新規ユーザー登録時に使用）
pub struct UserIdFactory;

impl UserIdFactory {
    /// Generate a fresh random user id (UUID v4, already canonical)
    pub fn generate() -> UserId {
        UserId(Uuid::new_v4().to_string())
    }
}
