//! Conversion logic between DTOs and domain entities.

use crate::domain::{
    DirectMessage, DomainError, MessageContent, MessageId, Timestamp, UserId, UserRecord,
};
use crate::infrastructure::dto::http::UserSummaryDto;
use crate::infrastructure::dto::websocket::MessageDto;

// ========================================
// Domain Entity → DTO
// ========================================

impl From<DirectMessage> for MessageDto {
    fn from(message: DirectMessage) -> Self {
        Self {
            id: message.id.to_string(),
            sender_id: message.sender.into_string(),
            recipient_id: message.recipient.into_string(),
            content: message.content.into_string(),
            created_at: message.created_at.value(),
            read: message.read,
        }
    }
}

impl From<UserRecord> for UserSummaryDto {
    fn from(record: UserRecord) -> Self {
        Self {
            user_id: record.id.into_string(),
            username: record.username,
        }
    }
}

// ========================================
// DTO → Domain Entity
// ========================================
//
// ワイヤ表現は信頼できない入力なので、こちら側は TryFrom で正規化と
// 検証を通す（すべての ingress で UserId::parse を経由させる）。

impl TryFrom<MessageDto> for DirectMessage {
    type Error = DomainError;

    fn try_from(dto: MessageDto) -> Result<Self, Self::Error> {
        Ok(Self {
            id: MessageId::new(dto.id)?,
            sender: UserId::parse(dto.sender_id)?,
            recipient: UserId::parse(dto.recipient_id)?,
            content: MessageContent::new(dto.content)?,
            created_at: Timestamp::new(dto.created_at),
            read: dto.read,
        })
    }
}
