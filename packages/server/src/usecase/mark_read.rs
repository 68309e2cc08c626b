//! UseCase: 会話の既読化
//!
//! WebSocket の message-read イベントから呼ばれる。受信者（= 呼び出し
//! 主）が、指定した相手から自分宛てのメッセージを既読にする。
//! 自分が受信者でないメッセージには決して作用しない。

use std::sync::Arc;

use crate::domain::{MessageStore, UserDirectory, UserId};

use super::error::MarkReadError;

/// 会話既読化のユースケース
pub struct MarkConversationReadUseCase {
    /// UserDirectory（相手の実在チェックの抽象化）
    directory: Arc<dyn UserDirectory>,
    /// MessageStore（永続化の抽象化）
    store: Arc<dyn MessageStore>,
}

impl MarkConversationReadUseCase {
    /// 新しい MarkConversationReadUseCase を作成
    pub fn new(directory: Arc<dyn UserDirectory>, store: Arc<dyn MessageStore>) -> Self {
        Self { directory, store }
    }

    /// `peer_raw` から `caller` 宛てのメッセージを既読化し、件数を返す
    pub async fn execute(&self, caller: &UserId, peer_raw: &str) -> Result<u64, MarkReadError> {
        let peer = UserId::parse(peer_raw).map_err(|_| MarkReadError::UnknownPeer)?;
        if !self.directory.user_exists(&peer).await {
            return Err(MarkReadError::UnknownPeer);
        }

        let marked = self.store.mark_read(&peer, caller).await?;
        tracing::debug!(
            "Marked {} messages from '{}' to '{}' as read",
            marked,
            peer,
            caller
        );
        Ok(marked)
    }
}
