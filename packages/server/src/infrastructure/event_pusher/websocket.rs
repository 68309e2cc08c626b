//! WebSocket を使った EventPusher 実装
//!
//! ## 責務
//!
//! - ConnectionRegistry から配送先チャンネルを引き、イベントを送信する
//! - ブロードキャストの部分失敗を許容する（presence はベストエフォート）
//!
//! ## 設計ノート
//!
//! WebSocket の生成・接続の登録は UI 層（`ui/handler/websocket.rs`）が行い、
//! この実装は Registry に登録済みのチャンネルへ送信するだけです。
//! 「接続の所有」と「イベントの送信」が分離されます。

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{ConnectionRegistry, EventPusher, PushError, UserId};

/// WebSocket 経由の EventPusher 実装
pub struct WebSocketEventPusher {
    /// 配送先の解決に使う Connection Registry
    registry: Arc<dyn ConnectionRegistry>,
}

impl WebSocketEventPusher {
    pub fn new(registry: Arc<dyn ConnectionRegistry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl EventPusher for WebSocketEventPusher {
    async fn push_to(&self, user_id: &UserId, event: &str) -> Result<(), PushError> {
        match self.registry.lookup(user_id).await {
            Some(sender) => {
                sender
                    .send(event.to_string())
                    .map_err(|_| PushError::PushFailed(user_id.as_str().to_string()))?;
                tracing::debug!("Pushed event to '{}'", user_id);
                Ok(())
            }
            None => Err(PushError::NotConnected(user_id.as_str().to_string())),
        }
    }

    async fn broadcast(&self, targets: Vec<UserId>, event: &str) -> Result<(), PushError> {
        for target in targets {
            match self.registry.lookup(&target).await {
                Some(sender) => {
                    // ブロードキャストでは一部の送信失敗を許容
                    if sender.send(event.to_string()).is_err() {
                        tracing::warn!("Failed to push event to '{}', skipping", target);
                    } else {
                        tracing::debug!("Broadcasted event to '{}'", target);
                    }
                }
                None => {
                    tracing::warn!("User '{}' not found during broadcast, skipping", target);
                }
            }
        }

        Ok(())
    }
}
