//! UseCase: タイピング通知の中継
//!
//! 完全にステートレス。受信者がオンラインならイベントを転送し、
//! オフラインなら黙って捨てる。永続化もキューイングも再送もしない。

use std::sync::Arc;

use crate::domain::{EventPusher, PushError, UserId};

/// タイピング通知中継のユースケース
pub struct TypingRelayUseCase {
    /// EventPusher（配送の抽象化）
    pusher: Arc<dyn EventPusher>,
}

impl TypingRelayUseCase {
    /// 新しい TypingRelayUseCase を作成
    pub fn new(pusher: Arc<dyn EventPusher>) -> Self {
        Self { pusher }
    }

    /// typing-started / typing-stopped イベントを受信者に転送する
    ///
    /// ベストエフォート: 受信者がオフライン・ID が不正・送信失敗の
    /// いずれもエラーにせず、ログだけ残して戻る。
    pub async fn forward(&self, recipient_raw: &str, event: &str) {
        let recipient = match UserId::parse(recipient_raw) {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!("Dropping typing signal with invalid recipient: {}", e);
                return;
            }
        };

        match self.pusher.push_to(&recipient, event).await {
            Ok(()) => {}
            Err(PushError::NotConnected(_)) => {
                tracing::debug!("Recipient '{}' offline, typing signal dropped", recipient);
            }
            Err(e) => {
                tracing::warn!("Failed to forward typing signal to '{}': {}", recipient, e);
            }
        }
    }
}
