//! UseCase: ダイレクトメッセージ送信処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SendDirectMessageUseCase::execute() メソッド
//! - バリデーション → 受信者実在チェック → 永続化の順序
//! - 永続化失敗時に配送が一切行われないこと（persist-then-notify）
//!
//! ### なぜこのテストが必要か
//! - 「永続化されていないメッセージを通知しない」ことを保証
//! - 空・過長メッセージや未知の受信者が保存もブロードキャストもされない
//!   ことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系: オンライン / オフライン受信者へのメッセージ送信
//! - 異常系: バリデーション失敗、受信者不在、ストア障害

use std::sync::Arc;

use crate::domain::{
    DirectMessage, EventPusher, MessageContent, MessageStore, PushError, UserDirectory, UserId,
};

use super::error::SendMessageError;

/// メッセージ送信のユースケース
pub struct SendDirectMessageUseCase {
    /// UserDirectory（受信者実在チェックの抽象化）
    directory: Arc<dyn UserDirectory>,
    /// MessageStore（永続化の抽象化）
    store: Arc<dyn MessageStore>,
    /// EventPusher（配送の抽象化）
    pusher: Arc<dyn EventPusher>,
}

impl SendDirectMessageUseCase {
    /// 新しい SendDirectMessageUseCase を作成
    pub fn new(
        directory: Arc<dyn UserDirectory>,
        store: Arc<dyn MessageStore>,
        pusher: Arc<dyn EventPusher>,
    ) -> Self {
        Self {
            directory,
            store,
            pusher,
        }
    }

    /// メッセージ送信を実行
    ///
    /// バリデーションと永続化のみを行い、配送は行わない。呼び出し側は
    /// 返ってきた `DirectMessage` から ack / incoming イベントを組み立て、
    /// `deliver_ack` / `deliver_incoming` で配送する（永続化が完了する
    /// まで配送が始まらないことがこの分割で保証される）。
    ///
    /// # Arguments
    ///
    /// * `sender` - 送信者の ID（認証済み・正規化済み）
    /// * `recipient_raw` - ワイヤから来た受信者 ID（未正規化）
    /// * `content_raw` - ワイヤから来た本文（未検証）
    pub async fn execute(
        &self,
        sender: UserId,
        recipient_raw: &str,
        content_raw: &str,
    ) -> Result<DirectMessage, SendMessageError> {
        // 1. ingress 正規化とバリデーション
        let recipient =
            UserId::parse(recipient_raw).map_err(|_| SendMessageError::UnknownRecipient)?;
        let content = MessageContent::new(content_raw)?;

        // 2. 受信者の実在チェック
        if !self.directory.user_exists(&recipient).await {
            return Err(SendMessageError::UnknownRecipient);
        }

        // 3. 永続化（ID とタイムスタンプはストアが生成する）
        let message = self.store.append_message(sender, recipient, content).await?;

        Ok(message)
    }

    /// 送信者自身に message-ack を配送する
    ///
    /// ack は無条件（永続化の確認）。送信直後に切断したなど配送できない
    /// 場合はログに残して握りつぶす。
    pub async fn deliver_ack(&self, sender: &UserId, event: &str) {
        if let Err(e) = self.pusher.push_to(sender, event).await {
            tracing::warn!("Failed to deliver ack to '{}': {}", sender, e);
        }
    }

    /// 受信者に message-incoming を配送する
    ///
    /// オフラインならスキップする（メッセージは永続化済みで、受信者は
    /// 次回の会話履歴取得で発見する）。配送されたかどうかを返す。
    pub async fn deliver_incoming(&self, recipient: &UserId, event: &str) -> bool {
        match self.pusher.push_to(recipient, event).await {
            Ok(()) => true,
            Err(PushError::NotConnected(_)) => {
                tracing::debug!(
                    "Recipient '{}' is offline; message stays persisted, realtime push skipped",
                    recipient
                );
                false
            }
            Err(e) => {
                tracing::warn!("Failed to deliver message to '{}': {}", recipient, e);
                false
            }
        }
    }
}
