//! MessageStore trait 定義
//!
//! メッセージ永続化（Durable Store コラボレータ）へのインターフェース。
//! UseCase 層はこの trait に依存し、Infrastructure 層の具体的な実装には
//! 依存しない（依存性の逆転）。

use async_trait::async_trait;

use super::entity::DirectMessage;
use super::error::StoreError;
use super::value_object::{MessageContent, Timestamp, UserId};

/// Message Store trait
///
/// メッセージの追記・会話ページの取得・既読化を提供する。
/// メッセージの削除・編集はこの層には存在しない。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// メッセージを追記し、生成された ID とタイムスタンプ付きで返す
    async fn append_message(
        &self,
        sender: UserId,
        recipient: UserId,
        content: MessageContent,
    ) -> Result<DirectMessage, StoreError>;

    /// 2 ユーザー間の会話ページを取得する
    ///
    /// `before` より前のメッセージを新しい側から最大 `limit` 件選び、
    /// 時系列昇順で返す。
    async fn fetch_conversation(
        &self,
        a: &UserId,
        b: &UserId,
        before: Timestamp,
        limit: usize,
    ) -> Result<Vec<DirectMessage>, StoreError>;

    /// `sender` から `recipient` へ送られた未読メッセージを既読にする
    ///
    /// 既読化された件数を返す。
    async fn mark_read(&self, sender: &UserId, recipient: &UserId) -> Result<u64, StoreError>;
}
