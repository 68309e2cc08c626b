//! InMemory MessageStore 実装
//!
//! ドメイン層が定義する MessageStore trait の具体的な実装。
//! Vec をインメモリ DB として使用します（追記順 = 時系列順）。
//!
//! ## 技術的負債
//!
//! 本番構成では PostgreSQL などの DBMS 実装に差し替える前提。
//! その際は会話ページ取得に (sender, recipient, created_at) の複合
//! インデックスが必要になる。

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use fumi_shared::time::Clock;

use crate::domain::{
    DirectMessage, MessageContent, MessageIdFactory, MessageStore, StoreError, Timestamp, UserId,
};

/// インメモリ Message Store 実装
pub struct InMemoryMessageStore {
    /// 追記順に並んだ全メッセージ
    messages: Mutex<Vec<DirectMessage>>,
    /// タイムスタンプ生成用のクロック
    clock: Arc<dyn Clock>,
}

impl InMemoryMessageStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            messages: Mutex::new(Vec::new()),
            clock,
        }
    }

    /// 保存済みメッセージ数を取得（テスト用）
    pub async fn count_messages(&self) -> usize {
        self.messages.lock().await.len()
    }
}

#[async_trait]
impl MessageStore for InMemoryMessageStore {
    async fn append_message(
        &self,
        sender: UserId,
        recipient: UserId,
        content: MessageContent,
    ) -> Result<DirectMessage, StoreError> {
        let message = DirectMessage {
            id: MessageIdFactory::generate(),
            sender,
            recipient,
            content,
            created_at: Timestamp::new(self.clock.now_millis()),
            read: false,
        };

        let mut messages = self.messages.lock().await;
        messages.push(message.clone());
        Ok(message)
    }

    async fn fetch_conversation(
        &self,
        a: &UserId,
        b: &UserId,
        before: Timestamp,
        limit: usize,
    ) -> Result<Vec<DirectMessage>, StoreError> {
        let messages = self.messages.lock().await;

        // 追記順 = 時系列昇順。新しい側から limit 件を選び、昇順のまま返す。
        let matching: Vec<DirectMessage> = messages
            .iter()
            .filter(|m| m.belongs_to(a, b) && m.created_at < before)
            .cloned()
            .collect();

        let skip = matching.len().saturating_sub(limit);
        Ok(matching.into_iter().skip(skip).collect())
    }

    async fn mark_read(&self, sender: &UserId, recipient: &UserId) -> Result<u64, StoreError> {
        let mut messages = self.messages.lock().await;

        let mut marked = 0;
        for message in messages.iter_mut() {
            if &message.sender == sender && &message.recipient == recipient && !message.read {
                message.read = true;
                marked += 1;
            }
        }

        Ok(marked)
    }
}
