//! UseCase: ユーザー切断処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectUserUseCase::execute() メソッド
//! - チケット照合付きの登録解除と、presence-offline の通知対象選定
//!
//! ### なぜこのテストが必要か
//! - 置き換え済みの古い接続の切断が、新しい接続を誤って追い出さない
//!   こと（stale disconnect ガード）の回帰テスト
//! - 最後のユーザーが切断した場合に通知対象が空になることを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系: 接続中ユーザーの切断と残存ユーザーへの通知
//! - 異常系: 置き換え済みチケットでの切断試行
//! - エッジケース: 最後のユーザーの切断

use std::sync::Arc;

use crate::domain::{ConnectionRegistry, ConnectionTicket, EventPusher, PushError, UserId};

use super::error::DisconnectError;

/// ユーザー切断のユースケース
pub struct DisconnectUserUseCase {
    /// Connection Registry（接続マップの抽象化）
    registry: Arc<dyn ConnectionRegistry>,
    /// EventPusher（イベント通知の抽象化）
    pusher: Arc<dyn EventPusher>,
}

impl DisconnectUserUseCase {
    /// 新しい DisconnectUserUseCase を作成
    pub fn new(registry: Arc<dyn ConnectionRegistry>, pusher: Arc<dyn EventPusher>) -> Self {
        Self { registry, pusher }
    }

    /// 切断を実行
    ///
    /// # Arguments
    ///
    /// * `user_id` - 切断するユーザーの ID
    /// * `ticket` - この接続が登録時に受け取ったチケット
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<UserId>)` - presence-offline の通知対象（残存ユーザー）
    /// * `Err(DisconnectError::Superseded)` - この接続は既に新しいログインに
    ///   置き換えられており、Registry も presence も変化しない
    pub async fn execute(
        &self,
        user_id: &UserId,
        ticket: ConnectionTicket,
    ) -> Result<Vec<UserId>, DisconnectError> {
        let removed = self.registry.unregister(user_id, ticket).await;
        if !removed {
            return Err(DisconnectError::Superseded);
        }

        Ok(self.registry.snapshot().await)
    }

    /// ユーザーがオフラインになったことを残りの接続にブロードキャスト
    pub async fn broadcast_offline(
        &self,
        targets: Vec<UserId>,
        event: &str,
    ) -> Result<(), PushError> {
        if targets.is_empty() {
            return Ok(());
        }
        self.pusher.broadcast(targets, event).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::{InMemoryConnectionRegistry, WebSocketEventPusher};
    use tokio::sync::mpsc;

    fn user(id: &str) -> UserId {
        UserId::parse(id).unwrap()
    }

    fn create_test_usecase() -> (DisconnectUserUseCase, Arc<InMemoryConnectionRegistry>) {
        let registry = Arc::new(InMemoryConnectionRegistry::new());
        let pusher = Arc::new(WebSocketEventPusher::new(registry.clone()));
        (
            DisconnectUserUseCase::new(registry.clone(), pusher),
            registry,
        )
    }

    #[tokio::test]
    async fn test_disconnect_returns_remaining_users() {
        // テスト項目: 切断後の通知対象が残存ユーザーと一致する
        // given (前提条件):
        let (usecase, registry) = create_test_usecase();
        let (tx1, _rx1) = mpsc::unbounded_channel();
        let (tx2, _rx2) = mpsc::unbounded_channel();
        let (tx3, _rx3) = mpsc::unbounded_channel();
        let alice = registry.register(user("alice"), tx1).await;
        registry.register(user("bob"), tx2).await;
        registry.register(user("charlie"), tx3).await;

        // when (操作):
        let targets = usecase.execute(&user("alice"), alice.ticket).await.unwrap();

        // then (期待する結果):
        assert_eq!(targets, vec![user("bob"), user("charlie")]);
        assert_eq!(registry.count().await, 2);
    }

    #[tokio::test]
    async fn test_disconnect_last_user_has_no_targets() {
        // テスト項目: 最後のユーザーの切断では通知対象が空
        // given (前提条件):
        let (usecase, registry) = create_test_usecase();
        let (tx, _rx) = mpsc::unbounded_channel();
        let alice = registry.register(user("alice"), tx).await;

        // when (操作):
        let targets = usecase.execute(&user("alice"), alice.ticket).await.unwrap();

        // then (期待する結果):
        assert!(targets.is_empty());
        assert_eq!(registry.count().await, 0);
    }

    #[tokio::test]
    async fn test_superseded_disconnect_does_not_evict_newer_connection() {
        // テスト項目: 置き換え済み接続の切断が新しい接続を追い出さない（回帰テスト）
        // given (前提条件):
        let (usecase, registry) = create_test_usecase();
        let (tx1, _rx1) = mpsc::unbounded_channel();
        let (tx2, _rx2) = mpsc::unbounded_channel();
        let old = registry.register(user("alice"), tx1).await;
        registry.register(user("alice"), tx2).await;

        // when (操作): 古い接続が切断を通知する
        let result = usecase.execute(&user("alice"), old.ticket).await;

        // then (期待する結果): Superseded が返り、Registry はそのまま
        assert_eq!(result, Err(DisconnectError::Superseded));
        assert_eq!(registry.count().await, 1);
        assert!(registry.lookup(&user("alice")).await.is_some());
    }

    #[tokio::test]
    async fn test_broadcast_offline_reaches_targets() {
        // テスト項目: presence-offline が通知対象全員に届く
        // given (前提条件):
        let (usecase, registry) = create_test_usecase();
        let (tx1, _rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        let (tx3, mut rx3) = mpsc::unbounded_channel();
        let alice = registry.register(user("alice"), tx1).await;
        registry.register(user("bob"), tx2).await;
        registry.register(user("charlie"), tx3).await;

        // when (操作):
        let targets = usecase.execute(&user("alice"), alice.ticket).await.unwrap();
        usecase
            .broadcast_offline(targets, r#"{"type":"presence-offline","user_id":"alice"}"#)
            .await
            .unwrap();

        // then (期待する結果):
        assert!(rx2.recv().await.is_some());
        assert!(rx3.recv().await.is_some());
    }
}
