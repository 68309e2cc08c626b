//! InMemory ConnectionRegistry 実装
//!
//! プロセス内で唯一の接続マップ。サーバー内で複数の実行コンテキストから
//! 同時に変更される唯一の状態であり、ひとつの Mutex で直列化する。
//! 永続化はなし。プロセス再起動で空から再構築され、presence 状態は
//! 現在のプロセスの寿命を超えて信頼してはならない。

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    ConnectionRegistry, ConnectionTicket, PusherChannel, RegisterOutcome, UserId,
};

/// 登録済み接続のエントリ
struct RegisteredConnection {
    ticket: ConnectionTicket,
    sender: PusherChannel,
}

/// インメモリ Connection Registry 実装
///
/// ## 同期
///
/// `register` / `unregister` / `lookup` / `snapshot` は全て同一の Mutex
/// 区間で実行される。connect と disconnect と send が競合しても、
/// 「1 ユーザーにつきエントリ最大 1 つ」の不変条件と、更新途中のマップを
/// 観測しないことが保証される。
pub struct InMemoryConnectionRegistry {
    connections: Mutex<HashMap<UserId, RegisteredConnection>>,
    next_ticket: AtomicU64,
}

impl InMemoryConnectionRegistry {
    pub fn new() -> Self {
        Self {
            connections: Mutex::new(HashMap::new()),
            next_ticket: AtomicU64::new(1),
        }
    }

    fn issue_ticket(&self) -> ConnectionTicket {
        ConnectionTicket(self.next_ticket.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for InMemoryConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConnectionRegistry for InMemoryConnectionRegistry {
    async fn register(&self, user_id: UserId, sender: PusherChannel) -> RegisterOutcome {
        let ticket = self.issue_ticket();
        let mut connections = self.connections.lock().await;

        // スナップショットは挿入前・同一ロック区間内で確定させる
        let mut peers_online: Vec<UserId> = connections
            .keys()
            .filter(|id| **id != user_id)
            .cloned()
            .collect();
        peers_online.sort();

        // latest login wins: 古いエントリは置き換え、その sender は drop される
        let replaced = connections
            .insert(user_id.clone(), RegisteredConnection { ticket, sender })
            .is_some();

        if replaced {
            tracing::info!("Connection for '{}' replaced by a newer login", user_id);
        } else {
            tracing::debug!("Connection for '{}' registered", user_id);
        }

        RegisterOutcome {
            ticket,
            peers_online,
            replaced,
        }
    }

    async fn unregister(&self, user_id: &UserId, ticket: ConnectionTicket) -> bool {
        let mut connections = self.connections.lock().await;

        match connections.get(user_id) {
            Some(entry) if entry.ticket == ticket => {
                connections.remove(user_id);
                tracing::debug!("Connection for '{}' unregistered", user_id);
                true
            }
            Some(_) => {
                // 置き換え済みの古い接続からの切断。新しいエントリには触れない。
                tracing::debug!(
                    "Stale disconnect for '{}' ignored (connection was superseded)",
                    user_id
                );
                false
            }
            None => false,
        }
    }

    async fn lookup(&self, user_id: &UserId) -> Option<PusherChannel> {
        let connections = self.connections.lock().await;
        connections.get(user_id).map(|entry| entry.sender.clone())
    }

    async fn snapshot(&self) -> Vec<UserId> {
        let connections = self.connections.lock().await;
        let mut ids: Vec<UserId> = connections.keys().cloned().collect();
        ids.sort();
        ids
    }

    async fn count(&self) -> usize {
        let connections = self.connections.lock().await;
        connections.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn user(id: &str) -> UserId {
        UserId::parse(id).unwrap()
    }

    #[tokio::test]
    async fn test_register_and_count() {
        // テスト項目: 登録するとエントリ数が接続数と一致する
        // given (前提条件):
        let registry = InMemoryConnectionRegistry::new();
        let (tx1, _rx1) = mpsc::unbounded_channel();
        let (tx2, _rx2) = mpsc::unbounded_channel();

        // when (操作):
        registry.register(user("alice"), tx1).await;
        registry.register(user("bob"), tx2).await;

        // then (期待する結果):
        assert_eq!(registry.count().await, 2);
    }

    #[tokio::test]
    async fn test_register_returns_peers_before_insertion() {
        // テスト項目: 登録結果のスナップショットに自分自身が含まれない
        // given (前提条件):
        let registry = InMemoryConnectionRegistry::new();
        let (tx1, _rx1) = mpsc::unbounded_channel();
        let (tx2, _rx2) = mpsc::unbounded_channel();
        registry.register(user("alice"), tx1).await;

        // when (操作):
        let outcome = registry.register(user("bob"), tx2).await;

        // then (期待する結果):
        assert_eq!(outcome.peers_online, vec![user("alice")]);
        assert!(!outcome.replaced);
    }

    #[tokio::test]
    async fn test_duplicate_register_replaces_entry() {
        // テスト項目: 同一ユーザーの再登録はエントリを追加せず置き換える
        // given (前提条件):
        let registry = InMemoryConnectionRegistry::new();
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        registry.register(user("alice"), tx1).await;

        // when (操作):
        let outcome = registry.register(user("alice"), tx2).await;

        // then (期待する結果): エントリは 1 つだけ、lookup は新しい接続に届く
        assert!(outcome.replaced);
        assert_eq!(registry.count().await, 1);

        let sender = registry.lookup(&user("alice")).await.unwrap();
        sender.send("hello".to_string()).unwrap();
        assert_eq!(rx2.recv().await, Some("hello".to_string()));
        assert_eq!(rx1.try_recv().ok(), None);
    }

    #[tokio::test]
    async fn test_unregister_requires_matching_ticket() {
        // テスト項目: 置き換え済みの古いチケットでは新しいエントリを削除できない
        // given (前提条件):
        let registry = InMemoryConnectionRegistry::new();
        let (tx1, _rx1) = mpsc::unbounded_channel();
        let (tx2, _rx2) = mpsc::unbounded_channel();
        let old = registry.register(user("alice"), tx1).await;
        let new = registry.register(user("alice"), tx2).await;

        // when (操作): 古い接続が切断を通知してくる
        let removed_by_stale = registry.unregister(&user("alice"), old.ticket).await;

        // then (期待する結果): 新しい接続は登録されたまま
        assert!(!removed_by_stale);
        assert_eq!(registry.count().await, 1);
        assert!(registry.lookup(&user("alice")).await.is_some());

        // 新しいチケットなら削除できる
        let removed = registry.unregister(&user("alice"), new.ticket).await;
        assert!(removed);
        assert_eq!(registry.count().await, 0);
    }

    #[tokio::test]
    async fn test_unregister_unknown_user_is_noop() {
        // テスト項目: 未登録ユーザーの unregister は false を返すだけ
        // given (前提条件):
        let registry = InMemoryConnectionRegistry::new();

        // when (操作):
        let removed = registry
            .unregister(&user("nonexistent"), ConnectionTicket(42))
            .await;

        // then (期待する結果):
        assert!(!removed);
    }

    #[tokio::test]
    async fn test_lookup_absent_user_returns_none() {
        // テスト項目: オフラインユーザーの lookup は None を返す
        // given (前提条件):
        let registry = InMemoryConnectionRegistry::new();

        // when (操作):
        let result = registry.lookup(&user("alice")).await;

        // then (期待する結果):
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_snapshot_lists_all_registered_users() {
        // テスト項目: スナップショットが登録済み全ユーザーをソート済みで返す
        // given (前提条件):
        let registry = InMemoryConnectionRegistry::new();
        let (tx1, _rx1) = mpsc::unbounded_channel();
        let (tx2, _rx2) = mpsc::unbounded_channel();
        let (tx3, _rx3) = mpsc::unbounded_channel();
        registry.register(user("charlie"), tx1).await;
        registry.register(user("alice"), tx2).await;
        registry.register(user("bob"), tx3).await;

        // when (操作):
        let snapshot = registry.snapshot().await;

        // then (期待する結果):
        assert_eq!(snapshot, vec![user("alice"), user("bob"), user("charlie")]);
    }

    #[tokio::test]
    async fn test_replace_drops_old_sender() {
        // テスト項目: 置き換え時に古い接続のチャンネルが閉じられる（close-on-replace）
        // given (前提条件):
        let registry = InMemoryConnectionRegistry::new();
        let (tx1, mut rx1) = mpsc::unbounded_channel::<String>();
        let (tx2, _rx2) = mpsc::unbounded_channel();
        registry.register(user("alice"), tx1).await;

        // when (操作):
        registry.register(user("alice"), tx2).await;

        // then (期待する結果): 古い受信側は closed を観測する
        assert_eq!(rx1.recv().await, None);
    }
}
