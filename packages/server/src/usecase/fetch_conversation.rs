//! UseCase: 会話履歴の取得
//!
//! 2 ユーザー間の会話ページを取得し、副作用として「相手 → 自分」方向を
//! 既読化する（履歴を取得した = 読んだ、とみなす）。

use std::sync::Arc;

use crate::domain::{DirectMessage, MessageStore, Timestamp, UserDirectory, UserId};

use super::error::FetchConversationError;

/// デフォルトのページサイズ
const DEFAULT_PAGE_SIZE: usize = 50;

/// ページサイズの上限
const MAX_PAGE_SIZE: usize = 200;

/// 会話履歴取得のユースケース
pub struct FetchConversationUseCase {
    /// UserDirectory（相手の実在チェックの抽象化）
    directory: Arc<dyn UserDirectory>,
    /// MessageStore（永続化の抽象化）
    store: Arc<dyn MessageStore>,
}

impl FetchConversationUseCase {
    /// 新しい FetchConversationUseCase を作成
    pub fn new(directory: Arc<dyn UserDirectory>, store: Arc<dyn MessageStore>) -> Self {
        Self { directory, store }
    }

    /// 会話ページを取得する
    ///
    /// # Arguments
    ///
    /// * `caller` - 履歴を要求した（認証済みの）ユーザー
    /// * `peer_raw` - 会話相手の ID（未正規化）
    /// * `before` - このミリ秒時刻より古いメッセージだけを返す（省略時は上限なし）
    /// * `limit` - ページサイズ（省略時 50、上限 200）
    ///
    /// # Returns
    ///
    /// 新しい側から `limit` 件を選んだ、時系列昇順のページ。
    pub async fn execute(
        &self,
        caller: &UserId,
        peer_raw: &str,
        before: Option<i64>,
        limit: Option<usize>,
    ) -> Result<Vec<DirectMessage>, FetchConversationError> {
        let peer =
            UserId::parse(peer_raw).map_err(|_| FetchConversationError::UnknownPeer)?;
        if !self.directory.user_exists(&peer).await {
            return Err(FetchConversationError::UnknownPeer);
        }

        let before = before.map(Timestamp::new).unwrap_or(Timestamp::new(i64::MAX));
        let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).min(MAX_PAGE_SIZE);

        let page = self
            .store
            .fetch_conversation(caller, &peer, before, limit)
            .await?;

        // 取得した側が読者。相手 → 自分 方向を既読化する。
        self.store.mark_read(&peer, caller).await?;

        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MessageContent, MockUserDirectory};
    use crate::infrastructure::InMemoryMessageStore;
    use fumi_shared::time::FixedClock;

    fn user(id: &str) -> UserId {
        UserId::parse(id).unwrap()
    }

    fn content(text: &str) -> MessageContent {
        MessageContent::new(text).unwrap()
    }

    fn create_test_usecase(peer_exists: bool) -> (FetchConversationUseCase, Arc<InMemoryMessageStore>) {
        let mut directory = MockUserDirectory::new();
        directory.expect_user_exists().return_const(peer_exists);
        let store = Arc::new(InMemoryMessageStore::new(Arc::new(FixedClock::new(1_000))));
        (
            FetchConversationUseCase::new(Arc::new(directory), store.clone()),
            store,
        )
    }

    #[tokio::test]
    async fn test_fetch_returns_page_and_marks_peer_direction_read() {
        // テスト項目: 履歴取得で相手→自分方向が既読になる
        // given (前提条件):
        let (usecase, store) = create_test_usecase(true);
        store
            .append_message(user("bob"), user("alice"), content("from bob"))
            .await
            .unwrap();
        store
            .append_message(user("alice"), user("bob"), content("from alice"))
            .await
            .unwrap();

        // when (操作): alice が bob との会話を取得
        let page = usecase
            .execute(&user("alice"), "bob", None, None)
            .await
            .unwrap();

        // then (期待する結果): 2 件返り、bob→alice だけが既読化されている
        assert_eq!(page.len(), 2);
        let after = store
            .fetch_conversation(&user("alice"), &user("bob"), Timestamp::new(i64::MAX), 50)
            .await
            .unwrap();
        let from_bob = after.iter().find(|m| m.sender == user("bob")).unwrap();
        let from_alice = after.iter().find(|m| m.sender == user("alice")).unwrap();
        assert!(from_bob.read);
        assert!(!from_alice.read);
    }

    #[tokio::test]
    async fn test_fetch_unknown_peer_fails() {
        // テスト項目: 実在しない相手の履歴取得は UnknownPeer になる
        // given (前提条件):
        let (usecase, _store) = create_test_usecase(false);

        // when (操作):
        let result = usecase.execute(&user("alice"), "ghost", None, None).await;

        // then (期待する結果):
        assert_eq!(result, Err(FetchConversationError::UnknownPeer));
    }

    #[tokio::test]
    async fn test_fetch_caps_limit() {
        // テスト項目: limit が上限でクランプされる
        // given (前提条件):
        let (usecase, store) = create_test_usecase(true);
        for i in 0..3 {
            store
                .append_message(user("alice"), user("bob"), content(&format!("m{}", i)))
                .await
                .unwrap();
        }

        // when (操作): 上限を超える limit を要求しても正常に動く
        let page = usecase
            .execute(&user("alice"), "bob", None, Some(10_000))
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(page.len(), 3);
    }
}
