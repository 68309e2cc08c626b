//! InMemory UserDirectory 実装
//!
//! ドメイン層が定義する UserDirectory trait の具体的な実装。
//! ユーザーレコードと不透明なベアラートークンをインメモリで管理します。
//! トークンは UUID v4 で、意味を持たない（Identity Resolver コラボレータ
//! の置き換えはこのファイルだけで済む）。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::{
    AuthError, DirectoryError, UserDirectory, UserId, UserIdFactory, UserRecord,
};

/// ユーザー名の最大長（文字数）
const MAX_USERNAME_CHARS: usize = 32;

struct DirectoryInner {
    /// user_id → レコード
    users: HashMap<UserId, UserRecord>,
    /// username → user_id（重複登録の検出用）
    usernames: HashMap<String, UserId>,
    /// token → user_id
    tokens: HashMap<String, UserId>,
}

/// インメモリ User Directory 実装
pub struct InMemoryUserDirectory {
    inner: Mutex<DirectoryInner>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(DirectoryInner {
                users: HashMap::new(),
                usernames: HashMap::new(),
                tokens: HashMap::new(),
            }),
        }
    }

    fn validate_username(username: &str) -> Result<String, DirectoryError> {
        let trimmed = username.trim();
        if trimmed.is_empty() {
            return Err(DirectoryError::InvalidUsername(
                "username must not be empty".to_string(),
            ));
        }
        if trimmed.chars().count() > MAX_USERNAME_CHARS {
            return Err(DirectoryError::InvalidUsername(format!(
                "username must be at most {} characters",
                MAX_USERNAME_CHARS
            )));
        }
        Ok(trimmed.to_string())
    }
}

impl Default for InMemoryUserDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn register_user(&self, username: &str) -> Result<(UserRecord, String), DirectoryError> {
        let username = Self::validate_username(username)?;

        let mut inner = self.inner.lock().await;
        if inner.usernames.contains_key(&username) {
            return Err(DirectoryError::DuplicateUsername(username));
        }

        let user_id = UserIdFactory::generate();
        let token = Uuid::new_v4().to_string();
        let record = UserRecord {
            id: user_id.clone(),
            username: username.clone(),
        };

        inner.users.insert(user_id.clone(), record.clone());
        inner.usernames.insert(username, user_id.clone());
        inner.tokens.insert(token.clone(), user_id);

        tracing::info!("User '{}' registered", record.username);
        Ok((record, token))
    }

    async fn verify_token(&self, token: &str) -> Result<UserId, AuthError> {
        if token.trim().is_empty() {
            return Err(AuthError::MissingToken);
        }

        let inner = self.inner.lock().await;
        inner
            .tokens
            .get(token)
            .cloned()
            .ok_or(AuthError::InvalidToken)
    }

    async fn user_exists(&self, user_id: &UserId) -> bool {
        let inner = self.inner.lock().await;
        inner.users.contains_key(user_id)
    }

    async fn list_users(&self) -> Vec<UserRecord> {
        let inner = self.inner.lock().await;
        let mut users: Vec<UserRecord> = inner.users.values().cloned().collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        users
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_register_user_issues_token() {
        // テスト項目: 登録したユーザーのトークンで ID が引ける
        // given (前提条件):
        let directory = InMemoryUserDirectory::new();

        // when (操作):
        let (record, token) = directory.register_user("alice").await.unwrap();
        let resolved = directory.verify_token(&token).await.unwrap();

        // then (期待する結果):
        assert_eq!(resolved, record.id);
        assert_eq!(record.username, "alice");
        assert!(directory.user_exists(&record.id).await);
    }

    #[tokio::test]
    async fn test_register_user_rejects_duplicate_username() {
        // テスト項目: 同名ユーザーの登録が拒否される
        // given (前提条件):
        let directory = InMemoryUserDirectory::new();
        directory.register_user("alice").await.unwrap();

        // when (操作):
        let result = directory.register_user("alice").await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(DirectoryError::DuplicateUsername("alice".to_string()))
        );
    }

    #[tokio::test]
    async fn test_register_user_rejects_blank_username() {
        // テスト項目: 空白のみのユーザー名が拒否される
        // given (前提条件):
        let directory = InMemoryUserDirectory::new();

        // when (操作):
        let result = directory.register_user("   ").await;

        // then (期待する結果):
        assert!(matches!(result, Err(DirectoryError::InvalidUsername(_))));
    }

    #[tokio::test]
    async fn test_verify_token_rejects_unknown_token() {
        // テスト項目: 未発行トークンの検証が失敗する
        // given (前提条件):
        let directory = InMemoryUserDirectory::new();

        // when (操作):
        let result = directory.verify_token("not-a-token").await;

        // then (期待する結果):
        assert_eq!(result, Err(AuthError::InvalidToken));
    }

    #[tokio::test]
    async fn test_verify_token_rejects_empty_token() {
        // テスト項目: 空トークンは MissingToken になる
        // given (前提条件):
        let directory = InMemoryUserDirectory::new();

        // when (操作):
        let result = directory.verify_token("").await;

        // then (期待する結果):
        assert_eq!(result, Err(AuthError::MissingToken));
    }

    #[tokio::test]
    async fn test_user_exists_for_unknown_user() {
        // テスト項目: 未登録ユーザーは存在しない扱いになる
        // given (前提条件):
        let directory = InMemoryUserDirectory::new();
        let unknown = UserId::parse("ghost").unwrap();

        // when (操作):
        let exists = directory.user_exists(&unknown).await;

        // then (期待する結果):
        assert!(!exists);
    }

    #[tokio::test]
    async fn test_list_users_sorted_by_username() {
        // テスト項目: ユーザー一覧が username 昇順で返る
        // given (前提条件):
        let directory = InMemoryUserDirectory::new();
        directory.register_user("charlie").await.unwrap();
        directory.register_user("alice").await.unwrap();
        directory.register_user("bob").await.unwrap();

        // when (操作):
        let users = directory.list_users().await;

        // then (期待する結果):
        let names: Vec<&str> = users.iter().map(|u| u.username.as_str()).collect();
        assert_eq!(names, vec!["alice", "bob", "charlie"]);
    }
}
