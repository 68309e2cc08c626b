//! UserDirectory trait 定義
//!
//! ユーザー登録・資格情報検証（Identity Resolver コラボレータ）への
//! インターフェース。core が必要とするのは「トークンからユーザー ID を
//! 引く」「ユーザーが実在するか調べる」の 2 点だけで、資格情報の発行
//! 形式には依存しない。

use async_trait::async_trait;

use super::entity::UserRecord;
use super::error::{AuthError, DirectoryError};
use super::value_object::UserId;

/// User Directory trait
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// 新規ユーザーを登録し、そのレコードと不透明なベアラートークンを返す
    async fn register_user(&self, username: &str) -> Result<(UserRecord, String), DirectoryError>;

    /// ベアラートークンを検証し、対応するユーザー ID を返す
    async fn verify_token(&self, token: &str) -> Result<UserId, AuthError>;

    /// ユーザーが実在するか調べる
    async fn user_exists(&self, user_id: &UserId) -> bool;

    /// 登録済みの全ユーザーを username 昇順で返す
    async fn list_users(&self) -> Vec<UserRecord>;
}
