//! EventPusher trait 定義
//!
//! UseCase 層がクライアントへイベントを届けるためのインターフェース。
//! 具体的な実装（WebSocket 経由）は Infrastructure 層が提供します。

use async_trait::async_trait;

use super::error::PushError;
use super::value_object::UserId;

/// イベント送信の抽象化
///
/// presence / message / typing の各イベントは JSON 文字列として
/// シリアライズ済みの状態で渡される。
#[async_trait]
pub trait EventPusher: Send + Sync {
    /// 特定のユーザーの接続にイベントを送信する
    ///
    /// オフラインの場合は `PushError::NotConnected` を返す。
    async fn push_to(&self, user_id: &UserId, event: &str) -> Result<(), PushError>;

    /// 複数のユーザーにイベントをブロードキャストする
    ///
    /// fire-and-forget: 個々の送信失敗（切断直後など）はログに残して
    /// 握りつぶす。該当ユーザーは次回再接続時のスナップショットで
    /// 自己修復する。
    async fn broadcast(&self, targets: Vec<UserId>, event: &str) -> Result<(), PushError>;
}
