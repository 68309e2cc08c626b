//! UseCase: ユーザー接続処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectUserUseCase::execute() メソッド
//! - 接続登録（latest-wins の置き換え、presence スナップショットの確定）
//! - presence-online ブロードキャストの対象選定
//!
//! ### なぜこのテストが必要か
//! - 「Registry のエントリ数 = 現在開いている非置換接続数」の不変条件を保証
//! - presence-initial のスナップショットが登録と原子的に確定することを確認
//! - 新規接続自身にはブロードキャストが届かないことを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系: 新規ユーザーの接続
//! - エッジケース: 最初の接続（スナップショットが空）
//! - 正常系: 同一ユーザーの再接続（置き換え）

use std::sync::Arc;

use crate::domain::{
    ConnectionRegistry, EventPusher, PushError, PusherChannel, RegisterOutcome, UserId,
};

/// ユーザー接続のユースケース
pub struct ConnectUserUseCase {
    /// Connection Registry（接続マップの抽象化）
    registry: Arc<dyn ConnectionRegistry>,
    /// EventPusher（イベント通知の抽象化）
    pusher: Arc<dyn EventPusher>,
}

impl ConnectUserUseCase {
    /// 新しい ConnectUserUseCase を作成
    pub fn new(registry: Arc<dyn ConnectionRegistry>, pusher: Arc<dyn EventPusher>) -> Self {
        Self { registry, pusher }
    }

    /// 接続登録を実行
    ///
    /// # Arguments
    ///
    /// * `user_id` - 認証済みユーザーの ID（正規化済み）
    /// * `sender` - この接続へのイベント送信用チャンネル
    ///
    /// # Returns
    ///
    /// 登録チケットと、presence-initial 用の「登録直前にオンラインだった
    /// 他ユーザー」のスナップショット。同一ユーザーの既存接続があれば
    /// 置き換えられている。
    pub async fn execute(&self, user_id: UserId, sender: PusherChannel) -> RegisterOutcome {
        self.registry.register(user_id, sender).await
    }

    /// ユーザーがオンラインになったことを他の全接続にブロードキャスト
    ///
    /// # Arguments
    ///
    /// * `user_id` - 接続したユーザーの ID
    /// * `event` - ブロードキャストするイベント（JSON）
    pub async fn broadcast_online(&self, user_id: &UserId, event: &str) -> Result<(), PushError> {
        let targets: Vec<UserId> = self
            .registry
            .snapshot()
            .await
            .into_iter()
            .filter(|id| id != user_id)
            .collect();

        if targets.is_empty() {
            return Ok(());
        }

        self.pusher.broadcast(targets, event).await
    }
}
