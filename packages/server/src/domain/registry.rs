//! ConnectionRegistry trait 定義
//!
//! 「どのユーザーがいまリアルタイムで到達可能か」を保持する、プロセス内で
//! 唯一の接続マップへのインターフェースです。具体的な実装は Infrastructure
//! 層が提供します（依存性の逆転）。
//!
//! ## 不変条件
//!
//! - 1 ユーザーにつき同時に存在するエントリは最大 1 つ
//! - 再接続（同一ユーザーの新しい接続）は既存エントリを**置き換える**
//!   （latest login wins）
//! - `unregister` は自分が登録した接続のみ削除できる（古い接続の切断が
//!   新しい接続を誤って追い出さないためのガード）

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::value_object::UserId;

/// 接続へのイベント送信チャンネル
///
/// Transport 層（WebSocket ハンドラ）が所有するソケットへの片方向キュー。
/// Registry はこのチャンネルを保持するだけで、ソケット自体は所有しない。
pub type PusherChannel = mpsc::UnboundedSender<String>;

/// 1 回の登録を識別するチケット
///
/// `unregister` 時に提示させることで、置き換え済みの古い接続からの
/// 切断通知を無視できる。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionTicket(pub u64);

/// 登録結果
#[derive(Debug)]
pub struct RegisterOutcome {
    /// この登録を識別するチケット
    pub ticket: ConnectionTicket,
    /// 登録直前にオンラインだった他ユーザー（presence-initial 用スナップショット）
    ///
    /// 登録と同一のロック区間内で計算されるため、スナップショットと
    /// 登録の間に他の接続イベントが割り込むことはない。
    pub peers_online: Vec<UserId>,
    /// 同一ユーザーの既存接続を置き換えた場合 true
    pub replaced: bool,
}

/// Connection Registry trait
///
/// UseCase 層はこの trait にのみ依存する。生のマップは決して公開しない。
#[async_trait]
pub trait ConnectionRegistry: Send + Sync {
    /// 接続を登録する
    ///
    /// 同一ユーザーのエントリが既に存在する場合は新しい接続で置き換える。
    /// 置き換えられた側の `PusherChannel` は drop され、古い接続の
    /// 送信ループはその時点で終了する（close-on-replace）。
    async fn register(&self, user_id: UserId, sender: PusherChannel) -> RegisterOutcome;

    /// 接続を削除する
    ///
    /// 現在登録されている接続のチケットと一致する場合のみ削除し true を
    /// 返す。既に置き換え済みの古いチケットなら何もせず false を返す。
    async fn unregister(&self, user_id: &UserId, ticket: ConnectionTicket) -> bool;

    /// 配送先の接続チャンネルを取得する（オフラインなら None）
    async fn lookup(&self, user_id: &UserId) -> Option<PusherChannel>;

    /// 現在登録されている全ユーザー ID を取得する
    async fn snapshot(&self) -> Vec<UserId>;

    /// 現在の接続数を取得する
    async fn count(&self) -> usize;
}
