//! Server state shared across handlers.

use std::sync::Arc;

use crate::domain::UserDirectory;
use crate::usecase::{
    ConnectUserUseCase, DisconnectUserUseCase, FetchConversationUseCase,
    MarkConversationReadUseCase, SendDirectMessageUseCase, TypingRelayUseCase,
};

/// Shared application state
pub struct AppState {
    /// ConnectUserUseCase（接続登録のユースケース）
    pub connect_user_usecase: Arc<ConnectUserUseCase>,
    /// DisconnectUserUseCase（切断のユースケース）
    pub disconnect_user_usecase: Arc<DisconnectUserUseCase>,
    /// SendDirectMessageUseCase（メッセージ送信のユースケース）
    pub send_message_usecase: Arc<SendDirectMessageUseCase>,
    /// TypingRelayUseCase（タイピング通知中継のユースケース）
    pub typing_relay_usecase: Arc<TypingRelayUseCase>,
    /// FetchConversationUseCase（会話履歴取得のユースケース）
    pub fetch_conversation_usecase: Arc<FetchConversationUseCase>,
    /// MarkConversationReadUseCase（既読化のユースケース）
    pub mark_read_usecase: Arc<MarkConversationReadUseCase>,
    /// UserDirectory（認証・ユーザー登録に HTTP ハンドラから直接使う）
    pub directory: Arc<dyn UserDirectory>,
}
