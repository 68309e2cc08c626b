//! UseCase layer: one type per application operation, depending only on the
//! domain traits (the concrete registry/store/pusher are injected in `main`).

pub mod connect_user;
pub mod disconnect_user;
pub mod error;
pub mod fetch_conversation;
pub mod mark_read;
pub mod send_message;
pub mod typing_relay;

pub use connect_user::ConnectUserUseCase;
pub use disconnect_user::DisconnectUserUseCase;
pub use error::{DisconnectError, FetchConversationError, MarkReadError, SendMessageError};
pub use fetch_conversation::FetchConversationUseCase;
pub use mark_read::MarkConversationReadUseCase;
pub use send_message::SendDirectMessageUseCase;
pub use typing_relay::TypingRelayUseCase;
