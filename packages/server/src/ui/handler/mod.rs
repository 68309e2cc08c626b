//! Request handlers, organized by protocol.

pub mod http;
pub mod websocket;

pub use http::{get_conversation, health_check, list_users, register_user};
pub use websocket::websocket_handler;
