//! インメモリ実装（開発・テスト用のデフォルトバックエンド）

pub mod directory;
pub mod message;

pub use directory::InMemoryUserDirectory;
pub use message::InMemoryMessageStore;
