//! Direct-message chat server with realtime presence tracking.
//!
//! Authenticated users exchange point-to-point messages and typing signals
//! over WebSocket; presence transitions are pushed to every connected peer.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin fumi-server
//! cargo run --bin fumi-server -- --host 0.0.0.0 --port 3000
//! ```

use std::sync::Arc;

use clap::Parser;

use fumi_server::{
    infrastructure::{
        InMemoryConnectionRegistry, InMemoryMessageStore, InMemoryUserDirectory,
        WebSocketEventPusher,
    },
    ui::Server,
    usecase::{
        ConnectUserUseCase, DisconnectUserUseCase, FetchConversationUseCase,
        MarkConversationReadUseCase, SendDirectMessageUseCase, TypingRelayUseCase,
    },
};
use fumi_shared::{logger::setup_logger, time::SystemClock};

#[derive(Parser, Debug)]
#[command(name = "fumi-server")]
#[command(about = "Direct-message chat server with presence tracking", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let args = Args::parse();

    // Initialize dependencies in order:
    // 1. Registry / Directory / Store (the stateful components)
    // 2. EventPusher
    // 3. UseCases
    // 4. Server

    // 1. Stateful components. All presence state lives in the registry and
    //    dies with the process; messages and users live in the in-memory
    //    backends for now.
    let registry = Arc::new(InMemoryConnectionRegistry::new());
    let directory = Arc::new(InMemoryUserDirectory::new());
    let store = Arc::new(InMemoryMessageStore::new(Arc::new(SystemClock)));

    // 2. EventPusher (WebSocket implementation over the registry)
    let pusher = Arc::new(WebSocketEventPusher::new(registry.clone()));

    // 3. UseCases
    let connect_user_usecase = Arc::new(ConnectUserUseCase::new(registry.clone(), pusher.clone()));
    let disconnect_user_usecase = Arc::new(DisconnectUserUseCase::new(
        registry.clone(),
        pusher.clone(),
    ));
    let send_message_usecase = Arc::new(SendDirectMessageUseCase::new(
        directory.clone(),
        store.clone(),
        pusher.clone(),
    ));
    let typing_relay_usecase = Arc::new(TypingRelayUseCase::new(pusher.clone()));
    let fetch_conversation_usecase = Arc::new(FetchConversationUseCase::new(
        directory.clone(),
        store.clone(),
    ));
    let mark_read_usecase = Arc::new(MarkConversationReadUseCase::new(
        directory.clone(),
        store.clone(),
    ));

    // 4. Create and run the server
    let server = Server::new(
        connect_user_usecase,
        disconnect_user_usecase,
        send_message_usecase,
        typing_relay_usecase,
        fetch_conversation_usecase,
        mark_read_usecase,
        directory,
    );
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
