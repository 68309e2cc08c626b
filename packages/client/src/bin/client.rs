//! CLI direct-message chat client with presence and typing indicators.
//!
//! Registers a user against the server's HTTP API, then connects over
//! WebSocket. Select a conversation with `/chat <user>` and type to send.
//! Automatically reconnects on disconnection (max 5 attempts with 5 second
//! interval).
//!
//! Run with:
//! ```not_rust
//! cargo run --bin fumi-client -- --username Alice
//! cargo run --bin fumi-client -- -u Bob --server http://127.0.0.1:8080
//! ```

use clap::Parser;

use fumi_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "fumi-client")]
#[command(about = "Direct-message chat client with presence tracking", long_about = None)]
struct Args {
    /// Username to register with (must be unique on the server)
    #[arg(short = 'u', long)]
    username: String,

    /// Chat server base URL
    #[arg(short = 's', long, default_value = "http://127.0.0.1:8080")]
    server: String,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    // Run the client
    if let Err(e) = fumi_client::run_client(args.server, args.username).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
