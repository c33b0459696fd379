//! Idobata chat coordinator binary.
//!
//! Tracks presence and relays chat messages between WebSocket clients.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin idobata-server
//! cargo run --bin idobata-server -- --host 0.0.0.0 --port 3000
//! ```

use clap::Parser;

use idobata_server::run_server;
use idobata_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "server")]
#[command(about = "Chat coordinator: presence registry and message relay", long_about = None)]
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
    setup_logger(env!("CARGO_PKG_NAME"), "debug");

    let args = Args::parse();

    if let Err(e) = run_server(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
