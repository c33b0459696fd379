//! Idobata CLI chat client binary.
//!
//! Connects to the chat coordinator, shows who is present, and relays chat
//! messages. Connections are explicit: if the link drops, the client stays
//! offline until you run `/connect`.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin idobata-client -- --name Ada
//! cargo run --bin idobata-client -- -n Grace -u ws://127.0.0.1:8080/ws
//! ```

use clap::Parser;

use idobata_client::{ClientOptions, directory::DEFAULT_DIRECTORY_URL, run_client};
use idobata_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "client")]
#[command(about = "Presence-aware CLI chat client", long_about = None)]
struct Args {
    /// Display name shown to other participants
    #[arg(short = 'n', long, default_value = "")]
    name: String,

    /// Avatar URI shown next to your name (optional)
    #[arg(short = 'a', long, default_value = "")]
    avatar: String,

    /// WebSocket server URL
    #[arg(short = 'u', long, default_value = "ws://127.0.0.1:8080/ws")]
    url: String,

    /// Profile directory URL for the decorative startup listing
    #[arg(long, default_value = DEFAULT_DIRECTORY_URL)]
    directory_url: String,

    /// Skip the profile directory fetch
    #[arg(long)]
    no_directory: bool,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_PKG_NAME"), "info");

    let args = Args::parse();

    let options = ClientOptions {
        url: args.url,
        name: args.name,
        avatar: args.avatar,
        directory_url: (!args.no_directory).then_some(args.directory_url),
    };

    if let Err(e) = run_client(options).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
