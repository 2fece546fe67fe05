//! Hibiki CLI chat client.
//!
//! Connects to a relay server, sends each typed line as a chat message and
//! plays replies to triggered messages back with a typing effect. The next
//! prompt appears only after the reply has been fully shown.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin hibiki-client -- --name Alice
//! cargo run --bin hibiki-client -- -n Bob -r lobby --no-pacing
//! ```

use std::time::Duration;

use clap::Parser;
use hibiki_client::{SessionConfig, playback::Pacing, run_client};
use hibiki_shared::{
    logger::{LogTarget, setup_logger},
    trigger::{DEFAULT_TRIGGER_MARKER, TriggerMarker},
};

#[derive(Parser, Debug)]
#[command(name = "hibiki-client")]
#[command(about = "Streaming chat relay client with typing-effect playback", long_about = None)]
struct Args {
    /// WebSocket server URL
    #[arg(short = 'u', long, default_value = "ws://127.0.0.1:5000/ws")]
    url: String,

    /// Display name shown to other participants
    #[arg(short = 'n', long, default_value = "Unknown")]
    name: String,

    /// Room to join (server default when omitted)
    #[arg(short = 'r', long)]
    room: Option<String>,

    /// Marker that makes a message wait for a streamed reply
    #[arg(long, default_value = DEFAULT_TRIGGER_MARKER)]
    trigger_marker: String,

    /// Line that ends the session
    #[arg(long, default_value = "exit")]
    exit_command: String,

    /// Delay between rendered characters in milliseconds
    #[arg(long, default_value = "5")]
    char_delay_ms: u64,

    /// Pause after a reply before the next prompt in milliseconds
    #[arg(long, default_value = "100")]
    settle_delay_ms: u64,

    /// Render replies without the typing effect
    #[arg(long)]
    no_pacing: bool,
}

#[tokio::main]
async fn main() {
    // Logs go to stderr; stdout is the chat display
    setup_logger(env!("CARGO_BIN_NAME"), "warn", LogTarget::Stderr);

    let args = Args::parse();

    let pacing = if args.no_pacing {
        Pacing::disabled()
    } else {
        Pacing {
            char_delay: Duration::from_millis(args.char_delay_ms),
            settle_delay: Duration::from_millis(args.settle_delay_ms),
        }
    };
    let config = SessionConfig {
        url: args.url,
        name: args.name,
        room: args.room,
        trigger: TriggerMarker::new(args.trigger_marker),
        exit_command: args.exit_command,
        pacing,
    };

    if let Err(e) = run_client(config).await {
        tracing::error!("Client error: {}", e);
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
