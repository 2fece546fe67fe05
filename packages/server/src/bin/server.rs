//! Hibiki relay server.
//!
//! Relays chat messages to every participant of a room and streams the
//! generation backend's reply to messages carrying the trigger marker.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin hibiki-server
//! GOOGLE_API_KEY=... cargo run --bin hibiki-server -- --port 5000 --delivery-scope room
//! ```

use std::{sync::Arc, time::Duration};

use clap::Parser;
use hibiki_server::{
    domain::{RoomName, TextGenerator},
    infrastructure::{
        generator::{DEFAULT_GEMINI_MODEL, GeminiGenerator},
        pusher::WebSocketEventPusher,
        registry::InMemorySessionRegistry,
    },
    ui::Server,
    usecase::{
        ConnectParticipantUseCase, DeliveryScope, DisconnectParticipantUseCase, GetRoomsUseCase,
        RelayConfig, RelayEngine,
    },
};
use hibiki_shared::{
    logger::{LogTarget, setup_logger},
    time::SystemClock,
    trigger::{DEFAULT_TRIGGER_MARKER, TriggerMarker},
};

#[derive(Parser, Debug)]
#[command(name = "hibiki-server")]
#[command(about = "Streaming chat relay server", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "5000")]
    port: u16,

    /// Google API key for the Gemini backend
    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Gemini model name
    #[arg(long, default_value = DEFAULT_GEMINI_MODEL)]
    model: String,

    /// Marker that turns a chat message into a question (empty: every message)
    #[arg(long, default_value = DEFAULT_TRIGGER_MARKER)]
    trigger_marker: String,

    /// Room joined by clients that do not name one
    #[arg(long, default_value = RoomName::DEFAULT)]
    default_room: String,

    /// Who receives the streamed reply: sender | room
    #[arg(long, default_value = "sender")]
    delivery_scope: DeliveryScope,

    /// Upper bound in seconds for a single backend pull
    #[arg(long, default_value = "30", value_parser = clap::value_parser!(u64).range(1..))]
    backend_timeout_secs: u64,
}

#[tokio::main]
async fn main() {
    setup_logger(env!("CARGO_BIN_NAME"), "debug", LogTarget::Stdout);

    let args = Args::parse();

    let default_room = match RoomName::new(args.default_room.clone()) {
        Ok(room) => room,
        Err(e) => {
            tracing::error!("Invalid --default-room '{}': {}", args.default_room, e);
            std::process::exit(1);
        }
    };

    // Initialize dependencies in order:
    // 1. Registry and EventPusher
    // 2. Generation backend
    // 3. UseCases
    // 4. Server

    // 1. Registry (in-memory) and EventPusher (WebSocket implementation)
    let registry = Arc::new(InMemorySessionRegistry::new());
    let pusher = Arc::new(WebSocketEventPusher::new());
    let clock = Arc::new(SystemClock);

    // 2. Generation backend
    let generator: Option<Arc<dyn TextGenerator>> = match args.api_key.as_deref() {
        Some(key) if !key.trim().is_empty() => {
            tracing::info!("Gemini backend enabled (model: {})", args.model);
            Some(Arc::new(GeminiGenerator::new(key.trim(), args.model.clone())))
        }
        _ => {
            tracing::warn!(
                "No API key configured; triggered messages will be answered with an error"
            );
            None
        }
    };

    // 3. UseCases
    let relay_config = RelayConfig {
        trigger: TriggerMarker::new(args.trigger_marker.clone()),
        scope: args.delivery_scope,
        pull_timeout: Duration::from_secs(args.backend_timeout_secs),
    };
    tracing::info!(
        "Trigger marker: '{}', delivery scope: {}, backend timeout: {:?}",
        relay_config.trigger.as_str(),
        relay_config.scope,
        relay_config.pull_timeout
    );

    let connect_participant_usecase = Arc::new(ConnectParticipantUseCase::new(
        registry.clone(),
        pusher.clone(),
        clock,
    ));
    let disconnect_participant_usecase = Arc::new(DisconnectParticipantUseCase::new(
        registry.clone(),
        pusher.clone(),
    ));
    let relay_engine = Arc::new(RelayEngine::new(
        registry.clone(),
        pusher.clone(),
        generator,
        relay_config,
    ));
    let get_rooms_usecase = Arc::new(GetRoomsUseCase::new(registry.clone()));

    // 4. Create and run the server
    let server = Server::new(
        connect_participant_usecase,
        disconnect_participant_usecase,
        relay_engine,
        get_rooms_usecase,
        default_room,
    );
    if let Err(e) = server.run(&args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
