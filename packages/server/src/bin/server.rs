//! Parley chat relay server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin parley-server
//! cargo run --bin parley-server -- --host 0.0.0.0 --port 5001 --history-limit 500
//! ```

use std::sync::Arc;

use clap::Parser;
use parley_server::{
    infrastructure::{message_pusher::WebSocketMessagePusher, repository::InMemoryRoomRepository},
    ui::Server,
    usecase::{
        ConnectParticipantUseCase, DisconnectParticipantUseCase, JoinRoomUseCase, RoomLocks,
        SendMessageUseCase,
    },
};
use parley_shared::{logger::setup_logger, time::SystemClock};

#[derive(Parser, Debug)]
#[command(name = "parley-server")]
#[command(about = "Password-gated multi-room chat relay", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "PORT", default_value = "5001")]
    port: u16,

    /// Keep at most this many messages per room (unbounded if omitted)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    history_limit: Option<u64>,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();
    let history_limit = args.history_limit.map(|limit| limit as usize);

    // Initialize dependencies in order:
    // 1. Repository
    // 2. MessagePusher
    // 3. UseCases
    // 4. Server

    // 1. Create Repository (in-memory room registry)
    let repository = Arc::new(InMemoryRoomRepository::with_history_limit(history_limit));
    match history_limit {
        Some(limit) => tracing::info!("Room history capped at {} message(s)", limit),
        None => tracing::info!("Room history is unbounded"),
    }

    // 2. Create MessagePusher (WebSocket implementation)
    let message_pusher = Arc::new(WebSocketMessagePusher::default());

    // 3. Create UseCases
    let room_locks = Arc::new(RoomLocks::new());
    let clock = Arc::new(SystemClock);
    let connect_participant_usecase =
        Arc::new(ConnectParticipantUseCase::new(message_pusher.clone()));
    let join_room_usecase = Arc::new(JoinRoomUseCase::new(
        repository.clone(),
        message_pusher.clone(),
        room_locks.clone(),
        clock.clone(),
    ));
    let send_message_usecase = Arc::new(SendMessageUseCase::new(
        repository.clone(),
        message_pusher.clone(),
        room_locks.clone(),
        clock,
    ));
    let disconnect_participant_usecase = Arc::new(DisconnectParticipantUseCase::new(
        repository,
        message_pusher,
        room_locks,
    ));

    // 4. Create and run the server
    let server = Server::new(
        connect_participant_usecase,
        join_room_usecase,
        send_message_usecase,
        disconnect_participant_usecase,
    );
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
