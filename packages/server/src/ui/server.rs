//! Server execution logic.

use std::sync::Arc;

use axum::{Router, routing::get};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::usecase::{
    ConnectParticipantUseCase, DisconnectParticipantUseCase, JoinRoomUseCase, SendMessageUseCase,
};

use super::{
    handler::{health_check, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// Multi-room chat relay server
///
/// # Example
///
/// ```ignore
/// let server = Server::new(
///     connect_participant_usecase,
///     join_room_usecase,
///     send_message_usecase,
///     disconnect_participant_usecase,
/// );
/// server.run("127.0.0.1".to_string(), 5001).await?;
/// ```
pub struct Server {
    state: Arc<AppState>,
}

impl Server {
    /// Create a new Server instance from its use cases
    pub fn new(
        connect_participant_usecase: Arc<ConnectParticipantUseCase>,
        join_room_usecase: Arc<JoinRoomUseCase>,
        send_message_usecase: Arc<SendMessageUseCase>,
        disconnect_participant_usecase: Arc<DisconnectParticipantUseCase>,
    ) -> Self {
        Self {
            state: Arc::new(AppState {
                connect_participant_usecase,
                join_room_usecase,
                send_message_usecase,
                disconnect_participant_usecase,
            }),
        }
    }

    /// Build the axum router (WebSocket endpoint plus a health check)
    pub fn router(&self) -> Router {
        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .with_state(self.state.clone())
    }

    /// Run the chat server until Ctrl+C or SIGTERM
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let app = self.router();

        let bind_addr = format!("{}:{}", host, port);
        let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

        tracing::info!("Chat relay listening on {}", listener.local_addr()?);
        tracing::info!("Connect to: ws://{}/ws", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
