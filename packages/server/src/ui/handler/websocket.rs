//! WebSocket connection handlers.

use std::{fmt::Display, future::Future, sync::Arc};

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, Stream, StreamExt},
};
use tokio::sync::mpsc;

use crate::{
    domain::Session,
    infrastructure::dto::websocket::{ClientEvent, JoinRoomPayload, SendMessagePayload},
    ui::state::AppState,
    usecase::{JoinRequest, SendMessageRequest},
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Spawns a task that receives frames from the rx channel and pushes them to the WebSocket sender.
///
/// Every event addressed to this connection goes through this single task, so frames reach
/// the client in the order they were enqueued.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if sender.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (sender, receiver) = socket.split();

    // Create a channel for this connection to receive events
    let (tx, rx) = mpsc::unbounded_channel();
    let mut session = state.connect_participant_usecase.execute(tx).await;
    let connection_id = session.connection_id();
    tracing::info!("Connection '{}' opened", connection_id);

    let mut send_task = pusher_loop(rx, sender);

    receive_loop(receiver, &mut send_task, &mut session, &state).await;
    send_task.abort();

    match state
        .disconnect_participant_usecase
        .execute(&mut session)
        .await
    {
        Ok(notified) => tracing::info!(
            "Connection '{}' closed ({} remaining member(s) notified)",
            connection_id,
            notified.len()
        ),
        Err(e) => tracing::warn!("Failed to clean up connection '{}': {}", connection_id, e),
    }
}

/// Reads client frames until the socket closes, dispatching each event to its use case.
///
/// `outbound_closed` resolves once frames can no longer be delivered to the client. It is
/// only raced against the next read, so an event that is already being dispatched always
/// runs to completion.
async fn receive_loop<S, E, F>(
    mut receiver: S,
    mut outbound_closed: F,
    session: &mut Session,
    state: &AppState,
) where
    S: Stream<Item = Result<Message, E>> + Unpin,
    E: Display,
    F: Future + Unpin,
{
    loop {
        let msg = tokio::select! {
            msg = receiver.next() => msg,
            _ = &mut outbound_closed => {
                tracing::info!("Connection '{}' can no longer be written to", session.connection_id());
                break;
            }
        };
        let msg = match msg {
            Some(Ok(msg)) => msg,
            Some(Err(e)) => {
                tracing::error!("WebSocket error: {}", e);
                break;
            }
            None => break,
        };

        match msg {
            Message::Text(text) => match serde_json::from_str::<ClientEvent>(&text) {
                Ok(event) => dispatch(event, session, state).await,
                Err(e) => tracing::warn!(
                    "Dropping unparsable frame from '{}': {}",
                    session.connection_id(),
                    e
                ),
            },
            Message::Ping(_) => {
                // Ping/pong is handled automatically by the WebSocket protocol
                tracing::debug!("Received ping");
            }
            Message::Close(_) => {
                tracing::info!("Connection '{}' requested close", session.connection_id());
                break;
            }
            _ => {}
        }
    }
}

async fn dispatch(event: ClientEvent, session: &mut Session, state: &AppState) {
    match event {
        ClientEvent::JoinRoom(payload) => {
            // The reply has already been pushed by the use case
            if let Ok(ack) = state
                .join_room_usecase
                .execute(session, join_request(payload))
                .await
            {
                tracing::debug!(
                    "Replayed {} message(s) of '{}' to '{}'",
                    ack.history.len(),
                    ack.room,
                    ack.username
                );
            }
        }
        ClientEvent::SendMessage(payload) => {
            if let Err(e) = state
                .send_message_usecase
                .execute(session, send_request(payload))
                .await
            {
                tracing::warn!(
                    "Dropped message from '{}': {}",
                    session.connection_id(),
                    e
                );
            }
        }
    }
}

fn join_request(payload: JoinRoomPayload) -> JoinRequest {
    JoinRequest {
        username: payload.username.unwrap_or_default(),
        room: payload.room.unwrap_or_default(),
        password: payload.password.unwrap_or_default(),
    }
}

fn send_request(payload: SendMessagePayload) -> SendMessageRequest {
    SendMessageRequest {
        username: payload.username.unwrap_or_default(),
        room: payload.room.unwrap_or_default(),
        text: payload.text.unwrap_or_default(),
        time: payload.time,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use futures_util::stream;
    use parley_shared::time::FixedClock;
    use serde_json::{Value, json};
    use tokio::sync::oneshot;

    use super::*;
    use crate::{
        domain::{RoomName, RoomRepository},
        infrastructure::{
            message_pusher::WebSocketMessagePusher, repository::InMemoryRoomRepository,
        },
        usecase::{
            ConnectParticipantUseCase, DisconnectParticipantUseCase, JoinRoomUseCase, RoomLocks,
            SendMessageUseCase,
        },
    };

    fn app_state(repository: Arc<InMemoryRoomRepository>) -> AppState {
        let message_pusher = Arc::new(WebSocketMessagePusher::default());
        let room_locks = Arc::new(RoomLocks::new());
        let clock = Arc::new(FixedClock::new(1672565400000));
        AppState {
            connect_participant_usecase: Arc::new(ConnectParticipantUseCase::new(
                message_pusher.clone(),
            )),
            join_room_usecase: Arc::new(JoinRoomUseCase::new(
                repository.clone(),
                message_pusher.clone(),
                room_locks.clone(),
                clock.clone(),
            )),
            send_message_usecase: Arc::new(SendMessageUseCase::new(
                repository.clone(),
                message_pusher.clone(),
                room_locks.clone(),
                clock,
            )),
            disconnect_participant_usecase: Arc::new(DisconnectParticipantUseCase::new(
                repository,
                message_pusher,
                room_locks,
            )),
        }
    }

    async fn joined(
        state: &AppState,
        username: &str,
    ) -> (Session, mpsc::UnboundedReceiver<String>) {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut session = state.connect_participant_usecase.execute(tx).await;
        state
            .join_room_usecase
            .execute(
                &mut session,
                JoinRequest {
                    username: username.to_string(),
                    room: "lobby".to_string(),
                    password: "x".to_string(),
                },
            )
            .await
            .unwrap();
        while rx.try_recv().is_ok() {}
        (session, rx)
    }

    fn frames(rx: &mut mpsc::UnboundedReceiver<String>) -> Vec<Value> {
        let mut frames = Vec::new();
        while let Ok(frame) = rx.try_recv() {
            frames.push(serde_json::from_str(&frame).unwrap());
        }
        frames
    }

    #[tokio::test]
    async fn test_outbound_close_does_not_cancel_dispatch_in_flight() {
        // テスト項目: 受信済みのイベントを処理している間に送信側が閉じても、その処理は最後まで行われる
        // given (前提条件): 最初のフレームを渡すと同時に送信側が閉じ、以降は何も届かない接続
        let repository = Arc::new(InMemoryRoomRepository::new());
        let state = app_state(repository.clone());
        let (mut alice, _alice_rx) = joined(&state, "alice").await;
        let (_bob, mut bob_rx) = joined(&state, "bob").await;

        let (closed_tx, closed_rx) = oneshot::channel::<()>();
        let frame = json!({
            "event": "sendMessage",
            "data": {"username": "alice", "room": "lobby", "text": "last words", "time": "12:00"}
        });
        let receiver = Box::pin(
            stream::once(async move {
                let _ = closed_tx.send(());
                Ok::<_, axum::Error>(Message::Text(frame.to_string().into()))
            })
            .chain(stream::pending()),
        );

        // when (操作):
        tokio::time::timeout(
            Duration::from_secs(2),
            receive_loop(receiver, closed_rx, &mut alice, &state),
        )
        .await
        .expect("receive loop should stop once the outbound side is closed");

        // then (期待する結果): 送信は履歴に残り、他のメンバーにも配信されている
        assert_eq!(
            frames(&mut bob_rx),
            vec![json!({
                "event": "receiveMessage",
                "data": {"username": "alice", "text": "last words", "time": "12:00"}
            })]
        );
        let lobby = RoomName::new("lobby".to_string()).unwrap();
        assert_eq!(repository.get_history(&lobby).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_receive_loop_ends_when_client_stream_ends() {
        // テスト項目: クライアント側のストリームが終わると、送信側が開いたままでもループを抜ける
        // given (前提条件):
        let repository = Arc::new(InMemoryRoomRepository::new());
        let state = app_state(repository);
        let (mut alice, _alice_rx) = joined(&state, "alice").await;
        let receiver = stream::empty::<Result<Message, axum::Error>>();

        // when (操作):
        let result = tokio::time::timeout(
            Duration::from_secs(2),
            receive_loop(receiver, std::future::pending::<()>(), &mut alice, &state),
        )
        .await;

        // then (期待する結果):
        assert!(result.is_ok());
    }
}
