//! End-to-end tests against an in-process server over real WebSocket and HTTP connections.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use futures_util::{SinkExt, StreamExt};
use parley_server::{
    infrastructure::{message_pusher::WebSocketMessagePusher, repository::InMemoryRoomRepository},
    ui::Server,
    usecase::{
        ConnectParticipantUseCase, DisconnectParticipantUseCase, JoinRoomUseCase, RoomLocks,
        SendMessageUseCase,
    },
};
use parley_shared::time::FixedClock;
use serde_json::{Value, json};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// 2023-01-01 09:30:00 UTC
const FIXED_NOW: i64 = 1672565400000;

/// Start a server on an ephemeral port and return its address
async fn start_server() -> SocketAddr {
    let repository = Arc::new(InMemoryRoomRepository::new());
    let message_pusher = Arc::new(WebSocketMessagePusher::default());
    let room_locks = Arc::new(RoomLocks::new());
    let clock = Arc::new(FixedClock::new(FIXED_NOW));

    let server = Server::new(
        Arc::new(ConnectParticipantUseCase::new(message_pusher.clone())),
        Arc::new(JoinRoomUseCase::new(
            repository.clone(),
            message_pusher.clone(),
            room_locks.clone(),
            clock.clone(),
        )),
        Arc::new(SendMessageUseCase::new(
            repository.clone(),
            message_pusher.clone(),
            room_locks.clone(),
            clock,
        )),
        Arc::new(DisconnectParticipantUseCase::new(
            repository,
            message_pusher,
            room_locks,
        )),
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = server.router();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn connect(addr: SocketAddr) -> Client {
    let (client, _) = connect_async(format!("ws://{}/ws", addr)).await.unwrap();
    client
}

async fn emit(client: &mut Client, frame: Value) {
    client
        .send(Message::Text(frame.to_string().into()))
        .await
        .unwrap();
}

/// Receive the next JSON text frame, failing the test after a timeout
async fn next_event(client: &mut Client) -> Value {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(2), client.next())
            .await
            .expect("timed out waiting for an event")
            .expect("connection closed")
            .unwrap();
        if let Message::Text(text) = msg {
            return serde_json::from_str(&text).unwrap();
        }
    }
}

/// Assert that no event arrives within a short window
async fn assert_silent(client: &mut Client) {
    let result = tokio::time::timeout(Duration::from_millis(200), client.next()).await;
    assert!(result.is_err(), "unexpected event: {:?}", result);
}

async fn join(client: &mut Client, username: &str, room: &str, password: &str) -> Value {
    emit(
        client,
        json!({"event": "join_room", "data": {"username": username, "room": room, "password": password}}),
    )
    .await;
    next_event(client).await
}

#[tokio::test]
async fn test_chat_session_end_to_end() {
    // テスト項目: join → 参加通知 → 送信 → パスワード拒否 → 履歴再生 → 切断 の一連の流れ
    // given (前提条件):
    let addr = start_server().await;
    let mut alice = connect(addr).await;
    let mut bob = connect(addr).await;

    // when (操作): alice が新しいルームを作成
    let reply = join(&mut alice, "alice", "lobby", "x").await;

    // then (期待する結果):
    assert_eq!(
        reply,
        json!({"event": "join_room", "data": {"success": true, "history": []}})
    );
    assert_eq!(
        next_event(&mut alice).await,
        json!({"event": "active_users", "data": ["alice"]})
    );

    // when (操作): bob が同じパスワードで参加
    let reply = join(&mut bob, "bob", "lobby", "x").await;

    // then (期待する結果):
    assert_eq!(
        reply,
        json!({"event": "join_room", "data": {"success": true, "history": []}})
    );
    assert_eq!(
        next_event(&mut bob).await,
        json!({"event": "active_users", "data": ["alice", "bob"]})
    );
    assert_eq!(
        next_event(&mut alice).await,
        json!({"event": "systemMessage", "data": "bob has joined the room."})
    );
    assert_eq!(
        next_event(&mut alice).await,
        json!({"event": "active_users", "data": ["alice", "bob"]})
    );

    // when (操作): alice がメッセージを送信
    emit(
        &mut alice,
        json!({"event": "sendMessage", "data": {"username": "alice", "room": "lobby", "text": "hi", "time": "12:00"}}),
    )
    .await;

    // then (期待する結果): 送信者本人にも届く
    let expected = json!({"event": "receiveMessage", "data": {"username": "alice", "text": "hi", "time": "12:00"}});
    assert_eq!(next_event(&mut alice).await, expected);
    assert_eq!(next_event(&mut bob).await, expected);

    // when (操作): 誤ったパスワードで参加
    let mut mallory = connect(addr).await;
    let reply = join(&mut mallory, "mallory", "lobby", "wrong").await;

    // then (期待する結果): 本人にだけ失敗が返り、他のメンバーには何も届かない
    assert_eq!(
        reply,
        json!({"event": "join_room", "data": {"success": false, "error": "Incorrect password"}})
    );
    assert_silent(&mut alice).await;

    // when (操作): 後から参加した carol に履歴が再生される
    let mut carol = connect(addr).await;
    let reply = join(&mut carol, "carol", "lobby", "x").await;

    // then (期待する結果):
    assert_eq!(
        reply,
        json!({"event": "join_room", "data": {"success": true, "history": [
            {"username": "alice", "text": "hi", "time": "12:00"}
        ]}})
    );
    assert_eq!(
        next_event(&mut alice).await,
        json!({"event": "systemMessage", "data": "carol has joined the room."})
    );
    assert_eq!(
        next_event(&mut alice).await,
        json!({"event": "active_users", "data": ["alice", "bob", "carol"]})
    );

    // when (操作): bob が切断
    bob.close(None).await.unwrap();

    // then (期待する結果): 残りのメンバーに最新の active_users が届く
    assert_eq!(
        next_event(&mut alice).await,
        json!({"event": "active_users", "data": ["alice", "carol"]})
    );
}

#[tokio::test]
async fn test_join_with_missing_fields_is_rejected() {
    // テスト項目: フィールドが欠けた join は "All fields are required." で拒否される
    // given (前提条件):
    let addr = start_server().await;
    let mut client = connect(addr).await;

    // when (操作):
    emit(
        &mut client,
        json!({"event": "join_room", "data": {"username": "alice", "room": "lobby"}}),
    )
    .await;

    // then (期待する結果):
    assert_eq!(
        next_event(&mut client).await,
        json!({"event": "join_room", "data": {"success": false, "error": "All fields are required."}})
    );
}

#[tokio::test]
async fn test_messages_stay_in_their_room() {
    // テスト項目: 別のルームのメッセージは届かず、未参加の送信や不正なフレームは無視される
    // given (前提条件):
    let addr = start_server().await;
    let mut alice = connect(addr).await;
    let mut carol = connect(addr).await;
    let mut stranger = connect(addr).await;
    join(&mut alice, "alice", "lobby", "x").await;
    next_event(&mut alice).await;
    join(&mut carol, "carol", "kitchen", "y").await;
    next_event(&mut carol).await;

    // when (操作):
    emit(
        &mut alice,
        json!({"event": "sendMessage", "data": {"username": "alice", "room": "lobby", "text": "hi"}}),
    )
    .await;
    emit(
        &mut stranger,
        json!({"event": "sendMessage", "data": {"username": "eve", "room": "kitchen", "text": "spam"}}),
    )
    .await;
    stranger
        .send(Message::Text("not json".to_string().into()))
        .await
        .unwrap();

    // then (期待する結果): 時刻未指定のメッセージにはサーバー時刻が付く
    assert_eq!(
        next_event(&mut alice).await,
        json!({"event": "receiveMessage", "data": {"username": "alice", "text": "hi", "time": "09:30"}})
    );
    assert_silent(&mut carol).await;
    assert_silent(&mut stranger).await;
}

#[tokio::test]
async fn test_http_exposes_only_health_check() {
    // テスト項目: HTTP からはヘルスチェックのみ取得でき、ルームのメンバーや状態は参照できない
    // given (前提条件): 認証済みのメンバーがいるルーム
    let addr = start_server().await;
    let mut alice = connect(addr).await;
    join(&mut alice, "alice", "lobby", "x").await;
    next_event(&mut alice).await;
    let http = reqwest::Client::new();

    // when (操作):
    let health: Value = http
        .get(format!("http://{}/api/health", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let rooms = http
        .get(format!("http://{}/api/rooms", addr))
        .send()
        .await
        .unwrap();
    let detail = http
        .get(format!("http://{}/api/rooms/lobby", addr))
        .send()
        .await
        .unwrap();

    // then (期待する結果):
    assert_eq!(health, json!({"status": "ok"}));
    assert_eq!(rooms.status(), reqwest::StatusCode::NOT_FOUND);
    assert_eq!(detail.status(), reqwest::StatusCode::NOT_FOUND);
    let body = detail.text().await.unwrap();
    assert!(!body.contains("alice"));
}
