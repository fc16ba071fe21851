//! UseCase テスト用のフィクスチャ
//!
//! 実際の InMemoryRoomRepository / WebSocketMessagePusher を組み立て、
//! 各接続が受信したフレームを `ServerMessage` として取り出せるようにする。

use std::sync::Arc;

use parley_shared::time::FixedClock;
use tokio::sync::mpsc;

use crate::{
    domain::Session,
    infrastructure::{
        dto::websocket::ServerMessage, message_pusher::WebSocketMessagePusher,
        repository::InMemoryRoomRepository,
    },
};

use super::{
    ConnectParticipantUseCase, DisconnectParticipantUseCase, JoinRequest, JoinRoomUseCase,
    RoomLocks, SendMessageRequest, SendMessageUseCase,
};

/// 2023-01-01 09:30:00 UTC
pub const FIXED_NOW: i64 = 1672565400000;
pub const FIXED_DISPLAY_TIME: &str = "09:30";

pub struct Harness {
    pub repository: Arc<InMemoryRoomRepository>,
    pub connect: ConnectParticipantUseCase,
    pub join: JoinRoomUseCase,
    pub send: SendMessageUseCase,
    pub disconnect: DisconnectParticipantUseCase,
}

pub struct TestConnection {
    pub session: Session,
    rx: mpsc::UnboundedReceiver<String>,
}

impl TestConnection {
    /// これまでに受信したフレームをすべて取り出す
    pub fn drain(&mut self) -> Vec<ServerMessage> {
        let mut messages = Vec::new();
        while let Ok(frame) = self.rx.try_recv() {
            messages.push(serde_json::from_str(&frame).expect("frame should be a ServerMessage"));
        }
        messages
    }
}

impl Harness {
    pub fn new() -> Self {
        let repository = Arc::new(InMemoryRoomRepository::new());
        let pusher = Arc::new(WebSocketMessagePusher::default());
        let room_locks = Arc::new(RoomLocks::new());
        let clock = Arc::new(FixedClock::new(FIXED_NOW));

        Self {
            repository: repository.clone(),
            connect: ConnectParticipantUseCase::new(pusher.clone()),
            join: JoinRoomUseCase::new(
                repository.clone(),
                pusher.clone(),
                room_locks.clone(),
                clock.clone(),
            ),
            send: SendMessageUseCase::new(
                repository.clone(),
                pusher.clone(),
                room_locks.clone(),
                clock,
            ),
            disconnect: DisconnectParticipantUseCase::new(repository, pusher, room_locks),
        }
    }

    pub async fn connect(&self) -> TestConnection {
        let (tx, rx) = mpsc::unbounded_channel();
        let session = self.connect.execute(tx).await;
        TestConnection { session, rx }
    }

    /// 接続して join し、join 時に受信したフレームは捨てる
    pub async fn joined(&self, username: &str, room: &str, password: &str) -> TestConnection {
        let mut connection = self.connect().await;
        self.join
            .execute(&mut connection.session, join_request(username, room, password))
            .await
            .expect("join should succeed");
        connection.drain();
        connection
    }
}

pub fn join_request(username: &str, room: &str, password: &str) -> JoinRequest {
    JoinRequest {
        username: username.to_string(),
        room: room.to_string(),
        password: password.to_string(),
    }
}

pub fn send_request(username: &str, room: &str, text: &str, time: Option<&str>) -> SendMessageRequest {
    SendMessageRequest {
        username: username.to_string(),
        room: room.to_string(),
        text: text.to_string(),
        time: time.map(str::to_string),
    }
}
