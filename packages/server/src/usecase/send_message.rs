//! UseCase: メッセージ送信処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SendMessageUseCase::execute() メソッド
//! - メッセージ送信処理（履歴への追加、ルームメンバー全員へのブロードキャスト）
//!
//! ### なぜこのテストが必要か
//! - 送信者本人を含むルームの全メンバーにだけ届き、他のルームには漏れないことを保証
//! - 履歴に追加された順序と配信順序が一致することを確認
//! - 未参加の接続や参加中以外のルーム宛ての送信が黙って破棄されることを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：メッセージ送信とブロードキャスト（クライアント指定の時刻 / サーバー時刻）
//! - 異常系：フィールド欠落、未参加、ルーム不一致
//! - エッジケース：送信者のみが参加しているルーム（本人にだけ届く）

use std::sync::Arc;

use parley_shared::time::Clock;

use crate::domain::{
    ChatMessage, ConnectionId, DisplayTime, MessagePusher, MessageText, RoomName, RoomRepository,
    ServerEvent, Session, Username,
};

use super::{error::SendMessageError, room_lock::RoomLocks};

/// メッセージ送信要求（トランスポートから受け取った生の値）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendMessageRequest {
    pub username: String,
    pub room: String,
    pub text: String,
    /// クライアントが付けた表示用時刻。空または未指定ならサーバー時刻を使う
    pub time: Option<String>,
}

/// メッセージ送信のユースケース
pub struct SendMessageUseCase {
    /// Repository（ルームレジストリ）
    repository: Arc<dyn RoomRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
    room_locks: Arc<RoomLocks>,
    clock: Arc<dyn Clock>,
}

impl SendMessageUseCase {
    /// 新しい SendMessageUseCase を作成
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        room_locks: Arc<RoomLocks>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            room_locks,
            clock,
        }
    }

    /// メッセージ送信を実行
    ///
    /// # Arguments
    ///
    /// * `session` - 送信元接続のセッション
    /// * `request` - 送信要求
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<ConnectionId>)` - 配信対象の接続 ID リスト（送信者を含む）
    /// * `Err(SendMessageError)` - 送信は破棄された（送信者には通知しない）
    pub async fn execute(
        &self,
        session: &Session,
        request: SendMessageRequest,
    ) -> Result<Vec<ConnectionId>, SendMessageError> {
        // 1. 入力の検証
        let username = Username::new(request.username).map_err(|_| SendMessageError::Malformed)?;
        let room = RoomName::new(request.room).map_err(|_| SendMessageError::Malformed)?;
        let text = MessageText::new(request.text).map_err(|_| SendMessageError::Malformed)?;
        let time = match request.time.filter(|t| !t.is_empty()) {
            Some(t) => DisplayTime::new(t),
            None => DisplayTime::new(self.clock.display_time()),
        }
        .map_err(|_| SendMessageError::Malformed)?;

        // 2. セッションが宛先ルームに参加済みか確認
        match session.room() {
            None => return Err(SendMessageError::NotJoined),
            Some(joined) if joined != &room => {
                return Err(SendMessageError::RoomMismatch {
                    joined: joined.to_string(),
                    addressed: room.into_string(),
                });
            }
            Some(_) => {}
        }

        let message = ChatMessage::new(username, text, time);
        let _guard = self.room_locks.acquire(&room).await;

        // 3. 履歴に追加してから、その時点のメンバー全員へ配信
        let count = self.repository.append_history(&room, message.clone()).await?;
        let targets: Vec<ConnectionId> = self
            .repository
            .get_members(&room)
            .await?
            .into_iter()
            .map(|m| m.connection_id)
            .collect();

        self.message_pusher
            .broadcast(targets.clone(), &ServerEvent::MessageReceived(message))
            .await
            .map_err(|e| SendMessageError::BroadcastFailed(e.to_string()))?;

        tracing::debug!(
            "Message #{} in '{}' delivered to {} connection(s)",
            count,
            room,
            targets.len()
        );
        Ok(targets)
    }
}
