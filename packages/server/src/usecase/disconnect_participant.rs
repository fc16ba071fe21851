//! UseCase: 参加者切断処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectParticipantUseCase::execute() メソッド
//! - 切断処理（メンバー削除、残りのメンバーへの active_users 通知、送信チャンネルの登録解除）
//!
//! ### なぜこのテストが必要か
//! - 切断した接続がルームのメンバーに残り続けないことを保証
//! - 残りのメンバーに最新のメンバー一覧が届くことを確認
//! - 未参加の接続や二重の切断でも失敗しないことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：参加中の接続の切断
//! - エッジケース：最後のメンバーの切断（通知対象なし、ルームと履歴は残る）
//! - エッジケース：join 前の切断、同じセッションの二重切断

use std::sync::Arc;

use crate::domain::{ConnectionId, MessagePusher, RoomName, RoomRepository, ServerEvent, Session};

use super::{error::DisconnectError, room_lock::RoomLocks};

/// 参加者切断のユースケース
pub struct DisconnectParticipantUseCase {
    /// Repository（ルームレジストリ）
    repository: Arc<dyn RoomRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
    room_locks: Arc<RoomLocks>,
}

impl DisconnectParticipantUseCase {
    /// 新しい DisconnectParticipantUseCase を作成
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        room_locks: Arc<RoomLocks>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            room_locks,
        }
    }

    /// 参加者切断を実行
    ///
    /// セッションを `Closed` に遷移させ、参加中のルームがあればメンバーから外す。
    /// 送信チャンネルの登録解除はエラーの有無にかかわらず必ず行う。
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<ConnectionId>)` - active_users を通知した残りのメンバー
    /// * `Err(DisconnectError)` - ルームの更新に失敗
    pub async fn execute(&self, session: &mut Session) -> Result<Vec<ConnectionId>, DisconnectError> {
        let connection_id = session.connection_id();
        let result = match session.close() {
            Some((room, username)) => {
                let _guard = self.room_locks.acquire(&room).await;
                let result = self.leave_room(&connection_id, &room).await;
                if result.is_ok() {
                    tracing::info!("'{}' left room '{}'", username, room);
                }
                result
            }
            None => Ok(Vec::new()),
        };

        self.message_pusher.unregister_client(&connection_id).await;
        result
    }

    /// メンバーから外し、残りのメンバーへ active_users を配信（ルームロック保持中に呼ぶこと）
    async fn leave_room(
        &self,
        connection_id: &ConnectionId,
        room: &RoomName,
    ) -> Result<Vec<ConnectionId>, DisconnectError> {
        self.repository.remove_member(room, connection_id).await?;

        let remaining = self.repository.get_members(room).await?;
        if remaining.is_empty() {
            return Ok(Vec::new());
        }

        let targets: Vec<ConnectionId> = remaining.iter().map(|m| m.connection_id).collect();
        let users = ServerEvent::ActiveUsers(remaining.into_iter().map(|m| m.username).collect());
        if let Err(e) = self.message_pusher.broadcast(targets.clone(), &users).await {
            tracing::warn!("Failed to broadcast active users: {}", e);
        }
        Ok(targets)
    }
}
