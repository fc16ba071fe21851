//! UseCase: ルーム参加（join）処理
//!
//! ## 処理の流れ
//!
//! 1. username / room / password がすべて揃っているか検証（`Validation`）
//! 2. ルームを取得または作成し、パスワードを検証または設定（`Auth`）
//!    - 未設定のルームでは最初の参加者のパスワードがルームのパスワードになる
//! 3. 参加前までの履歴を取得し、メンバーに追加、セッションを `Authenticated` に遷移
//! 4. 参加者へ join 応答 → 既存メンバーへ参加通知 → 全メンバーへ active_users
//!
//! 2〜4 はルームロックを保持したまま行う。これにより同時に新規ルームへ
//! 異なるパスワードで join した場合も、先にロックを取った方のパスワードが確定し、
//! 参加者は join 応答より前に同じルームの他のイベントを受け取らない。

use std::sync::Arc;

use parley_shared::time::Clock;

use crate::domain::{
    ChatMessage, ConnectionId, Member, MessagePusher, RoomName, RoomPassword, RoomRepository,
    ServerEvent, Session, Timestamp, Username,
};

use super::{error::JoinError, room_lock::RoomLocks};

/// join 要求（トランスポートから受け取った生の値）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JoinRequest {
    pub username: String,
    pub room: String,
    pub password: String,
}

/// join 成功時の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinAck {
    pub room: RoomName,
    pub username: Username,
    /// この join でルームが新規作成されたか
    pub created: bool,
    /// 参加前までの履歴（投稿順）
    pub history: Vec<ChatMessage>,
    /// 参加後のメンバー（参加順）
    pub active_users: Vec<Username>,
}

/// ルーム参加のユースケース
pub struct JoinRoomUseCase {
    /// Repository（ルームレジストリ）
    repository: Arc<dyn RoomRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
    /// ルーム単位の直列化ロック
    room_locks: Arc<RoomLocks>,
    clock: Arc<dyn Clock>,
}

impl JoinRoomUseCase {
    /// 新しい JoinRoomUseCase を作成
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

    /// join を実行
    ///
    /// 成功・失敗いずれの場合も join 応答は呼び出し元の接続にプッシュ済みで、
    /// 戻り値は呼び出し元（トランスポート）のログと状態管理のために返す。
    ///
    /// # Returns
    ///
    /// * `Ok(JoinAck)` - 参加成功（セッションは `Authenticated` に遷移済み）
    /// * `Err(JoinError)` - 参加失敗（ルームもセッションも変更されない）
    pub async fn execute(
        &self,
        session: &mut Session,
        request: JoinRequest,
    ) -> Result<JoinAck, JoinError> {
        let connection_id = session.connection_id();

        let (room, username, password) = match Self::validate(session, request) {
            Ok(fields) => fields,
            Err(e) => {
                self.reply_rejected(&connection_id, &e).await;
                return Err(e);
            }
        };

        let _guard = self.room_locks.acquire(&room).await;

        match self.admit(session, room, username, password).await {
            Ok(ack) => {
                self.announce(&connection_id, &ack).await;
                Ok(ack)
            }
            Err(e) => {
                self.reply_rejected(&connection_id, &e).await;
                Err(e)
            }
        }
    }

    /// 1. 必須フィールドとセッション状態の検証（副作用なし）
    fn validate(
        session: &Session,
        request: JoinRequest,
    ) -> Result<(RoomName, Username, RoomPassword), JoinError> {
        let username = Username::new(request.username).map_err(|_| JoinError::Validation)?;
        let room = RoomName::new(request.room).map_err(|_| JoinError::Validation)?;
        let password = RoomPassword::new(request.password).map_err(|_| JoinError::Validation)?;
        session.ensure_can_join()?;
        Ok((room, username, password))
    }

    /// 2〜3. 認証とメンバー登録（ルームロック保持中に呼ぶこと）
    async fn admit(
        &self,
        session: &mut Session,
        room: RoomName,
        username: Username,
        password: RoomPassword,
    ) -> Result<JoinAck, JoinError> {
        let now = Timestamp::new(self.clock.now_millis());
        let ensured = self.repository.ensure_room(&room, now).await;

        match &ensured.password {
            Some(stored) if !stored.matches(&password) => return Err(JoinError::Auth),
            Some(_) => {}
            None => {
                self.repository.set_password(&room, password).await?;
                tracing::info!("Password bound to room '{}' by '{}'", room, username);
            }
        }

        let history = self.repository.get_history(&room).await?;

        let member = Member::new(session.connection_id(), username.clone(), now);
        self.repository.add_member(&room, member).await?;
        session.authenticate(room.clone(), username.clone())?;

        let active_users = self
            .repository
            .get_members(&room)
            .await?
            .into_iter()
            .map(|m| m.username)
            .collect();

        tracing::info!("'{}' joined room '{}'", username, room);

        Ok(JoinAck {
            room,
            username,
            created: ensured.created,
            history,
            active_users,
        })
    }

    /// 4. join 応答・参加通知・active_users の配信（ルームロック保持中に呼ぶこと）
    async fn announce(&self, connection_id: &ConnectionId, ack: &JoinAck) {
        let reply = ServerEvent::JoinAccepted {
            history: ack.history.clone(),
        };
        if let Err(e) = self.message_pusher.push_to(connection_id, &reply).await {
            tracing::warn!("Failed to reply to join from '{}': {}", connection_id, e);
        }

        let members = match self.repository.get_members(&ack.room).await {
            Ok(members) => members,
            Err(e) => {
                tracing::warn!("Failed to load members of '{}': {}", ack.room, e);
                return;
            }
        };
        let others: Vec<ConnectionId> = members
            .iter()
            .map(|m| m.connection_id)
            .filter(|id| id != connection_id)
            .collect();
        let everyone: Vec<ConnectionId> = members.iter().map(|m| m.connection_id).collect();

        if !others.is_empty()
            && let Err(e) = self
                .message_pusher
                .broadcast(others, &ServerEvent::joined_notice(&ack.username))
                .await
        {
            tracing::warn!("Failed to broadcast join notice: {}", e);
        }

        let active_users = ServerEvent::ActiveUsers(ack.active_users.clone());
        if let Err(e) = self.message_pusher.broadcast(everyone, &active_users).await {
            tracing::warn!("Failed to broadcast active users: {}", e);
        }
    }

    async fn reply_rejected(&self, connection_id: &ConnectionId, error: &JoinError) {
        tracing::warn!("Join from '{}' rejected: {}", connection_id, error);
        let reply = ServerEvent::JoinRejected {
            reason: error.to_string(),
        };
        if let Err(e) = self.message_pusher.push_to(connection_id, &reply).await {
            tracing::warn!("Failed to reply to join from '{}': {}", connection_id, e);
        }
    }
}
