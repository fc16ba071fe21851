//! エンティティ
//!
//! - `Room`: パスワード・履歴・メンバーを持つチャットルーム
//! - `ChatMessage`: ルームに投稿された不変のメッセージ
//! - `Member`: ルームに参加中の接続
//! - `Session`: 1 接続の認証状態（状態機械）

use std::collections::VecDeque;

use super::{
    ConnectionId, DisplayTime, MessageText, RoomName, RoomPassword, Timestamp, Username,
    error::{RoomError, SessionError},
};

/// チャットメッセージ（生成後は不変）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub username: Username,
    pub text: MessageText,
    pub time: DisplayTime,
}

impl ChatMessage {
    pub fn new(username: Username, text: MessageText, time: DisplayTime) -> Self {
        Self {
            username,
            text,
            time,
        }
    }
}

/// ルームに参加中の接続
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub connection_id: ConnectionId,
    pub username: Username,
    pub joined_at: Timestamp,
}

impl Member {
    pub fn new(connection_id: ConnectionId, username: Username, joined_at: Timestamp) -> Self {
        Self {
            connection_id,
            username,
            joined_at,
        }
    }
}

/// チャットルーム
///
/// 最初の join で遅延生成され、プロセスの生存中は削除されない。
/// 全メンバーが退出しても、パスワードと履歴は残る。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    pub name: RoomName,
    /// 参加順のメンバー
    pub members: Vec<Member>,
    pub created_at: Timestamp,
    password: Option<RoomPassword>,
    history: VecDeque<ChatMessage>,
    /// `Some(n)` の場合、最新 n 件のみ保持する
    history_limit: Option<usize>,
}

impl Room {
    /// パスワード未設定・履歴無制限の空ルームを作成
    pub fn new(name: RoomName, created_at: Timestamp) -> Self {
        Self::with_history_limit(name, created_at, None)
    }

    pub fn with_history_limit(
        name: RoomName,
        created_at: Timestamp,
        history_limit: Option<usize>,
    ) -> Self {
        Self {
            name,
            members: Vec::new(),
            created_at,
            password: None,
            history: VecDeque::new(),
            history_limit,
        }
    }

    pub fn password(&self) -> Option<&RoomPassword> {
        self.password.as_ref()
    }

    /// パスワードを設定する（一度だけ）
    pub fn bind_password(&mut self, password: RoomPassword) -> Result<(), RoomError> {
        if self.password.is_some() {
            return Err(RoomError::PasswordAlreadySet(self.name.as_str().to_string()));
        }
        self.password = Some(password);
        Ok(())
    }

    /// 履歴の末尾にメッセージを追加し、追加後の件数を返す
    pub fn append_message(&mut self, message: ChatMessage) -> usize {
        self.history.push_back(message);
        if let Some(limit) = self.history_limit {
            while self.history.len() > limit {
                self.history.pop_front();
            }
        }
        self.history.len()
    }

    /// 投稿順の履歴
    pub fn history(&self) -> Vec<ChatMessage> {
        self.history.iter().cloned().collect()
    }

    pub fn add_member(&mut self, member: Member) -> Result<(), RoomError> {
        if self.is_member(&member.connection_id) {
            return Err(RoomError::DuplicateMember(member.connection_id.to_string()));
        }
        self.members.push(member);
        Ok(())
    }

    /// メンバーを削除する。存在しなければ `None`
    pub fn remove_member(&mut self, connection_id: &ConnectionId) -> Option<Member> {
        let index = self
            .members
            .iter()
            .position(|m| &m.connection_id == connection_id)?;
        Some(self.members.remove(index))
    }

    pub fn is_member(&self, connection_id: &ConnectionId) -> bool {
        self.members.iter().any(|m| &m.connection_id == connection_id)
    }
}

/// 接続ごとの認証状態
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticated { room: RoomName, username: Username },
    Closed,
}

/// 1 接続のルーム参加セッション
///
/// `Unauthenticated -> Authenticated -> Closed` の順に遷移し、
/// `Closed` はどの状態からも到達できる終端状態。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    connection_id: ConnectionId,
    state: SessionState,
}

impl Session {
    pub fn new(connection_id: ConnectionId) -> Self {
        Self {
            connection_id,
            state: SessionState::Unauthenticated,
        }
    }

    pub fn connection_id(&self) -> ConnectionId {
        self.connection_id
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// 認証済みならルーム名を返す
    pub fn room(&self) -> Option<&RoomName> {
        match &self.state {
            SessionState::Authenticated { room, .. } => Some(room),
            _ => None,
        }
    }

    /// join を受け付けられる状態か
    pub fn ensure_can_join(&self) -> Result<(), SessionError> {
        match &self.state {
            SessionState::Unauthenticated => Ok(()),
            SessionState::Authenticated { room, .. } => Err(SessionError::AlreadyAuthenticated(
                room.as_str().to_string(),
            )),
            SessionState::Closed => Err(SessionError::Closed),
        }
    }

    pub fn authenticate(&mut self, room: RoomName, username: Username) -> Result<(), SessionError> {
        self.ensure_can_join()?;
        self.state = SessionState::Authenticated { room, username };
        Ok(())
    }

    /// セッションを閉じ、参加していたルームがあれば返す
    pub fn close(&mut self) -> Option<(RoomName, Username)> {
        match std::mem::replace(&mut self.state, SessionState::Closed) {
            SessionState::Authenticated { room, username } => Some((room, username)),
            _ => None,
        }
    }
}
