//! UseCase 層のエラー定義

use thiserror::Error;

use crate::domain::{RepositoryError, SessionError};

/// join 要求のエラー
///
/// `Display` の文言はそのまま join 応答の `error` としてクライアントに返る。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JoinError {
    /// username / room / password のいずれかが欠けている
    #[error("All fields are required.")]
    Validation,

    /// ルームのパスワードと一致しない
    #[error("Incorrect password")]
    Auth,

    /// この接続は既に別のルームに参加している
    #[error("Already joined room '{0}'")]
    AlreadyJoined(String),

    #[error("Connection is closed")]
    SessionClosed,

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<SessionError> for JoinError {
    fn from(error: SessionError) -> Self {
        match error {
            SessionError::AlreadyAuthenticated(room) => Self::AlreadyJoined(room),
            SessionError::Closed => Self::SessionClosed,
        }
    }
}

/// メッセージ送信のエラー
///
/// いずれも送信者には通知されず、ログに記録されて破棄される。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendMessageError {
    /// username / room / text のいずれかが欠けている
    #[error("Malformed message")]
    Malformed,

    /// 未認証の接続からの送信
    #[error("Connection has not joined a room")]
    NotJoined,

    /// 参加中のルーム以外への送信
    #[error("Connection joined '{joined}' but addressed '{addressed}'")]
    RoomMismatch { joined: String, addressed: String },

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Broadcast failed: {0}")]
    BroadcastFailed(String),
}

/// 切断処理のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DisconnectError {
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}
