//! ドメイン層のエラー定義

use thiserror::Error;

/// 値オブジェクトの生成エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    /// 必須フィールドが空
    #[error("{0} must not be empty")]
    Empty(&'static str),
}

/// Room エンティティの不変条件違反
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomError {
    /// パスワードは一度設定されたら変更できない
    #[error("Room '{0}' already has a password")]
    PasswordAlreadySet(String),

    /// 同じ接続が二重に参加しようとした
    #[error("Connection '{0}' is already a member")]
    DuplicateMember(String),
}

/// Repository のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("Room '{0}' not found")]
    RoomNotFound(String),

    #[error(transparent)]
    Room(#[from] RoomError),
}

/// MessagePusher のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("Client '{0}' not found")]
    ClientNotFound(String),

    #[error("Failed to push message: {0}")]
    PushFailed(String),

    #[error("Failed to encode event: {0}")]
    EncodeFailed(String),
}

/// Session の状態遷移エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// セッションのルームは固定（ルームの切り替え不可）
    #[error("Session already joined room '{0}'")]
    AlreadyAuthenticated(String),

    #[error("Session is closed")]
    Closed,
}
