//! サーバーからクライアントへ送るドメインイベント
//!
//! ワイヤ形式への変換は Infrastructure 層の DTO が担当します。

use super::{ChatMessage, Username};

/// クライアントへプッシュするイベント
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerEvent {
    /// join 要求の成功応答（参加前までの履歴を含む）
    JoinAccepted { history: Vec<ChatMessage> },
    /// join 要求の失敗応答
    JoinRejected { reason: String },
    /// ルームに投稿されたメッセージ
    MessageReceived(ChatMessage),
    /// どのメンバーにも帰属しないシステム通知
    SystemNotice(String),
    /// 現在のルームメンバー（参加順）
    ActiveUsers(Vec<Username>),
}

impl ServerEvent {
    /// 参加通知 `"<username> has joined the room."`
    pub fn joined_notice(username: &Username) -> Self {
        Self::SystemNotice(format!("{} has joined the room.", username.as_str()))
    }
}
