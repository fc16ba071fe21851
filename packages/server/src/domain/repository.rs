//! Repository trait 定義
//!
//! ルームレジストリ（パスワード・履歴・メンバー）へのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use async_trait::async_trait;

use super::{ChatMessage, ConnectionId, Member, RepositoryError, RoomName, RoomPassword, Timestamp};

/// `ensure_room` の結果
///
/// `password` によって、呼び出し側は「パスワードを設定する」か
/// 「パスワードを検証する」かを判断する。履歴は含まない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnsuredRoom {
    /// この呼び出しでルームが新規作成されたか
    pub created: bool,
    /// 呼び出し時点で設定済みのパスワード
    pub password: Option<RoomPassword>,
}

/// Room Repository trait（ルームレジストリ）
///
/// 各操作は 1 ルームに対してアトミックに実行される。
/// 複数操作にまたがる一貫性は UseCase 層のルームロックで担保する。
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// ルームを取得し、存在しなければパスワード未設定の空ルームを作成する（冪等）
    async fn ensure_room(&self, name: &RoomName, created_at: Timestamp) -> EnsuredRoom;

    /// 保存されているパスワードを取得（未設定なら `None`）
    async fn get_password(&self, name: &RoomName)
    -> Result<Option<RoomPassword>, RepositoryError>;

    /// パスワードを設定
    async fn set_password(
        &self,
        name: &RoomName,
        password: RoomPassword,
    ) -> Result<(), RepositoryError>;

    /// 履歴に追加し、追加後の件数を返す
    async fn append_history(
        &self,
        name: &RoomName,
        message: ChatMessage,
    ) -> Result<usize, RepositoryError>;

    /// 投稿順の履歴を取得
    async fn get_history(&self, name: &RoomName) -> Result<Vec<ChatMessage>, RepositoryError>;

    /// メンバーを追加
    async fn add_member(&self, name: &RoomName, member: Member) -> Result<(), RepositoryError>;

    /// メンバーを削除（存在しなければ `Ok(None)`）
    async fn remove_member(
        &self,
        name: &RoomName,
        connection_id: &ConnectionId,
    ) -> Result<Option<Member>, RepositoryError>;

    /// 参加順のメンバー一覧を取得
    async fn get_members(&self, name: &RoomName) -> Result<Vec<Member>, RepositoryError>;
}
