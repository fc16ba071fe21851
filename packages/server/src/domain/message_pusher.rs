//! MessagePusher trait 定義
//!
//! 接続中のクライアントへイベントを送信するためのインターフェース。
//! ワイヤ形式（JSON など）への変換は実装側の責務です。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{ConnectionId, MessagePushError, ServerEvent};

/// クライアントへの送信チャンネル（シリアライズ済みフレーム）
pub type PusherChannel = mpsc::UnboundedSender<String>;

/// MessagePusher trait
///
/// 送信は fire-and-forget で、確認応答や再送は行わない。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// クライアントの送信チャンネルを登録
    async fn register_client(&self, connection_id: ConnectionId, sender: PusherChannel);

    /// クライアントの送信チャンネルを登録解除
    async fn unregister_client(&self, connection_id: &ConnectionId);

    /// 特定のクライアントにイベントを送信
    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        event: &ServerEvent,
    ) -> Result<(), MessagePushError>;

    /// 複数のクライアントにイベントを送信（一部の失敗は許容）
    async fn broadcast(
        &self,
        targets: Vec<ConnectionId>,
        event: &ServerEvent,
    ) -> Result<(), MessagePushError>;
}
