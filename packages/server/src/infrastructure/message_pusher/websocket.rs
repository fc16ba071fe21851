//! WebSocket を使った MessagePusher 実装
//!
//! ## 責務
//!
//! - 接続ごとの `UnboundedSender` を管理
//! - `ServerEvent` を JSON フレームに変換してクライアントへ送信（push_to, broadcast）
//!
//! ## 設計ノート
//!
//! WebSocket の生成は UI 層（`ui/handler/websocket.rs`）で行われます。
//! この実装は生成された `UnboundedSender` を受け取り、メッセージ送信に使用します。
//! 送信はチャンネルへの enqueue のみで、ソケットへの書き込みは接続ごとの
//! pusher タスクが行うため、遅いクライアントが他の接続を止めることはありません。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{
    domain::{ConnectionId, MessagePushError, MessagePusher, PusherChannel, ServerEvent},
    infrastructure::dto::websocket::ServerMessage,
};

/// WebSocket を使った MessagePusher 実装
///
/// ## 使用例
///
/// ```ignore
/// let clients = Arc::new(Mutex::new(HashMap::new()));
/// let pusher = WebSocketMessagePusher::new(clients.clone());
///
/// pusher.push_to(&connection_id, &ServerEvent::SystemNotice("hello".into())).await?;
/// ```
pub struct WebSocketMessagePusher {
    /// 接続中のクライアントの WebSocket sender
    ///
    /// Key: ConnectionId
    /// Value: PusherChannel
    clients: Arc<Mutex<HashMap<ConnectionId, PusherChannel>>>,
}

impl WebSocketMessagePusher {
    /// 新しい WebSocketMessagePusher を作成
    pub fn new(clients: Arc<Mutex<HashMap<ConnectionId, PusherChannel>>>) -> Self {
        Self { clients }
    }

    /// ServerEvent をワイヤ形式（JSON）に変換
    fn encode(event: &ServerEvent) -> Result<String, MessagePushError> {
        serde_json::to_string(&ServerMessage::from(event))
            .map_err(|e| MessagePushError::EncodeFailed(e.to_string()))
    }
}

impl Default for WebSocketMessagePusher {
    fn default() -> Self {
        Self::new(Arc::new(Mutex::new(HashMap::new())))
    }
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn register_client(&self, connection_id: ConnectionId, sender: PusherChannel) {
        let mut clients = self.clients.lock().await;
        clients.insert(connection_id, sender);
        tracing::debug!("Connection '{}' registered to MessagePusher", connection_id);
    }

    async fn unregister_client(&self, connection_id: &ConnectionId) {
        let mut clients = self.clients.lock().await;
        clients.remove(connection_id);
        tracing::debug!(
            "Connection '{}' unregistered from MessagePusher",
            connection_id
        );
    }

    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        event: &ServerEvent,
    ) -> Result<(), MessagePushError> {
        let frame = Self::encode(event)?;
        let clients = self.clients.lock().await;

        let sender = clients
            .get(connection_id)
            .ok_or_else(|| MessagePushError::ClientNotFound(connection_id.to_string()))?;
        sender
            .send(frame)
            .map_err(|e| MessagePushError::PushFailed(e.to_string()))?;
        tracing::debug!("Pushed event to connection '{}'", connection_id);
        Ok(())
    }

    async fn broadcast(
        &self,
        targets: Vec<ConnectionId>,
        event: &ServerEvent,
    ) -> Result<(), MessagePushError> {
        let frame = Self::encode(event)?;
        let clients = self.clients.lock().await;

        for target in targets {
            let Some(sender) = clients.get(&target) else {
                tracing::warn!(
                    "Connection '{}' not found during broadcast, skipping",
                    target
                );
                continue;
            };
            // ブロードキャストでは一部の送信失敗を許容
            if let Err(e) = sender.send(frame.clone()) {
                tracing::warn!("Failed to push event to connection '{}': {}", target, e);
            } else {
                tracing::debug!("Broadcasted event to connection '{}'", target);
            }
        }

        Ok(())
    }
}
