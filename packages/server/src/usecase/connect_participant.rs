//! UseCase: 接続受付処理
//!
//! トランスポートが新しい接続を受け付けたときに呼ばれ、
//! 接続 ID の払い出しと送信チャンネルの登録を行います。
//! この時点のセッションは `Unauthenticated` で、どのルームにも属しません。

use std::sync::Arc;

use crate::domain::{ConnectionIdFactory, MessagePusher, PusherChannel, Session};

/// 接続受付のユースケース
pub struct ConnectParticipantUseCase {
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl ConnectParticipantUseCase {
    /// 新しい ConnectParticipantUseCase を作成
    pub fn new(message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self { message_pusher }
    }

    /// 接続を受け付け、未認証のセッションを返す
    ///
    /// # Arguments
    ///
    /// * `sender` - クライアントへのメッセージ送信用チャンネル
    pub async fn execute(&self, sender: PusherChannel) -> Session {
        let connection_id = ConnectionIdFactory::generate();
        self.message_pusher
            .register_client(connection_id, sender)
            .await;
        Session::new(connection_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MockMessagePusher, SessionState};

    #[tokio::test]
    async fn test_connect_registers_channel_and_returns_unauthenticated_session() {
        // テスト項目: 接続時に送信チャンネルが登録され、未認証セッションが返る
        // given (前提条件):
        let mut pusher = MockMessagePusher::new();
        pusher.expect_register_client().times(1).return_const(());
        let usecase = ConnectParticipantUseCase::new(Arc::new(pusher));
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();

        // when (操作):
        let session = usecase.execute(tx).await;

        // then (期待する結果):
        assert_eq!(session.state(), &SessionState::Unauthenticated);
        assert!(session.room().is_none());
    }
}
