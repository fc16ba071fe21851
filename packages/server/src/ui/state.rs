//! Shared application state handed to every handler.

use std::sync::Arc;

use crate::usecase::{
    ConnectParticipantUseCase, DisconnectParticipantUseCase, JoinRoomUseCase, SendMessageUseCase,
};

/// Shared application state
pub struct AppState {
    /// ConnectParticipantUseCase（接続受付のユースケース）
    pub connect_participant_usecase: Arc<ConnectParticipantUseCase>,
    /// JoinRoomUseCase（ルーム参加のユースケース）
    pub join_room_usecase: Arc<JoinRoomUseCase>,
    /// SendMessageUseCase（メッセージ送信のユースケース）
    pub send_message_usecase: Arc<SendMessageUseCase>,
    /// DisconnectParticipantUseCase（参加者切断のユースケース）
    pub disconnect_participant_usecase: Arc<DisconnectParticipantUseCase>,
}
