//! Conversion logic between domain entities and DTOs.

use crate::domain::{ChatMessage, ServerEvent};
use crate::infrastructure::dto::websocket as dto;

// ========================================
// Domain Entity → WebSocket DTO
// ========================================

impl From<&ChatMessage> for dto::MessageDto {
    fn from(model: &ChatMessage) -> Self {
        Self {
            username: model.username.as_str().to_string(),
            text: model.text.as_str().to_string(),
            time: model.time.as_str().to_string(),
        }
    }
}

impl From<&ServerEvent> for dto::ServerMessage {
    fn from(event: &ServerEvent) -> Self {
        match event {
            ServerEvent::JoinAccepted { history } => Self::JoinRoom(dto::JoinRoomResponse {
                success: true,
                history: Some(history.iter().map(dto::MessageDto::from).collect()),
                error: None,
            }),
            ServerEvent::JoinRejected { reason } => Self::JoinRoom(dto::JoinRoomResponse {
                success: false,
                history: None,
                error: Some(reason.clone()),
            }),
            ServerEvent::MessageReceived(message) => Self::ReceiveMessage(message.into()),
            ServerEvent::SystemNotice(text) => Self::SystemMessage(text.clone()),
            ServerEvent::ActiveUsers(users) => {
                Self::ActiveUsers(users.iter().map(|u| u.as_str().to_string()).collect())
            }
        }
    }
}
