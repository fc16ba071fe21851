//! WebSocket event DTOs.
//!
//! Every frame is a JSON text frame shaped as `{"event": <name>, "data": <payload>}`.

use serde::{Deserialize, Serialize};

/// Events sent from a client to the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ClientEvent {
    /// Request/response: authenticate into a room
    #[serde(rename = "join_room")]
    JoinRoom(JoinRoomPayload),
    /// Fire-and-forget: post a message to a room
    #[serde(rename = "sendMessage")]
    SendMessage(SendMessagePayload),
}

/// `join_room` request payload
///
/// Missing fields deserialize as `None` so that they are rejected by
/// validation rather than by the JSON parser.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JoinRoomPayload {
    pub username: Option<String>,
    pub room: Option<String>,
    pub password: Option<String>,
}

/// `sendMessage` payload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SendMessagePayload {
    pub username: Option<String>,
    pub room: Option<String>,
    pub text: Option<String>,
    pub time: Option<String>,
}

/// Events pushed from the server to a client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerMessage {
    /// Response to `join_room`
    #[serde(rename = "join_room")]
    JoinRoom(JoinRoomResponse),
    #[serde(rename = "receiveMessage")]
    ReceiveMessage(MessageDto),
    #[serde(rename = "systemMessage")]
    SystemMessage(String),
    /// Current room members in join order
    #[serde(rename = "active_users")]
    ActiveUsers(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinRoomResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history: Option<Vec<MessageDto>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDto {
    pub username: String,
    pub text: String,
    pub time: String,
}
