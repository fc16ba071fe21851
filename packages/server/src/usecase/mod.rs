//! UseCase 層
//!
//! 接続受付・join・メッセージ送信・切断を提供します。
//! 同じルームに対する更新系の処理は `RoomLocks` で直列化されます。

pub mod connect_participant;
pub mod disconnect_participant;
pub mod error;
pub mod join_room;
pub mod room_lock;
pub mod send_message;

#[cfg(test)]
mod test_support;

pub use connect_participant::ConnectParticipantUseCase;
pub use disconnect_participant::DisconnectParticipantUseCase;
pub use error::{DisconnectError, JoinError, SendMessageError};
pub use join_room::{JoinAck, JoinRequest, JoinRoomUseCase};
pub use room_lock::RoomLocks;
pub use send_message::{SendMessageRequest, SendMessageUseCase};
