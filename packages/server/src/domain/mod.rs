//! ドメイン層
//!
//! ルーム・メッセージ・セッションのモデルと、
//! 外部（ストア・トランスポート）へのインターフェースを定義します。

pub mod entity;
pub mod error;
pub mod event;
pub mod factory;
pub mod message_pusher;
pub mod repository;
pub mod value_object;

pub use entity::{ChatMessage, Member, Room, Session, SessionState};
pub use error::{MessagePushError, RepositoryError, RoomError, SessionError, ValueObjectError};
pub use event::ServerEvent;
pub use factory::ConnectionIdFactory;
pub use message_pusher::{MessagePusher, PusherChannel};
pub use repository::{EnsuredRoom, RoomRepository};
pub use value_object::{
    ConnectionId, DisplayTime, MessageText, RoomName, RoomPassword, Timestamp, Username,
};

#[cfg(test)]
pub use message_pusher::MockMessagePusher;
