//! InMemory Room Repository 実装
//!
//! ドメイン層が定義する RoomRepository trait の具体的な実装。
//! HashMap をインメモリ DB として使用し、ルームごとに Mutex を持ちます。
//! プロセスが終了するとすべてのルーム・パスワード・履歴は失われます。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};

use crate::domain::{
    ChatMessage, ConnectionId, EnsuredRoom, Member, RepositoryError, Room, RoomName,
    RoomPassword, RoomRepository, Timestamp,
};

/// インメモリ Room Repository 実装
///
/// 異なるルームへの操作は互いにブロックしない。
pub struct InMemoryRoomRepository {
    /// Key: ルーム名, Value: ルームごとにロックされた Room ドメインモデル
    rooms: RwLock<HashMap<RoomName, Arc<Mutex<Room>>>>,
    /// 新規作成するルームの履歴上限（`None` なら無制限）
    history_limit: Option<usize>,
}

impl InMemoryRoomRepository {
    /// 履歴無制限の InMemoryRoomRepository を作成
    pub fn new() -> Self {
        Self::with_history_limit(None)
    }

    /// 新規ルームの履歴上限を指定して作成
    pub fn with_history_limit(history_limit: Option<usize>) -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
            history_limit,
        }
    }

    async fn room_handle(&self, name: &RoomName) -> Result<Arc<Mutex<Room>>, RepositoryError> {
        let rooms = self.rooms.read().await;
        rooms
            .get(name)
            .cloned()
            .ok_or_else(|| RepositoryError::RoomNotFound(name.as_str().to_string()))
    }
}

impl Default for InMemoryRoomRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    async fn ensure_room(&self, name: &RoomName, created_at: Timestamp) -> EnsuredRoom {
        let (handle, created) = {
            let mut rooms = self.rooms.write().await;
            match rooms.get(name) {
                Some(handle) => (handle.clone(), false),
                None => {
                    let room = Room::with_history_limit(name.clone(), created_at, self.history_limit);
                    let handle = Arc::new(Mutex::new(room));
                    rooms.insert(name.clone(), handle.clone());
                    tracing::info!("Room '{}' created", name);
                    (handle, true)
                }
            }
        };

        let password = handle.lock().await.password().cloned();
        EnsuredRoom { created, password }
    }

    async fn get_password(
        &self,
        name: &RoomName,
    ) -> Result<Option<RoomPassword>, RepositoryError> {
        let handle = self.room_handle(name).await?;
        let room = handle.lock().await;
        Ok(room.password().cloned())
    }

    async fn set_password(
        &self,
        name: &RoomName,
        password: RoomPassword,
    ) -> Result<(), RepositoryError> {
        let handle = self.room_handle(name).await?;
        let mut room = handle.lock().await;
        room.bind_password(password)?;
        Ok(())
    }

    async fn append_history(
        &self,
        name: &RoomName,
        message: ChatMessage,
    ) -> Result<usize, RepositoryError> {
        let handle = self.room_handle(name).await?;
        let mut room = handle.lock().await;
        Ok(room.append_message(message))
    }

    async fn get_history(&self, name: &RoomName) -> Result<Vec<ChatMessage>, RepositoryError> {
        let handle = self.room_handle(name).await?;
        let room = handle.lock().await;
        Ok(room.history())
    }

    async fn add_member(&self, name: &RoomName, member: Member) -> Result<(), RepositoryError> {
        let handle = self.room_handle(name).await?;
        let mut room = handle.lock().await;
        room.add_member(member)?;
        Ok(())
    }

    async fn remove_member(
        &self,
        name: &RoomName,
        connection_id: &ConnectionId,
    ) -> Result<Option<Member>, RepositoryError> {
        let handle = self.room_handle(name).await?;
        let mut room = handle.lock().await;
        Ok(room.remove_member(connection_id))
    }

    async fn get_members(&self, name: &RoomName) -> Result<Vec<Member>, RepositoryError> {
        let handle = self.room_handle(name).await?;
        let room = handle.lock().await;
        Ok(room.members.clone())
    }
}
