//! ルーム単位の直列化ロック
//!
//! join / send / disconnect は「読み取り → 更新 → 配信」の複数ステップからなる。
//! 同じルームに対するこれらのシーケンスをこのロックで直列化し、
//! 異なるルームへの操作は並行に進める。

use std::{collections::HashMap, sync::Arc};

use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::RoomName;

/// ルーム名ごとに 1 つの非同期ロックを保持する
#[derive(Default)]
pub struct RoomLocks {
    locks: Mutex<HashMap<RoomName, Arc<Mutex<()>>>>,
}

impl RoomLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// ルームのロックを取得する。ガードが drop されるまで同じルームの他の操作は待機する
    pub async fn acquire(&self, room: &RoomName) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            locks.entry(room.clone()).or_default().clone()
        };
        lock.lock_owned().await
    }
}
