//! ID 生成ファクトリ

use uuid::Uuid;

use super::ConnectionId;

/// ConnectionId の生成を担当
pub struct ConnectionIdFactory;

impl ConnectionIdFactory {
    /// UUID v4 で新しい ConnectionId を生成
    pub fn generate() -> ConnectionId {
        ConnectionId::new(Uuid::new_v4())
    }
}
