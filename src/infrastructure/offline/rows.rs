use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OrderRow {
    pub id: i64,
    pub temp_id: String,
    pub user_id: String,
    pub items: String,
    pub total: i64,
    pub status: String,
    pub created_at: i64,
    pub synced_at: Option<i64>,
    pub sync_attempts: i64,
    pub last_error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MenuSnapshotRow {
    pub id: String,
    pub data: String,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SyncQueueRow {
    pub id: i64,
    pub op_type: String,
    pub payload: String,
    pub created_at: i64,
}
