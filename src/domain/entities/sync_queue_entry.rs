use crate::domain::value_objects::{SyncOperationType, SyncQueueId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyncQueueDraft {
    pub op_type: SyncOperationType,
    pub payload: Value,
}

impl SyncQueueDraft {
    pub fn new(op_type: SyncOperationType, payload: Value) -> Self {
        Self { op_type, payload }
    }
}

/// 後で送信する任意操作の封筒。消費するのは SyncManager だけ。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyncQueueEntry {
    pub id: SyncQueueId,
    pub op_type: SyncOperationType,
    pub payload: Value,
    pub created_at: DateTime<Utc>,
}
