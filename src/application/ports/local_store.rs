use crate::domain::entities::{CachedMenu, Menu, NewOrder, Order, SyncQueueDraft, SyncQueueEntry};
use crate::domain::value_objects::{
    LocalOrderId, OrderStatus, SyncOperationType, SyncQueueId, TempId,
};
use crate::shared::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// 注文コレクション。書き込みは OrderService、状態更新は SyncManager のみが行う。
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn insert_order(&self, order: NewOrder) -> Result<Order, AppError>;
    async fn get_order(&self, id: LocalOrderId) -> Result<Option<Order>, AppError>;
    async fn find_by_temp_id(&self, temp_id: &TempId) -> Result<Option<Order>, AppError>;
    async fn list_by_status(&self, status: OrderStatus) -> Result<Vec<Order>, AppError>;
    /// Returns `false` when the order was not `pending` any more.
    async fn mark_synced(
        &self,
        id: LocalOrderId,
        synced_at: DateTime<Utc>,
    ) -> Result<bool, AppError>;
    async fn record_sync_failure(
        &self,
        id: LocalOrderId,
        error: &str,
        terminal: bool,
    ) -> Result<(), AppError>;
}

#[async_trait]
pub trait MenuSnapshotStore: Send + Sync {
    async fn save_menu(&self, menu: &Menu, updated_at: DateTime<Utc>) -> Result<(), AppError>;
    async fn current_menu(&self) -> Result<Option<CachedMenu>, AppError>;
}

#[async_trait]
pub trait SyncQueueStore: Send + Sync {
    async fn enqueue(&self, draft: SyncQueueDraft) -> Result<SyncQueueEntry, AppError>;
    async fn pending_operations(&self) -> Result<Vec<SyncQueueEntry>, AppError>;
    async fn operations_by_type(
        &self,
        op_type: &SyncOperationType,
    ) -> Result<Vec<SyncQueueEntry>, AppError>;
    async fn remove_operation(&self, id: SyncQueueId) -> Result<(), AppError>;
}

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn put(&self, key: &str, value: &str) -> Result<(), AppError>;
    async fn get(&self, key: &str) -> Result<Option<String>, AppError>;
    async fn delete(&self, key: &str) -> Result<(), AppError>;
}
