use crate::domain::entities::{Menu, Order, SyncQueueEntry};
use crate::domain::value_objects::SyncOperationType;
use crate::shared::error::AppError;
use async_trait::async_trait;

#[async_trait]
pub trait OrderGateway: Send + Sync {
    /// `Ok` only for a 2xx response.
    async fn submit_order(&self, order: &Order, token: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait MenuGateway: Send + Sync {
    async fn fetch_menu(&self) -> Result<Menu, AppError>;
}

/// 同期キューの操作を種別ごとにリモートへ送るハンドラ
#[async_trait]
pub trait SyncOperationHandler: Send + Sync {
    fn operation_type(&self) -> &SyncOperationType;
    async fn dispatch(&self, entry: &SyncQueueEntry, token: &str) -> Result<(), AppError>;
}
