use crate::domain::entities::PersistedQueryCache;
use crate::shared::error::AppError;
use async_trait::async_trait;

#[async_trait]
pub trait QueryCachePersister: Send + Sync {
    async fn persist(&self, snapshot: &PersistedQueryCache) -> Result<(), AppError>;
    /// `None` when nothing is stored or the stored blob is expired or busted.
    async fn restore(&self) -> Result<Option<PersistedQueryCache>, AppError>;
    async fn remove(&self) -> Result<(), AppError>;
}
