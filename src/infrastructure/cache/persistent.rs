use super::query_cache::QueryCache;
use crate::application::ports::QueryCachePersister;
use crate::domain::entities::PersistedQueryCache;
use crate::domain::value_objects::QueryKey;
use crate::shared::error::AppError;
use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;

/// QueryCache whose every mutation rewrites the persisted bundle.
#[derive(Clone)]
pub struct PersistentQueryCache {
    cache: QueryCache,
    persister: Arc<dyn QueryCachePersister>,
    buster: String,
}

impl PersistentQueryCache {
    pub fn new(
        cache: QueryCache,
        persister: Arc<dyn QueryCachePersister>,
        buster: impl Into<String>,
    ) -> Self {
        Self {
            cache,
            persister,
            buster: buster.into(),
        }
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    /// 起動時に一度呼ぶ。戻り値は復元したクエリ数。
    pub async fn restore(&self) -> Result<usize, AppError> {
        match self.persister.restore().await? {
            Some(snapshot) => {
                let restored = self.cache.hydrate(snapshot.queries).await;
                tracing::debug!(target: "lunch::cache", restored, "query cache restored");
                Ok(restored)
            }
            None => Ok(0),
        }
    }

    pub async fn get(&self, key: &QueryKey) -> Option<Value> {
        self.cache.get(key).await
    }

    pub async fn get_fresh(&self, key: &QueryKey) -> Option<Value> {
        self.cache.get_fresh(key).await
    }

    pub async fn set(&self, key: QueryKey, data: Value) -> Result<(), AppError> {
        self.cache.set(key, data).await;
        self.persist().await
    }

    pub async fn invalidate(&self, prefix: &QueryKey) -> Result<usize, AppError> {
        let count = self.cache.invalidate(prefix).await;
        if count > 0 {
            self.persist().await?;
        }
        Ok(count)
    }

    pub async fn remove(&self, key: &QueryKey) -> Result<bool, AppError> {
        let removed = self.cache.remove(key).await;
        if removed {
            self.persist().await?;
        }
        Ok(removed)
    }

    pub async fn clear(&self) -> Result<(), AppError> {
        self.cache.clear().await;
        self.persist().await
    }

    /// ログアウト時：メモリと永続化の両方を消す
    pub async fn clear_persisted(&self) -> Result<(), AppError> {
        self.cache.clear().await;
        self.persister.remove().await
    }

    async fn persist(&self) -> Result<(), AppError> {
        let snapshot = PersistedQueryCache {
            timestamp: Utc::now().timestamp_millis(),
            buster: self.buster.clone(),
            queries: self.cache.dehydrate().await,
        };
        self.persister.persist(&snapshot).await
    }
}
