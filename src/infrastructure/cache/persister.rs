use crate::application::ports::{KeyValueStore, QueryCachePersister};
use crate::domain::entities::PersistedQueryCache;
use crate::shared::config::CacheConfig;
use crate::shared::error::AppError;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::sync::Arc;

/// Stores the whole query cache as one JSON blob under a fixed kv_store key.
pub struct KeyValueCachePersister {
    store: Arc<dyn KeyValueStore>,
    key: String,
    max_age: Duration,
    buster: String,
}

impl KeyValueCachePersister {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        key: impl Into<String>,
        max_age: Duration,
        buster: impl Into<String>,
    ) -> Self {
        Self {
            store,
            key: key.into(),
            max_age,
            buster: buster.into(),
        }
    }

    pub fn from_config(store: Arc<dyn KeyValueStore>, config: &CacheConfig) -> Self {
        Self::new(
            store,
            config.storage_key.clone(),
            config.max_age(),
            config.buster.clone(),
        )
    }

    pub fn buster(&self) -> &str {
        &self.buster
    }
}

#[async_trait]
impl QueryCachePersister for KeyValueCachePersister {
    async fn persist(&self, snapshot: &PersistedQueryCache) -> Result<(), AppError> {
        let json = serde_json::to_string(snapshot)?;
        self.store.put(&self.key, &json).await
    }

    async fn restore(&self) -> Result<Option<PersistedQueryCache>, AppError> {
        let Some(raw) = self.store.get(&self.key).await? else {
            return Ok(None);
        };

        let snapshot: PersistedQueryCache = match serde_json::from_str(&raw) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                tracing::warn!(
                    target: "lunch::cache",
                    error = %err,
                    "discarding unreadable query cache"
                );
                self.store.delete(&self.key).await?;
                return Ok(None);
            }
        };

        let age = Utc::now().timestamp_millis() - snapshot.timestamp;
        if age > self.max_age.num_milliseconds() {
            tracing::debug!(target: "lunch::cache", age_ms = age, "query cache expired");
            self.store.delete(&self.key).await?;
            return Ok(None);
        }
        if snapshot.buster != self.buster {
            tracing::debug!(
                target: "lunch::cache",
                stored = %snapshot.buster,
                expected = %self.buster,
                "query cache busted"
            );
            self.store.delete(&self.key).await?;
            return Ok(None);
        }

        Ok(Some(snapshot))
    }

    async fn remove(&self) -> Result<(), AppError> {
        self.store.delete(&self.key).await
    }
}
