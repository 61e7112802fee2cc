use crate::domain::entities::CachedQuery;
use crate::domain::value_objects::QueryKey;
use crate::shared::config::CacheConfig;
use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone)]
struct CacheEntry {
    data: Value,
    updated_at: DateTime<Utc>,
    invalidated: bool,
}

/// 読み取り結果のメモリキャッシュ
#[derive(Clone)]
pub struct QueryCache {
    entries: Arc<RwLock<HashMap<QueryKey, CacheEntry>>>,
    stale_time: Duration,
    gc_time: Duration,
}

impl QueryCache {
    pub fn new(stale_time: Duration, gc_time: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            stale_time,
            gc_time,
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.stale_time(), config.gc_time())
    }

    /// 古くても返す（オフライン表示用）
    pub async fn get(&self, key: &QueryKey) -> Option<Value> {
        let entries = self.entries.read().await;
        entries.get(key).map(|entry| entry.data.clone())
    }

    /// stale_time 以内かつ無効化されていないデータのみ
    pub async fn get_fresh(&self, key: &QueryKey) -> Option<Value> {
        let entries = self.entries.read().await;
        let now = Utc::now();
        entries
            .get(key)
            .filter(|entry| !self.entry_is_stale(entry, now))
            .map(|entry| entry.data.clone())
    }

    pub async fn is_stale(&self, key: &QueryKey) -> bool {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .is_none_or(|entry| self.entry_is_stale(entry, Utc::now()))
    }

    pub async fn set(&self, key: QueryKey, data: Value) {
        let mut entries = self.entries.write().await;
        entries.insert(
            key,
            CacheEntry {
                data,
                updated_at: Utc::now(),
                invalidated: false,
            },
        );
    }

    /// Marks every entry under `prefix` stale. Returns how many were touched.
    pub async fn invalidate(&self, prefix: &QueryKey) -> usize {
        let mut entries = self.entries.write().await;
        let mut count = 0;
        for (key, entry) in entries.iter_mut() {
            if key.starts_with(prefix) {
                entry.invalidated = true;
                count += 1;
            }
        }
        count
    }

    pub async fn remove(&self, key: &QueryKey) -> bool {
        let mut entries = self.entries.write().await;
        entries.remove(key).is_some()
    }

    pub async fn clear(&self) {
        let mut entries = self.entries.write().await;
        entries.clear();
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// gc_time を過ぎたエントリを捨てる
    pub async fn collect_garbage(&self) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        let cutoff = Utc::now() - self.gc_time;
        entries.retain(|_, entry| entry.updated_at > cutoff);
        before - entries.len()
    }

    pub async fn dehydrate(&self) -> Vec<CachedQuery> {
        let entries = self.entries.read().await;
        let mut queries: Vec<CachedQuery> = entries
            .iter()
            .map(|(key, entry)| CachedQuery {
                key: key.clone(),
                data: entry.data.clone(),
                updated_at: entry.updated_at.timestamp_millis(),
                invalidated: entry.invalidated,
            })
            .collect();
        queries.sort_by(|a, b| a.key.cmp(&b.key));
        queries
    }

    /// 保存済みのクエリを読み込む。gc_time を過ぎたものは捨てる。
    pub async fn hydrate(&self, queries: Vec<CachedQuery>) -> usize {
        let cutoff = Utc::now() - self.gc_time;
        let mut entries = self.entries.write().await;
        let mut restored = 0;
        for query in queries {
            let Some(updated_at) = DateTime::<Utc>::from_timestamp_millis(query.updated_at) else {
                continue;
            };
            if updated_at <= cutoff {
                continue;
            }
            entries.insert(
                query.key,
                CacheEntry {
                    data: query.data,
                    updated_at,
                    invalidated: query.invalidated,
                },
            );
            restored += 1;
        }
        restored
    }

    fn entry_is_stale(&self, entry: &CacheEntry, now: DateTime<Utc>) -> bool {
        entry.invalidated || now - entry.updated_at >= self.stale_time
    }
}
