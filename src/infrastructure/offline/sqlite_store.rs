use super::mappers::{cached_menu_from_row, order_from_row, queue_entry_from_row};
use super::rows::{MenuSnapshotRow, OrderRow, SyncQueueRow};
use crate::application::ports::{KeyValueStore, MenuSnapshotStore, OrderStore, SyncQueueStore};
use crate::domain::entities::{
    CURRENT_MENU_KEY, CachedMenu, Menu, NewOrder, Order, SyncQueueDraft, SyncQueueEntry,
};
use crate::domain::value_objects::{
    LocalOrderId, OrderStatus, SyncOperationType, SyncQueueId, TempId,
};
use crate::shared::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

/// 注文・メニュー・同期キュー・KV を1つの SQLite ファイルに保持するストア
#[derive(Clone)]
pub struct SqliteLocalStore {
    pool: SqlitePool,
}

impl SqliteLocalStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl OrderStore for SqliteLocalStore {
    async fn insert_order(&self, order: NewOrder) -> Result<Order, AppError> {
        let items = serde_json::to_string(&order.items)?;

        let result = sqlx::query(
            r#"
            INSERT INTO orders (
                temp_id, user_id, items, total, status, created_at, sync_attempts
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0)
            "#,
        )
        .bind(order.temp_id.as_str())
        .bind(&order.user_id)
        .bind(&items)
        .bind(order.total)
        .bind(order.status.as_str())
        .bind(order.created_at.timestamp_millis())
        .execute(&self.pool)
        .await?;

        let id = LocalOrderId::new(result.last_insert_rowid()).map_err(AppError::Database)?;
        Ok(order.into_order(id))
    }

    async fn get_order(&self, id: LocalOrderId) -> Result<Option<Order>, AppError> {
        let row = sqlx::query_as::<_, OrderRow>("SELECT * FROM orders WHERE id = ?1")
            .bind(id.value())
            .fetch_optional(&self.pool)
            .await?;

        row.map(order_from_row).transpose()
    }

    async fn find_by_temp_id(&self, temp_id: &TempId) -> Result<Option<Order>, AppError> {
        let row = sqlx::query_as::<_, OrderRow>("SELECT * FROM orders WHERE temp_id = ?1")
            .bind(temp_id.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.map(order_from_row).transpose()
    }

    async fn list_by_status(&self, status: OrderStatus) -> Result<Vec<Order>, AppError> {
        let rows = sqlx::query_as::<_, OrderRow>("SELECT * FROM orders WHERE status = ?1")
            .bind(status.as_str())
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(order_from_row).collect()
    }

    async fn mark_synced(
        &self,
        id: LocalOrderId,
        synced_at: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        // pending からの遷移のみ許可
        let result = sqlx::query(
            r#"
            UPDATE orders
            SET status = ?1, synced_at = ?2, last_error = NULL
            WHERE id = ?3 AND status = ?4
            "#,
        )
        .bind(OrderStatus::Synced.as_str())
        .bind(synced_at.timestamp_millis())
        .bind(id.value())
        .bind(OrderStatus::Pending.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn record_sync_failure(
        &self,
        id: LocalOrderId,
        error: &str,
        terminal: bool,
    ) -> Result<(), AppError> {
        let next_status = if terminal {
            OrderStatus::Failed
        } else {
            OrderStatus::Pending
        };

        sqlx::query(
            r#"
            UPDATE orders
            SET sync_attempts = sync_attempts + 1, last_error = ?1, status = ?2
            WHERE id = ?3 AND status = ?4
            "#,
        )
        .bind(error)
        .bind(next_status.as_str())
        .bind(id.value())
        .bind(OrderStatus::Pending.as_str())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl MenuSnapshotStore for SqliteLocalStore {
    async fn save_menu(&self, menu: &Menu, updated_at: DateTime<Utc>) -> Result<(), AppError> {
        let data = serde_json::to_string(menu)?;

        sqlx::query(
            r#"
            INSERT INTO menu_snapshots (id, data, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(id) DO UPDATE SET
                data = excluded.data,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(CURRENT_MENU_KEY)
        .bind(&data)
        .bind(updated_at.timestamp_millis())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn current_menu(&self) -> Result<Option<CachedMenu>, AppError> {
        let row =
            sqlx::query_as::<_, MenuSnapshotRow>("SELECT * FROM menu_snapshots WHERE id = ?1")
                .bind(CURRENT_MENU_KEY)
                .fetch_optional(&self.pool)
                .await?;

        row.map(cached_menu_from_row).transpose()
    }
}

#[async_trait]
impl SyncQueueStore for SqliteLocalStore {
    async fn enqueue(&self, draft: SyncQueueDraft) -> Result<SyncQueueEntry, AppError> {
        let payload = serde_json::to_string(&draft.payload)?;
        let now = Utc::now();
        let created_at =
            DateTime::<Utc>::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now);

        let result = sqlx::query(
            r#"
            INSERT INTO sync_queue (op_type, payload, created_at)
            VALUES (?1, ?2, ?3)
            "#,
        )
        .bind(draft.op_type.as_str())
        .bind(&payload)
        .bind(created_at.timestamp_millis())
        .execute(&self.pool)
        .await?;

        Ok(SyncQueueEntry {
            id: SyncQueueId::new(result.last_insert_rowid()).map_err(AppError::Database)?,
            op_type: draft.op_type,
            payload: draft.payload,
            created_at,
        })
    }

    async fn pending_operations(&self) -> Result<Vec<SyncQueueEntry>, AppError> {
        let rows = sqlx::query_as::<_, SyncQueueRow>("SELECT * FROM sync_queue ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(queue_entry_from_row).collect()
    }

    async fn operations_by_type(
        &self,
        op_type: &SyncOperationType,
    ) -> Result<Vec<SyncQueueEntry>, AppError> {
        let rows = sqlx::query_as::<_, SyncQueueRow>(
            "SELECT * FROM sync_queue WHERE op_type = ?1 ORDER BY id ASC",
        )
        .bind(op_type.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(queue_entry_from_row).collect()
    }

    async fn remove_operation(&self, id: SyncQueueId) -> Result<(), AppError> {
        sqlx::query("DELETE FROM sync_queue WHERE id = ?1")
            .bind(id.value())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for SqliteLocalStore {
    async fn put(&self, key: &str, value: &str) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO kv_store (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now().timestamp_millis())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        let value = sqlx::query_scalar::<_, String>("SELECT value FROM kv_store WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(value)
    }

    async fn delete(&self, key: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM kv_store WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
