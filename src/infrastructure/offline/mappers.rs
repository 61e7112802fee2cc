use super::rows::{MenuSnapshotRow, OrderRow, SyncQueueRow};
use crate::domain::entities::{CachedMenu, Order, OrderItem, SyncQueueEntry};
use crate::domain::value_objects::{
    LocalOrderId, OrderStatus, SyncOperationType, SyncQueueId, TempId,
};
use crate::shared::error::AppError;
use chrono::{DateTime, Utc};

pub fn order_from_row(row: OrderRow) -> Result<Order, AppError> {
    let items: Vec<OrderItem> = serde_json::from_str(&row.items)
        .map_err(|err| AppError::DeserializationError(format!("order items: {err}")))?;

    Ok(Order {
        id: LocalOrderId::new(row.id).map_err(AppError::ValidationError)?,
        temp_id: TempId::new(row.temp_id).map_err(AppError::ValidationError)?,
        user_id: row.user_id,
        items,
        total: row.total,
        status: row
            .status
            .parse::<OrderStatus>()
            .map_err(AppError::DeserializationError)?,
        created_at: millis_to_datetime(row.created_at)?,
        synced_at: row.synced_at.map(millis_to_datetime).transpose()?,
        sync_attempts: row.sync_attempts.max(0) as u32,
        last_error: row.last_error,
    })
}

pub fn cached_menu_from_row(row: MenuSnapshotRow) -> Result<CachedMenu, AppError> {
    Ok(CachedMenu {
        id: row.id,
        data: serde_json::from_str(&row.data)
            .map_err(|err| AppError::DeserializationError(format!("menu snapshot: {err}")))?,
        updated_at: millis_to_datetime(row.updated_at)?,
    })
}

pub fn queue_entry_from_row(row: SyncQueueRow) -> Result<SyncQueueEntry, AppError> {
    Ok(SyncQueueEntry {
        id: SyncQueueId::new(row.id).map_err(AppError::ValidationError)?,
        op_type: SyncOperationType::new(row.op_type).map_err(AppError::ValidationError)?,
        payload: serde_json::from_str(&row.payload)
            .map_err(|err| AppError::DeserializationError(format!("queue payload: {err}")))?,
        created_at: millis_to_datetime(row.created_at)?,
    })
}

fn millis_to_datetime(value: i64) -> Result<DateTime<Utc>, AppError> {
    DateTime::<Utc>::from_timestamp_millis(value)
        .ok_or_else(|| AppError::DeserializationError(format!("Invalid timestamp: {value}")))
}
