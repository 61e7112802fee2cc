use super::sync_manager::SyncManager;
use crate::application::ports::{ConnectivityStatus, OrderStore};
use crate::domain::entities::{NewOrder, Order, OrderDraft};
use crate::domain::value_objects::{OrderStatus, TempId};
use crate::shared::error::AppError;
use chrono::Utc;
use std::sync::Arc;

pub struct OrderService {
    orders: Arc<dyn OrderStore>,
    connectivity: Arc<dyn ConnectivityStatus>,
    sync: Arc<SyncManager>,
}

impl OrderService {
    pub fn new(
        orders: Arc<dyn OrderStore>,
        connectivity: Arc<dyn ConnectivityStatus>,
        sync: Arc<SyncManager>,
    ) -> Self {
        Self {
            orders,
            connectivity,
            sync,
        }
    }

    /// 注文をローカルに保存して返す。オンラインなら同期を起動するが結果は待たない。
    pub async fn create_order(&self, draft: OrderDraft) -> Result<Order, AppError> {
        draft.validate().map_err(AppError::ValidationError)?;

        let order = self
            .orders
            .insert_order(NewOrder::pending(draft, Utc::now()))
            .await?;
        tracing::info!(
            target: "lunch::orders",
            temp_id = %order.temp_id,
            total = order.total,
            "order stored locally"
        );

        if self.connectivity.is_online() {
            self.sync.trigger();
        }
        Ok(order)
    }

    pub async fn pending_orders(&self) -> Result<Vec<Order>, AppError> {
        self.orders.list_by_status(OrderStatus::Pending).await
    }

    pub async fn order_by_temp_id(&self, temp_id: &TempId) -> Result<Option<Order>, AppError> {
        self.orders.find_by_temp_id(temp_id).await
    }
}
