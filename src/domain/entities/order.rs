use crate::domain::value_objects::{LocalOrderId, OrderStatus, TempId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: String,
    pub name: String,
    pub price: i64,
    pub quantity: u32,
}

/// 呼び出し側が渡す業務データのみ（ID・ステータス・時刻はサービス側で付与）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OrderDraft {
    pub user_id: String,
    pub items: Vec<OrderItem>,
    pub total: i64,
}

impl OrderDraft {
    pub fn new(user_id: impl Into<String>, items: Vec<OrderItem>, total: i64) -> Self {
        Self {
            user_id: user_id.into(),
            items,
            total,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.user_id.trim().is_empty() {
            return Err("Order user id cannot be empty".to_string());
        }
        if self.items.is_empty() {
            return Err("Order must contain at least one item".to_string());
        }
        if let Some(item) = self.items.iter().find(|item| item.quantity == 0) {
            return Err(format!("Order item {} has zero quantity", item.id));
        }
        if let Some(item) = self.items.iter().find(|item| item.price < 0) {
            return Err(format!("Order item {} has a negative price", item.id));
        }
        if self.total < 0 {
            return Err("Order total cannot be negative".to_string());
        }
        Ok(())
    }
}

/// まだストアに書き込まれていない注文
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub temp_id: TempId,
    pub user_id: String,
    pub items: Vec<OrderItem>,
    pub total: i64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl NewOrder {
    pub fn pending(draft: OrderDraft, created_at: DateTime<Utc>) -> Self {
        let OrderDraft {
            user_id,
            items,
            total,
        } = draft;

        Self {
            temp_id: TempId::generate(),
            user_id,
            items,
            total,
            status: OrderStatus::Pending,
            created_at: truncate_to_millis(created_at),
        }
    }

    pub fn into_order(self, id: LocalOrderId) -> Order {
        Order {
            id,
            temp_id: self.temp_id,
            user_id: self.user_id,
            items: self.items,
            total: self.total,
            status: self.status,
            created_at: self.created_at,
            synced_at: None,
            sync_attempts: 0,
            last_error: None,
        }
    }
}

/// Serialized form is the payload sent to `POST /orders`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: LocalOrderId,
    pub temp_id: TempId,
    pub user_id: String,
    pub items: Vec<OrderItem>,
    pub total: i64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synced_at: Option<DateTime<Utc>>,
    #[serde(skip)]
    pub sync_attempts: u32,
    #[serde(skip)]
    pub last_error: Option<String>,
}

impl Order {
    pub fn is_pending(&self) -> bool {
        self.status == OrderStatus::Pending
    }
}

fn truncate_to_millis(value: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(value.timestamp_millis()).unwrap_or(value)
}
