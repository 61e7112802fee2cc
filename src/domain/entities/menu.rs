use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fixed key of the single cached menu snapshot.
pub const CURRENT_MENU_KEY: &str = "current-menu";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BaseEntity {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProteinOption {
    pub id: String,
    pub protein_type_id: String,
    pub protein_type: BaseEntity,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SideOption {
    pub id: String,
    pub side_dish_id: String,
    pub side_dish: BaseEntity,
}

/// `GET /menu` のレスポンス。サーバー側の形をそのまま受け取る。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Menu {
    pub id: String,
    pub date: String,
    #[serde(default)]
    pub day_of_week: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub soup: Option<BaseEntity>,
    #[serde(default)]
    pub drink: Option<BaseEntity>,
    #[serde(default)]
    pub default_protein_type: Option<BaseEntity>,
    #[serde(default)]
    pub protein_options: Vec<ProteinOption>,
    #[serde(default)]
    pub side_options: Vec<SideOption>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CachedMenu {
    pub id: String,
    pub data: Menu,
    pub updated_at: DateTime<Utc>,
}
