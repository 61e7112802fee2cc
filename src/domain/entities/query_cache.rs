use crate::domain::value_objects::QueryKey;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CachedQuery {
    pub key: QueryKey,
    pub data: Value,
    /// unix ms
    pub updated_at: i64,
    #[serde(default)]
    pub invalidated: bool,
}

/// The whole read cache as one blob; restored all-or-nothing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PersistedQueryCache {
    /// unix ms at which the blob was written
    pub timestamp: i64,
    #[serde(default)]
    pub buster: String,
    pub queries: Vec<CachedQuery>,
}
