use serde::{Deserialize, Serialize};
use std::fmt;

/// ローカルストアが採番する注文ID（`tempId` とは別物）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct LocalOrderId(i64);

impl LocalOrderId {
    pub fn new(value: i64) -> Result<Self, String> {
        if value <= 0 {
            return Err("Local order id must be positive".to_string());
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for LocalOrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<LocalOrderId> for i64 {
    fn from(id: LocalOrderId) -> Self {
        id.0
    }
}

impl TryFrom<i64> for LocalOrderId {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
