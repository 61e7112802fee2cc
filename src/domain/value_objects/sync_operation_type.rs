use serde::{Deserialize, Serialize};
use std::fmt;

const MAX_LENGTH: usize = 64;

/// 同期キューに積む操作の種別（例: `reservation.create`）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SyncOperationType(String);

impl SyncOperationType {
    pub fn new(value: String) -> Result<Self, String> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err("Sync operation type cannot be empty".to_string());
        }
        if trimmed.len() > MAX_LENGTH {
            return Err(format!(
                "Sync operation type must be at most {MAX_LENGTH} characters"
            ));
        }
        if !trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        {
            return Err(format!("Invalid sync operation type: {trimmed}"));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SyncOperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
