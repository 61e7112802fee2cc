use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    AlreadySyncing,
    Offline,
    MissingCredential,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SyncReport {
    pub orders_attempted: u32,
    pub orders_synced: u32,
    pub orders_failed: u32,
    /// 上限到達で `failed` に移した件数
    pub orders_marked_failed: u32,
    pub operations_dispatched: u32,
    pub operations_failed: u32,
}

impl SyncReport {
    pub fn is_empty(&self) -> bool {
        self.orders_attempted == 0 && self.operations_dispatched == 0 && self.operations_failed == 0
    }
}

/// Result of one flush pass. A pass never fails as a whole.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SyncPass {
    Skipped { reason: SkipReason },
    Completed { report: SyncReport },
    Aborted { reason: String },
}

impl SyncPass {
    pub fn report(&self) -> Option<&SyncReport> {
        match self {
            SyncPass::Completed { report } => Some(report),
            _ => None,
        }
    }

    pub fn skip_reason(&self) -> Option<SkipReason> {
        match self {
            SyncPass::Skipped { reason } => Some(*reason),
            _ => None,
        }
    }
}
