use crate::application::ports::{
    ConnectivityStatus, CredentialProvider, OrderGateway, OrderStore, SyncOperationHandler,
    SyncQueueStore,
};
use crate::domain::entities::{
    Order, SkipReason, SyncPass, SyncQueueDraft, SyncQueueEntry, SyncReport,
};
use crate::domain::value_objects::{OrderStatus, SyncOperationType};
use crate::shared::error::AppError;
use chrono::Utc;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Flushes locally stored writes to the server.
///
/// At most one pass runs at a time per manager. The busy flag is claimed before the
/// first await and released by a guard, so a pass that panics or is cancelled never
/// leaves it set.
pub struct SyncManager {
    orders: Arc<dyn OrderStore>,
    queue: Arc<dyn SyncQueueStore>,
    gateway: Arc<dyn OrderGateway>,
    credentials: Arc<dyn CredentialProvider>,
    connectivity: Arc<dyn ConnectivityStatus>,
    handlers: HashMap<SyncOperationType, Arc<dyn SyncOperationHandler>>,
    max_attempts: Option<u32>,
    in_flight: AtomicBool,
}

struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl SyncManager {
    pub fn new(
        orders: Arc<dyn OrderStore>,
        queue: Arc<dyn SyncQueueStore>,
        gateway: Arc<dyn OrderGateway>,
        credentials: Arc<dyn CredentialProvider>,
        connectivity: Arc<dyn ConnectivityStatus>,
    ) -> Self {
        Self {
            orders,
            queue,
            gateway,
            credentials,
            connectivity,
            handlers: HashMap::new(),
            max_attempts: None,
            in_flight: AtomicBool::new(false),
        }
    }

    /// `None` keeps failing orders pending forever.
    pub fn with_max_attempts(mut self, max_attempts: Option<u32>) -> Self {
        self.max_attempts = max_attempts.filter(|max| *max > 0);
        self
    }

    pub fn register_handler(mut self, handler: Arc<dyn SyncOperationHandler>) -> Self {
        self.handlers.insert(handler.operation_type().clone(), handler);
        self
    }

    pub fn is_syncing(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// 結果を待たずにバックグラウンドで1回同期する
    pub fn trigger(self: &Arc<Self>) {
        let manager = Arc::clone(self);
        tokio::spawn(async move {
            manager.sync_pending_orders().await;
        });
    }

    /// Stores an operation for later delivery and kicks a pass when online.
    pub async fn enqueue_operation(
        self: &Arc<Self>,
        op_type: SyncOperationType,
        payload: Value,
    ) -> Result<SyncQueueEntry, AppError> {
        let entry = self
            .queue
            .enqueue(SyncQueueDraft::new(op_type, payload))
            .await?;
        tracing::info!(
            target: "lunch::sync",
            op_type = %entry.op_type,
            id = %entry.id,
            "operation queued"
        );

        if !self.handlers.contains_key(&entry.op_type) {
            tracing::warn!(
                target: "lunch::sync",
                op_type = %entry.op_type,
                "no handler registered; operation stays queued"
            );
        }
        if self.connectivity.is_online() {
            self.trigger();
        }
        Ok(entry)
    }

    pub async fn sync_pending_orders(&self) -> SyncPass {
        let Some(_guard) = self.try_claim() else {
            tracing::debug!(target: "lunch::sync", "sync already in progress; skipping");
            return SyncPass::Skipped {
                reason: SkipReason::AlreadySyncing,
            };
        };

        if !self.connectivity.is_online() {
            tracing::debug!(target: "lunch::sync", "offline; skipping sync");
            return SyncPass::Skipped {
                reason: SkipReason::Offline,
            };
        }

        let pending = match self.orders.list_by_status(OrderStatus::Pending).await {
            Ok(orders) => orders,
            Err(err) => return abort("failed to list pending orders", err),
        };
        let operations = match self.queue.pending_operations().await {
            Ok(entries) => entries,
            Err(err) => return abort("failed to list queued operations", err),
        };

        if pending.is_empty() && operations.is_empty() {
            return SyncPass::Completed {
                report: SyncReport::default(),
            };
        }

        // トークンはパスごとに1回だけ読む
        let token = match self.credentials.access_token().await {
            Ok(Some(token)) => token,
            Ok(None) => {
                tracing::warn!(
                    target: "lunch::sync",
                    pending = pending.len(),
                    "no stored credential; skipping sync"
                );
                return SyncPass::Skipped {
                    reason: SkipReason::MissingCredential,
                };
            }
            Err(err) => return abort("failed to read credential", err),
        };

        tracing::info!(
            target: "lunch::sync",
            orders = pending.len(),
            operations = operations.len(),
            "sync pass started"
        );

        let mut report = SyncReport::default();
        for order in &pending {
            self.sync_order(order, &token, &mut report).await;
        }
        for entry in &operations {
            self.dispatch_operation(entry, &token, &mut report).await;
        }

        tracing::info!(
            target: "lunch::sync",
            synced = report.orders_synced,
            failed = report.orders_failed,
            marked_failed = report.orders_marked_failed,
            operations_dispatched = report.operations_dispatched,
            operations_failed = report.operations_failed,
            "sync pass finished"
        );
        SyncPass::Completed { report }
    }

    fn try_claim(&self) -> Option<InFlightGuard<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlightGuard(&self.in_flight))
    }

    async fn sync_order(&self, order: &Order, token: &str, report: &mut SyncReport) {
        report.orders_attempted += 1;

        match self.gateway.submit_order(order, token).await {
            Ok(()) => match self.orders.mark_synced(order.id, Utc::now()).await {
                Ok(true) => {
                    report.orders_synced += 1;
                    tracing::info!(
                        target: "lunch::sync",
                        temp_id = %order.temp_id,
                        "order synced"
                    );
                }
                Ok(false) => {
                    report.orders_synced += 1;
                    tracing::debug!(
                        target: "lunch::sync",
                        temp_id = %order.temp_id,
                        "order accepted but no longer pending locally"
                    );
                }
                Err(err) => {
                    // サーバーは受理済み。次回の再送は tempId で重複排除される。
                    report.orders_failed += 1;
                    tracing::error!(
                        target: "lunch::sync",
                        temp_id = %order.temp_id,
                        error = %err,
                        "order accepted but local status update failed"
                    );
                }
            },
            Err(err) => {
                report.orders_failed += 1;
                let attempt = order.sync_attempts.saturating_add(1);
                let terminal = self.max_attempts.is_some_and(|max| attempt >= max);
                tracing::warn!(
                    target: "lunch::sync",
                    temp_id = %order.temp_id,
                    attempt,
                    error = %err,
                    "order sync failed"
                );

                match self
                    .orders
                    .record_sync_failure(order.id, &err.to_string(), terminal)
                    .await
                {
                    Ok(()) if terminal => {
                        report.orders_marked_failed += 1;
                        tracing::warn!(
                            target: "lunch::sync",
                            temp_id = %order.temp_id,
                            attempt,
                            "order moved to failed after reaching retry limit"
                        );
                    }
                    Ok(()) => {}
                    Err(store_err) => {
                        tracing::error!(
                            target: "lunch::sync",
                            temp_id = %order.temp_id,
                            error = %store_err,
                            "failed to record sync failure"
                        );
                    }
                }
            }
        }
    }

    async fn dispatch_operation(
        &self,
        entry: &SyncQueueEntry,
        token: &str,
        report: &mut SyncReport,
    ) {
        let Some(handler) = self.handlers.get(&entry.op_type) else {
            tracing::debug!(
                target: "lunch::sync",
                op_type = %entry.op_type,
                id = %entry.id,
                "no handler registered; leaving operation queued"
            );
            return;
        };

        match handler.dispatch(entry, token).await {
            Ok(()) => match self.queue.remove_operation(entry.id).await {
                Ok(()) => {
                    report.operations_dispatched += 1;
                    tracing::info!(
                        target: "lunch::sync",
                        op_type = %entry.op_type,
                        id = %entry.id,
                        "operation delivered"
                    );
                }
                Err(err) => {
                    report.operations_failed += 1;
                    tracing::error!(
                        target: "lunch::sync",
                        op_type = %entry.op_type,
                        id = %entry.id,
                        error = %err,
                        "operation delivered but could not be removed from the queue"
                    );
                }
            },
            Err(err) => {
                report.operations_failed += 1;
                tracing::warn!(
                    target: "lunch::sync",
                    op_type = %entry.op_type,
                    id = %entry.id,
                    error = %err,
                    "operation delivery failed"
                );
            }
        }
    }
}

fn abort(context: &str, err: AppError) -> SyncPass {
    tracing::error!(target: "lunch::sync", error = %err, "{context}; aborting sync pass");
    SyncPass::Aborted {
        reason: format!("{context}: {err}"),
    }
}
