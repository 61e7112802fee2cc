use super::sync_manager::SyncManager;
use crate::application::ports::ConnectivityStatus;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Runs a pass at startup when already online, then on every offline -> online transition.
pub fn spawn_sync_on_reconnect(
    connectivity: Arc<dyn ConnectivityStatus>,
    manager: Arc<SyncManager>,
) -> JoinHandle<()> {
    let mut rx = connectivity.subscribe();

    tokio::spawn(async move {
        let mut was_online = *rx.borrow_and_update();
        if was_online {
            tracing::info!(target: "lunch::trigger", "online at startup; syncing");
            manager.trigger();
        }

        while rx.changed().await.is_ok() {
            let online = *rx.borrow_and_update();
            if online && !was_online {
                tracing::info!(target: "lunch::trigger", "connection restored; syncing");
                manager.trigger();
            } else if !online && was_online {
                tracing::info!(
                    target: "lunch::trigger",
                    "connection lost; queueing writes locally"
                );
            }
            was_online = online;
        }

        tracing::debug!(target: "lunch::trigger", "connectivity signal closed; trigger stopped");
    })
}
