use crate::application::ports::{ConnectivityStatus, MenuGateway, MenuSnapshotStore};
use crate::domain::entities::{CachedMenu, Menu};
use crate::shared::error::AppError;
use chrono::Utc;
use std::sync::Arc;

/// Read-through access to the current menu with the last snapshot as fallback.
pub struct MenuService {
    gateway: Arc<dyn MenuGateway>,
    snapshots: Arc<dyn MenuSnapshotStore>,
    connectivity: Arc<dyn ConnectivityStatus>,
}

impl MenuService {
    pub fn new(
        gateway: Arc<dyn MenuGateway>,
        snapshots: Arc<dyn MenuSnapshotStore>,
        connectivity: Arc<dyn ConnectivityStatus>,
    ) -> Self {
        Self {
            gateway,
            snapshots,
            connectivity,
        }
    }

    pub async fn current_menu(&self) -> Result<Menu, AppError> {
        match self.fetch().await {
            Ok(menu) => {
                self.snapshots.save_menu(&menu, Utc::now()).await?;
                Ok(menu)
            }
            Err(err) => match self.snapshots.current_menu().await {
                Ok(Some(cached)) => {
                    tracing::warn!(
                        target: "lunch::menu",
                        error = %err,
                        cached_at = %cached.updated_at,
                        "menu fetch failed; serving cached snapshot"
                    );
                    Ok(cached.data)
                }
                Ok(None) => Err(err),
                Err(store_err) => {
                    tracing::warn!(
                        target: "lunch::menu",
                        error = %store_err,
                        "failed to read cached menu"
                    );
                    Err(err)
                }
            },
        }
    }

    // オフライン時はリクエストを送らず、取得失敗として扱う
    async fn fetch(&self) -> Result<Menu, AppError> {
        if !self.connectivity.is_online() {
            return Err(AppError::Offline);
        }
        self.gateway.fetch_menu().await
    }

    pub async fn cached_menu(&self) -> Result<Option<CachedMenu>, AppError> {
        self.snapshots.current_menu().await
    }
}
