use crate::application::ports::ConnectivityStatus;
use crate::application::services::{
    MenuService, OrderService, SyncManager, spawn_sync_on_reconnect,
};
use crate::domain::entities::{Menu, ReservationRequest, SyncQueueEntry};
use crate::domain::value_objects::{QueryKey, SyncOperationType};
use crate::infrastructure::{
    ConnectionPool, ConnectivityMonitor, HttpOperationHandler, KeyValueCachePersister,
    LunchApiClient, PersistentQueryCache, QueryCache, ReachabilityProbe, SqliteLocalStore,
    StoredCredentials,
};
use crate::shared::config::AppConfig;
use crate::shared::error::AppError;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// アプリケーション全体の状態を管理する構造体
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub pool: ConnectionPool,
    pub store: Arc<SqliteLocalStore>,
    pub connectivity: Arc<ConnectivityMonitor>,
    pub probe: Arc<ReachabilityProbe>,
    pub api: LunchApiClient,
    pub credentials: Arc<StoredCredentials>,
    pub sync_manager: Arc<SyncManager>,
    pub order_service: Arc<OrderService>,
    pub menu_service: Arc<MenuService>,
    pub query_cache: PersistentQueryCache,
}

impl AppState {
    pub async fn initialize(config: AppConfig) -> anyhow::Result<Self> {
        config.validate().map_err(AppError::ConfigurationError)?;

        let pool = ConnectionPool::new(
            &config.database.url,
            config.database.max_connections,
            Duration::from_secs(config.database.connection_timeout),
        )
        .await?;
        pool.migrate().await?;
        let store = Arc::new(SqliteLocalStore::new(pool.get_pool().clone()));

        let credentials = Arc::new(StoredCredentials::new(store.clone()));
        let api = LunchApiClient::from_config(&config.api)?.with_credentials(credentials.clone());

        // 起動時の接続状態は推測せず、実際に確認する
        let probe = Arc::new(ReachabilityProbe::from_config(
            &config.api.base_url,
            &config.connectivity,
        )?);
        let connectivity = Arc::new(ConnectivityMonitor::new(probe.probe_once().await));

        let mut sync_manager = SyncManager::new(
            store.clone(),
            store.clone(),
            Arc::new(api.clone()),
            credentials.clone(),
            connectivity.clone(),
        )
        .with_max_attempts(config.sync.max_attempts);
        for route in &config.sync.operation_routes {
            let handler = HttpOperationHandler::from_route(route, api.clone())?;
            sync_manager = sync_manager.register_handler(Arc::new(handler));
        }
        let sync_manager = Arc::new(sync_manager);

        let order_service = Arc::new(OrderService::new(
            store.clone(),
            connectivity.clone(),
            sync_manager.clone(),
        ));
        let menu_service = Arc::new(MenuService::new(
            Arc::new(api.clone()),
            store.clone(),
            connectivity.clone(),
        ));

        let persister = KeyValueCachePersister::from_config(store.clone(), &config.cache);
        let query_cache = PersistentQueryCache::new(
            QueryCache::from_config(&config.cache),
            Arc::new(persister),
            config.cache.buster.clone(),
        );
        if let Err(err) = query_cache.restore().await {
            tracing::warn!(error = %err, "failed to restore query cache");
        }

        tracing::info!(
            api_url = %config.api.base_url,
            online = connectivity.is_online(),
            "offline store initialized"
        );

        Ok(Self {
            config: Arc::new(config),
            pool,
            store,
            connectivity,
            probe,
            api,
            credentials,
            sync_manager,
            order_service,
            menu_service,
            query_cache,
        })
    }

    /// 接続監視と再接続時の同期を起動する
    pub fn start_background_tasks(&self) -> Vec<JoinHandle<()>> {
        let mut handles = vec![self.probe.clone().spawn(self.connectivity.clone())];
        if self.config.sync.auto_sync {
            handles.push(spawn_sync_on_reconnect(
                self.connectivity.clone(),
                self.sync_manager.clone(),
            ));
        } else {
            tracing::info!("auto sync disabled");
        }
        handles
    }

    /// Exchanges email and password for tokens and stores them for the sync manager.
    pub async fn login(&self, email: &str, password: &str) -> Result<(), AppError> {
        if !self.connectivity.is_online() {
            return Err(AppError::Offline);
        }
        let tokens = self.api.request_token(email, password).await?;
        self.credentials
            .save_tokens(&tokens.access_token, &tokens.refresh_token)
            .await?;
        tracing::info!(email, "logged in");
        self.sync_manager.trigger();
        Ok(())
    }

    pub async fn logout(&self) -> Result<(), AppError> {
        self.credentials.clear().await?;
        self.query_cache.clear_persisted().await?;
        tracing::info!("logged out");
        Ok(())
    }

    /// 鮮度内のクエリキャッシュを優先し、なければ MenuService から読んでキャッシュを更新する
    pub async fn current_menu(&self) -> Result<Menu, AppError> {
        let key = QueryKey::new(["menu", "current"]);
        if let Some(data) = self.query_cache.get_fresh(&key).await {
            match serde_json::from_value::<Menu>(data) {
                Ok(menu) => {
                    tracing::debug!(
                        target: "lunch::cache",
                        menu_id = %menu.id,
                        "menu served from query cache"
                    );
                    return Ok(menu);
                }
                Err(err) => {
                    tracing::warn!(
                        target: "lunch::cache",
                        error = %err,
                        "discarding unreadable cached menu"
                    );
                }
            }
        }

        let menu = self.menu_service.current_menu().await?;
        if let Err(err) = self.query_cache.set(key, serde_json::to_value(&menu)?).await {
            tracing::warn!(
                target: "lunch::cache",
                error = %err,
                "failed to persist menu query"
            );
        }
        Ok(menu)
    }

    pub async fn queue_reservation(
        &self,
        request: ReservationRequest,
    ) -> Result<SyncQueueEntry, AppError> {
        request.validate().map_err(AppError::ValidationError)?;
        let op_type = SyncOperationType::new(ReservationRequest::OPERATION_TYPE.to_string())
            .map_err(AppError::Internal)?;
        self.sync_manager
            .enqueue_operation(op_type, serde_json::to_value(&request)?)
            .await
    }

    /// 実行中の同期パスを待ってからプールを閉じる
    pub async fn shutdown(&self) {
        let deadline = tokio::time::Instant::now() + self.config.api.timeout() * 2;
        while self.sync_manager.is_syncing() && tokio::time::Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(25)).await;
        }
        self.pool.close().await;
    }
}
