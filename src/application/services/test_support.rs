use crate::application::ports::{
    CredentialProvider, MenuGateway, OrderGateway, OrderStore, SyncOperationHandler,
};
use crate::domain::entities::{
    Menu, NewOrder, Order, OrderDraft, OrderItem, SyncQueueEntry,
};
use crate::domain::value_objects::{SyncOperationType, TempId};
use crate::infrastructure::connectivity::ConnectivityMonitor;
use crate::infrastructure::database::ConnectionPool;
use crate::infrastructure::offline::SqliteLocalStore;
use crate::shared::error::AppError;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::VecDeque;
use std::future::Future;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Notify;

pub async fn memory_store() -> Arc<SqliteLocalStore> {
    let pool = ConnectionPool::from_memory().await.unwrap();
    pool.migrate().await.unwrap();
    Arc::new(SqliteLocalStore::new(pool.get_pool().clone()))
}

pub fn draft(user_id: &str) -> OrderDraft {
    OrderDraft::new(
        user_id,
        vec![OrderItem {
            id: "x".into(),
            name: "Almuerzo".into(),
            price: 15000,
            quantity: 1,
        }],
        15000,
    )
}

pub async fn seed_order(store: &SqliteLocalStore, user_id: &str) -> Order {
    store
        .insert_order(NewOrder::pending(draft(user_id), Utc::now()))
        .await
        .unwrap()
}

pub fn sample_menu(id: &str) -> Menu {
    serde_json::from_value(serde_json::json!({"id": id, "date": "2025-06-02"})).unwrap()
}

/// 条件が満たされるまで待つ（最大5秒）
pub async fn eventually<F, Fut>(mut condition: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while !condition().await {
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition not met within 5s"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

pub fn monitor(online: bool) -> Arc<ConnectivityMonitor> {
    Arc::new(ConnectivityMonitor::new(online))
}

/// POST /orders の代役。呼び出しを記録し、指定ユーザーの注文だけ失敗させる。
#[derive(Default)]
pub struct RecordingGateway {
    pub calls: Mutex<Vec<(TempId, String)>>,
    pub failing_users: Mutex<Vec<String>>,
    pub block: AtomicBool,
    pub entered: Notify,
    pub release: Notify,
    pub panic_next: AtomicBool,
}

impl RecordingGateway {
    pub fn failing_for(users: &[&str]) -> Self {
        let gateway = Self::default();
        *gateway.failing_users.lock().unwrap() = users.iter().map(|u| u.to_string()).collect();
        gateway
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn tokens(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, token)| token.clone())
            .collect()
    }
}

#[async_trait]
impl OrderGateway for RecordingGateway {
    async fn submit_order(&self, order: &Order, token: &str) -> Result<(), AppError> {
        if self.panic_next.swap(false, Ordering::SeqCst) {
            panic!("gateway exploded");
        }
        if self.block.load(Ordering::SeqCst) {
            self.entered.notify_one();
            self.release.notified().await;
        }
        self.calls
            .lock()
            .unwrap()
            .push((order.temp_id.clone(), token.to_string()));

        let fail = self
            .failing_users
            .lock()
            .unwrap()
            .iter()
            .any(|user| user == &order.user_id);
        if fail {
            return Err(AppError::Http {
                status: 500,
                message: "Internal Server Error".into(),
            });
        }
        Ok(())
    }
}

pub struct MockCredentials {
    token: Mutex<Option<String>>,
    pub reads: AtomicUsize,
}

impl MockCredentials {
    pub fn with_token(token: Option<&str>) -> Self {
        Self {
            token: Mutex::new(token.map(str::to_string)),
            reads: AtomicUsize::new(0),
        }
    }

    pub fn rotate(&self, token: Option<&str>) {
        *self.token.lock().unwrap() = token.map(str::to_string);
    }
}

#[async_trait]
impl CredentialProvider for MockCredentials {
    async fn access_token(&self) -> Result<Option<String>, AppError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.token.lock().unwrap().clone())
    }
}

pub struct MockOperationHandler {
    op_type: SyncOperationType,
    pub fail: AtomicBool,
    pub dispatched: Mutex<Vec<SyncQueueEntry>>,
}

impl MockOperationHandler {
    pub fn new(op_type: &str) -> Self {
        Self {
            op_type: SyncOperationType::new(op_type.to_string()).unwrap(),
            fail: AtomicBool::new(false),
            dispatched: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl SyncOperationHandler for MockOperationHandler {
    fn operation_type(&self) -> &SyncOperationType {
        &self.op_type
    }

    async fn dispatch(&self, entry: &SyncQueueEntry, _token: &str) -> Result<(), AppError> {
        self.dispatched.lock().unwrap().push(entry.clone());
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::Network("connection reset".into()));
        }
        Ok(())
    }
}

/// GET /menu の代役。応答を順番に返し、尽きたらネットワークエラー。
#[derive(Default)]
pub struct ScriptedMenuGateway {
    responses: Mutex<VecDeque<Result<Menu, AppError>>>,
    pub calls: AtomicUsize,
}

impl ScriptedMenuGateway {
    pub fn new(responses: Vec<Result<Menu, AppError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl MenuGateway for ScriptedMenuGateway {
    async fn fetch_menu(&self) -> Result<Menu, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AppError::Network("no scripted response".into())))
    }
}
