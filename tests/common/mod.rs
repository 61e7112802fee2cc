#![allow(dead_code)]

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use lunch_offline::AppConfig;
use serde_json::{Value, json};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub authorization: Option<String>,
    pub body: Value,
}

/// Stand-in for the lunch API.
#[derive(Default)]
pub struct MockApi {
    pub orders: Mutex<Vec<RecordedRequest>>,
    pub reservations: Mutex<Vec<RecordedRequest>>,
    pub failing_users: Mutex<HashSet<String>>,
    pub menu_fails: AtomicBool,
    pub menu: Mutex<Value>,
}

impl MockApi {
    pub fn new() -> Arc<Self> {
        let api = Self::default();
        *api.menu.lock().unwrap() = json!({
            "id": "m1",
            "date": "2025-06-02",
            "dayOfWeek": "MONDAY",
            "soup": {"id": "s1", "name": "Ajiaco"},
            "proteinOptions": [
                {"id": "p1", "proteinTypeId": "pt1", "proteinType": {"id": "pt1", "name": "Pollo"}}
            ],
            "sideOptions": []
        });
        Arc::new(api)
    }

    pub fn fail_orders_for(&self, user_id: &str) {
        self.failing_users
            .lock()
            .unwrap()
            .insert(user_id.to_string());
    }

    pub fn set_menu_failing(&self, failing: bool) {
        self.menu_fails.store(failing, Ordering::SeqCst);
    }

    pub fn order_count(&self) -> usize {
        self.orders.lock().unwrap().len()
    }

    pub fn posted_temp_ids(&self) -> Vec<String> {
        self.orders
            .lock()
            .unwrap()
            .iter()
            .filter_map(|req| req.body["tempId"].as_str().map(str::to_string))
            .collect()
    }
}

fn authorization(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

async fn create_order(
    State(api): State<Arc<MockApi>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let user_id = body["userId"].as_str().unwrap_or_default().to_string();
    let temp_id = body["tempId"].clone();
    api.orders.lock().unwrap().push(RecordedRequest {
        authorization: authorization(&headers),
        body,
    });

    if api.failing_users.lock().unwrap().contains(&user_id) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "order rejected").into_response();
    }
    (StatusCode::CREATED, Json(json!({"id": "srv-1", "tempId": temp_id}))).into_response()
}

async fn current_menu(State(api): State<Arc<MockApi>>) -> Response {
    if api.menu_fails.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "menu unavailable").into_response();
    }
    Json(api.menu.lock().unwrap().clone()).into_response()
}

async fn create_reservation(
    State(api): State<Arc<MockApi>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> StatusCode {
    api.reservations.lock().unwrap().push(RecordedRequest {
        authorization: authorization(&headers),
        body,
    });
    StatusCode::CREATED
}

async fn issue_token(Json(body): Json<Value>) -> Response {
    if body["password"] != "secret" {
        return (StatusCode::UNAUTHORIZED, "invalid credentials").into_response();
    }
    Json(json!({
        "access_token": "access-1",
        "refresh_token": "refresh-1",
        "expires_in": 3600,
        "token_type": "bearer",
        "user": {"id": "u1", "email": body["email"]}
    }))
    .into_response()
}

pub async fn spawn_mock_api(api: Arc<MockApi>) -> String {
    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/orders", post(create_order))
        .route("/menu", get(current_menu))
        .route("/reservations", post(create_reservation))
        .route("/auth/token", post(issue_token))
        .with_state(api);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// An address nothing listens on.
pub async fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

pub fn test_config(dir: &tempfile::TempDir, api_url: &str) -> AppConfig {
    let mut config = AppConfig::default();
    config.database.url = format!("sqlite://{}", dir.path().join("offline.db").display());
    config.api.base_url = api_url.to_string();
    config.api.request_timeout = 2;
    config.connectivity.probe_interval = 1;
    config.connectivity.probe_timeout = 1;
    config
}

pub async fn eventually<F, Fut>(mut condition: F)
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while !condition().await {
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition not met within 5s"
        );
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}
