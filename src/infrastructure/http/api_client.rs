use super::error::ApiError;
use crate::application::ports::{CredentialProvider, MenuGateway, OrderGateway};
use crate::domain::entities::{Menu, Order};
use crate::shared::config::ApiConfig;
use crate::shared::error::AppError;
use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

const ORDERS_PATH: &str = "/orders";
const MENU_PATH: &str = "/menu";
const AUTH_TOKEN_PATH: &str = "/auth/token";

/// `POST /auth/token` のレスポンス（必要なフィールドのみ）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub token_type: Option<String>,
}

#[derive(Serialize)]
struct PasswordCredentials<'a> {
    email: &'a str,
    password: &'a str,
}

/// HTTP client for the lunch API. Every request shares one timeout.
#[derive(Clone)]
pub struct LunchApiClient {
    client: Client,
    base_url: String,
    credentials: Option<Arc<dyn CredentialProvider>>,
}

impl LunchApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AppError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|err| AppError::ConfigurationError(err.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials: None,
        })
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self, AppError> {
        Self::new(&config.base_url, config.timeout())
    }

    /// 明示トークンなしのリクエストに保存済みトークンを付与する
    pub fn with_credentials(mut self, credentials: Arc<dyn CredentialProvider>) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn post_json<B>(
        &self,
        path: &str,
        body: &B,
        token: Option<&str>,
    ) -> Result<(), ApiError>
    where
        B: Serialize + ?Sized,
    {
        let builder = self.client.post(self.url(path)).json(body);
        let builder = self.authorize(builder, token).await;
        send(builder).await?;
        Ok(())
    }

    pub async fn get_json<T>(&self, path: &str, token: Option<&str>) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let builder = self.client.get(self.url(path));
        let builder = self.authorize(builder, token).await;
        let response = send(builder).await?;
        response.json::<T>().await.map_err(ApiError::from)
    }

    pub async fn request_token(&self, email: &str, password: &str) -> Result<AuthTokens, AppError> {
        let response = send(
            self.client
                .post(self.url(AUTH_TOKEN_PATH))
                .json(&PasswordCredentials { email, password }),
        )
        .await?;
        let tokens = response.json::<AuthTokens>().await.map_err(ApiError::from)?;
        Ok(tokens)
    }

    async fn authorize(&self, builder: RequestBuilder, token: Option<&str>) -> RequestBuilder {
        if let Some(token) = token {
            return builder.bearer_auth(token);
        }
        let Some(credentials) = self.credentials.as_ref() else {
            return builder;
        };
        match credentials.access_token().await {
            Ok(Some(token)) => builder.bearer_auth(token),
            Ok(None) => builder,
            Err(err) => {
                tracing::warn!(target: "lunch::http", error = %err, "failed to read stored token");
                builder
            }
        }
    }
}

async fn send(builder: RequestBuilder) -> Result<Response, ApiError> {
    let response = builder.send().await?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = if body.trim().is_empty() {
        status.canonical_reason().unwrap_or("request failed").to_string()
    } else {
        body
    };
    Err(ApiError::Status {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl OrderGateway for LunchApiClient {
    async fn submit_order(&self, order: &Order, token: &str) -> Result<(), AppError> {
        self.post_json(ORDERS_PATH, order, Some(token)).await?;
        Ok(())
    }
}

#[async_trait]
impl MenuGateway for LunchApiClient {
    async fn fetch_menu(&self) -> Result<Menu, AppError> {
        let menu = self.get_json::<Menu>(MENU_PATH, None).await?;
        Ok(menu)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{NewOrder, OrderDraft, OrderItem};
    use crate::domain::value_objects::LocalOrderId;
    use axum::extract::State;
    use axum::http::{HeaderMap as AxumHeaders, StatusCode};
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use chrono::Utc;
    use serde_json::{Value, json};
    use std::sync::Mutex;
    use tokio::net::TcpListener;

    type Seen = Arc<Mutex<Vec<(Option<String>, Value)>>>;

    async fn spawn_server(app: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn sample_order() -> Order {
        NewOrder::pending(
            OrderDraft::new(
                "u1",
                vec![OrderItem {
                    id: "x".into(),
                    name: "Almuerzo".into(),
                    price: 15000,
                    quantity: 1,
                }],
                15000,
            ),
            Utc::now(),
        )
        .into_order(LocalOrderId::new(1).unwrap())
    }

    async fn record(
        State(seen): State<Seen>,
        headers: AxumHeaders,
        Json(body): Json<Value>,
    ) -> StatusCode {
        let auth = headers
            .get("authorization")
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        seen.lock().unwrap().push((auth, body));
        StatusCode::CREATED
    }

    #[tokio::test]
    async fn test_submit_order_posts_payload_with_bearer() {
        let seen: Seen = Arc::default();
        let app = Router::new()
            .route("/orders", post(record))
            .with_state(seen.clone());
        let base_url = spawn_server(app).await;

        let client = LunchApiClient::new(&base_url, Duration::from_secs(5)).unwrap();
        let order = sample_order();
        client.submit_order(&order, "T").await.unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0.as_deref(), Some("Bearer T"));
        assert_eq!(seen[0].1["tempId"], order.temp_id.as_str());
        assert_eq!(seen[0].1["userId"], "u1");
    }

    #[tokio::test]
    async fn test_non_success_status_maps_to_http_error() {
        let app = Router::new().route(
            "/orders",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let base_url = spawn_server(app).await;

        let client = LunchApiClient::new(&base_url, Duration::from_secs(5)).unwrap();
        let err = client.submit_order(&sample_order(), "T").await.unwrap_err();
        match err {
            AppError::Http { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "boom");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_slow_server_maps_to_timeout() {
        let app = Router::new().route(
            "/menu",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(2)).await;
                Json(json!({"id": "m1", "date": "2025-06-02"}))
            }),
        );
        let base_url = spawn_server(app).await;

        let client = LunchApiClient::new(&base_url, Duration::from_millis(200)).unwrap();
        let err = client.fetch_menu().await.unwrap_err();
        assert!(matches!(err, AppError::Timeout(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn test_unreachable_server_maps_to_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client =
            LunchApiClient::new(&format!("http://{addr}"), Duration::from_secs(2)).unwrap();
        let err = client.fetch_menu().await.unwrap_err();
        assert!(matches!(err, AppError::Network(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn test_fetch_menu_attaches_stored_token() {
        struct FixedToken;

        #[async_trait]
        impl CredentialProvider for FixedToken {
            async fn access_token(&self) -> Result<Option<String>, AppError> {
                Ok(Some("stored".into()))
            }
        }

        let app = Router::new().route(
            "/menu",
            get(|headers: AxumHeaders| async move {
                let auth = headers
                    .get("authorization")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                Json(json!({"id": auth, "date": "2025-06-02"}))
            }),
        );
        let base_url = spawn_server(app).await;

        let client = LunchApiClient::new(&base_url, Duration::from_secs(5))
            .unwrap()
            .with_credentials(Arc::new(FixedToken));
        let menu = client.fetch_menu().await.unwrap();
        assert_eq!(menu.id, "Bearer stored");
    }

    #[tokio::test]
    async fn test_request_token_parses_auth_response() {
        let app = Router::new().route(
            "/auth/token",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["email"], "ana@example.com");
                Json(json!({
                    "access_token": "a1",
                    "refresh_token": "r1",
                    "expires_in": 3600,
                    "token_type": "bearer",
                    "user": {"id": "u1"}
                }))
            }),
        );
        let base_url = spawn_server(app).await;

        let client = LunchApiClient::new(&format!("{base_url}/"), Duration::from_secs(5)).unwrap();
        let tokens = client
            .request_token("ana@example.com", "secret")
            .await
            .unwrap();
        assert_eq!(tokens.access_token, "a1");
        assert_eq!(tokens.refresh_token, "r1");
        assert_eq!(tokens.expires_in, Some(3600));
    }
}
