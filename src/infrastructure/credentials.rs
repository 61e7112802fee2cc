use crate::application::ports::{CredentialProvider, KeyValueStore};
use crate::shared::error::AppError;
use async_trait::async_trait;
use std::sync::Arc;

const TOKEN_KEY: &str = "auth_token";
const REFRESH_KEY: &str = "refresh_token";

/// ログイン時に受け取ったトークンを kv_store に保持する
pub struct StoredCredentials {
    store: Arc<dyn KeyValueStore>,
}

impl StoredCredentials {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub async fn save_tokens(
        &self,
        access_token: &str,
        refresh_token: &str,
    ) -> Result<(), AppError> {
        if access_token.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Access token cannot be empty".to_string(),
            ));
        }
        self.store.put(TOKEN_KEY, access_token).await?;
        self.store.put(REFRESH_KEY, refresh_token).await?;
        Ok(())
    }

    pub async fn refresh_token(&self) -> Result<Option<String>, AppError> {
        self.store.get(REFRESH_KEY).await
    }

    pub async fn clear(&self) -> Result<(), AppError> {
        self.store.delete(TOKEN_KEY).await?;
        self.store.delete(REFRESH_KEY).await?;
        Ok(())
    }
}

#[async_trait]
impl CredentialProvider for StoredCredentials {
    async fn access_token(&self) -> Result<Option<String>, AppError> {
        let token = self.store.get(TOKEN_KEY).await?;
        Ok(token.filter(|value| !value.trim().is_empty()))
    }
}
