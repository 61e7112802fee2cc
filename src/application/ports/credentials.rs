use crate::shared::error::AppError;
use async_trait::async_trait;

#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Read fresh on every call; tokens may rotate between flush passes.
    async fn access_token(&self) -> Result<Option<String>, AppError>;
}
