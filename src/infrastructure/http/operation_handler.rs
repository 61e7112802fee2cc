use super::api_client::LunchApiClient;
use crate::application::ports::SyncOperationHandler;
use crate::domain::entities::SyncQueueEntry;
use crate::domain::value_objects::SyncOperationType;
use crate::shared::config::OperationRoute;
use crate::shared::error::AppError;
use async_trait::async_trait;

/// Sends a queued envelope's payload as-is to a fixed endpoint.
pub struct HttpOperationHandler {
    op_type: SyncOperationType,
    path: String,
    client: LunchApiClient,
}

impl HttpOperationHandler {
    pub fn new(
        op_type: SyncOperationType,
        path: impl Into<String>,
        client: LunchApiClient,
    ) -> Self {
        Self {
            op_type,
            path: path.into(),
            client,
        }
    }

    pub fn from_route(route: &OperationRoute, client: LunchApiClient) -> Result<Self, AppError> {
        let op_type = SyncOperationType::new(route.op_type.clone())
            .map_err(AppError::ConfigurationError)?;
        Ok(Self::new(op_type, route.path.clone(), client))
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

#[async_trait]
impl SyncOperationHandler for HttpOperationHandler {
    fn operation_type(&self) -> &SyncOperationType {
        &self.op_type
    }

    async fn dispatch(&self, entry: &SyncQueueEntry, token: &str) -> Result<(), AppError> {
        self.client
            .post_json(&self.path, &entry.payload, Some(token))
            .await?;
        Ok(())
    }
}
