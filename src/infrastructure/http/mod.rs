pub mod api_client;
pub mod error;
pub mod operation_handler;

pub use api_client::{AuthTokens, LunchApiClient};
pub use error::ApiError;
pub use operation_handler::HttpOperationHandler;
