use crate::shared::error::AppError;
use thiserror::Error;

/// Failure modes of a single request to the lunch API.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("server responded {status}: {message}")]
    Status { status: u16, message: String },

    #[error("unexpected response body: {0}")]
    Decode(String),

    #[error("invalid request: {0}")]
    Request(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout(err.to_string())
        } else if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else if err.is_builder() {
            ApiError::Request(err.to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

impl From<ApiError> for AppError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Timeout(msg) => AppError::Timeout(msg),
            ApiError::Transport(msg) => AppError::Network(msg),
            ApiError::Status { status, message } => AppError::Http { status, message },
            ApiError::Decode(msg) => AppError::DeserializationError(msg),
            ApiError::Request(msg) => AppError::InvalidInput(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_maps_to_http_error() {
        let err: AppError = ApiError::Status {
            status: 503,
            message: "maintenance".into(),
        }
        .into();
        assert!(matches!(err, AppError::Http { status: 503, .. }));
        assert_eq!(err.to_string(), "HTTP 503: maintenance");
    }

    #[test]
    fn test_timeout_and_transport_map_to_distinct_errors() {
        let timeout: AppError = ApiError::Timeout("10s".into()).into();
        let transport: AppError = ApiError::Transport("refused".into()).into();
        assert!(matches!(timeout, AppError::Timeout(_)));
        assert!(matches!(transport, AppError::Network(_)));
        assert_eq!(timeout.to_string(), "Request timed out: 10s");
    }
}
