use std::io;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::classify::ClassifyError;
use crate::dispatch::DeliveryError;

/// Custom error type for discord_push_relay operations
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    #[error("No Discord webhook configured for path '{0}'")]
    Unconfigured(String),

    #[error("{0}")]
    Classify(#[from] ClassifyError),

    #[error("Invalid push payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),

    #[error("Failed to deliver notification: {0}")]
    DeliveryFailed(#[from] DeliveryError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

impl RelayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RelayError::Unauthorized => StatusCode::UNAUTHORIZED,
            RelayError::Forbidden => StatusCode::FORBIDDEN,
            RelayError::Unconfigured(_) => StatusCode::NOT_FOUND,
            RelayError::Classify(_) | RelayError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            RelayError::DeliveryFailed(_)
            | RelayError::ConfigError(_)
            | RelayError::IoError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        (self.status_code(), self.to_string()).into_response()
    }
}

/// Helper type for Results that use RelayError
pub type Result<T> = std::result::Result<T, RelayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_error_taxonomy() {
        assert_eq!(RelayError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(RelayError::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            RelayError::Unconfigured("/nope".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            RelayError::Classify(ClassifyError::UnrecognizedRef("HEAD".into())).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            RelayError::DeliveryFailed(DeliveryError::Rejected {
                status: 400,
                body: String::new(),
            })
            .status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn invalid_json_is_a_bad_request() {
        let err: RelayError = serde_json::from_slice::<serde_json::Value>(b"{")
            .unwrap_err()
            .into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }
}
