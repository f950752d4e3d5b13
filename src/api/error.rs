//! API error handling

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{ErrorClass, LedgerError};

/// API result type
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors returned by the HTTP handlers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl ApiError {
    /// Get the HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Ledger(err) => match err.class() {
                ErrorClass::Client => StatusCode::BAD_REQUEST,
                ErrorClass::Server => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    /// Message shown to the caller
    ///
    /// Server-side failures are summarized; their details only go to the log.
    fn public_message(&self) -> String {
        match self {
            Self::Ledger(err) if err.class() == ErrorClass::Server => match err {
                LedgerError::ReconciliationRequired { .. } => {
                    "transfer failed and has been flagged for reconciliation".to_string()
                }
                _ => "internal server error".to_string(),
            },
            other => other.to_string(),
        }
    }
}

/// Error body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = ErrorResponse {
            error: self.public_message(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (LedgerError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (LedgerError::InvalidCredentials, StatusCode::BAD_REQUEST),
            (LedgerError::InvalidDestination, StatusCode::BAD_REQUEST),
            (LedgerError::InsufficientFunds, StatusCode::BAD_REQUEST),
            (LedgerError::DuplicateAccount("1".into()), StatusCode::BAD_REQUEST),
            (LedgerError::Storage("down".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (LedgerError::Conflict("busy".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status_code(), status);
        }
    }

    #[test]
    fn test_storage_details_are_not_exposed() {
        let err = ApiError::from(LedgerError::Storage("connection reset by 10.0.0.3".into()));
        assert_eq!(err.public_message(), "internal server error");
    }
}
