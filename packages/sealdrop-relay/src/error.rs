//! Relay error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use sealdrop_core::api::ErrorResponse;
use thiserror::Error;

use crate::store::kv::StoreError;

/// Coarse classification used for status codes and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ValidationError,
    NotFound,
    StorageFailure,
}

/// Failures of a store operation.
#[derive(Debug, Error)]
pub enum SecretError {
    #[error("Encrypted payload is required")]
    PayloadRequired,

    #[error("Invalid payload or payload too large")]
    PayloadTooLarge { length: usize, max: usize },

    #[error("Invalid payload or payload too large")]
    InvalidPayload,

    #[error("Invalid secret ID format")]
    InvalidId,

    #[error("Secret not found or expired")]
    NotFound,

    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl SecretError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SecretError::PayloadRequired
            | SecretError::PayloadTooLarge { .. }
            | SecretError::InvalidPayload
            | SecretError::InvalidId => ErrorKind::ValidationError,
            SecretError::NotFound => ErrorKind::NotFound,
            SecretError::Storage(_) => ErrorKind::StorageFailure,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::ValidationError => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::StorageFailure => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for SecretError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self.kind() {
            ErrorKind::StorageFailure => {
                tracing::error!(error = %self, "Storage failure");
                ErrorResponse {
                    error: "Internal server error".to_string(),
                    details: Some(self.to_string()),
                }
            }
            _ => ErrorResponse {
                error: self.to_string(),
                details: None,
            },
        };
        (status, Json(body)).into_response()
    }
}
