//! services/api/src/error.rs
//!
//! Defines the primary error type for the entire API service, and how it is
//! rendered into the uniform failure envelope.

use crate::config::ConfigError;
use crate::web::response::ErrorEnvelope;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use catalog_core::{CatalogError, PortError};
use tracing::error;

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents a failure reported by the product store.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Represents an error that propagated up from one of the adapters.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// The request could not be decoded (e.g. malformed multipart body).
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The request body exceeded the transport limit before it could be decoded.
    #[error("Request body too large: {0}")]
    BodyTooLarge(String),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Catalog(CatalogError::Validation(_)) => {
                (StatusCode::BAD_REQUEST, "validation_error")
            }
            ApiError::Catalog(CatalogError::NotFound(_)) => (StatusCode::NOT_FOUND, "not_found"),
            ApiError::Catalog(CatalogError::UnsupportedMediaType(_)) => {
                (StatusCode::UNSUPPORTED_MEDIA_TYPE, "unsupported_media_type")
            }
            ApiError::Catalog(CatalogError::PayloadTooLarge { .. }) | ApiError::BodyTooLarge(_) => {
                (StatusCode::PAYLOAD_TOO_LARGE, "payload_too_large")
            }
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            ApiError::Catalog(CatalogError::Storage(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "storage_error")
            }
            ApiError::Config(_) | ApiError::Port(_) | ApiError::Io(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let message = if status.is_server_error() {
            error!(error = %self, "request failed");
            "An internal error occurred".to_string()
        } else {
            self.to_string()
        };
        (status, Json(ErrorEnvelope::new(code, message))).into_response()
    }
}
