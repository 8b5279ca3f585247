//! Arcana API — error types.

use arcana_core::error::DomainError;
use arcana_reading::ReadingError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// Startup and runtime errors for the API server.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required environment variable is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// Network binding or I/O error.
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

/// JSON body returned for error responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub error: &'static str,
    /// Human-readable error message.
    pub message: String,
}

/// HTTP-layer wrapper around the domain and reading error taxonomies.
#[derive(Debug)]
pub enum ApiError {
    /// A session/domain failure.
    Domain(DomainError),
    /// A submission/poll failure.
    Reading(ReadingError),
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self::Domain(err)
    }
}

impl From<ReadingError> for ApiError {
    fn from(err: ReadingError) -> Self {
        Self::Reading(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            Self::Domain(err) => {
                let (status, code) = match &err {
                    DomainError::SessionNotFound(_) => (StatusCode::NOT_FOUND, "session_not_found"),
                    DomainError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
                    DomainError::Infrastructure(_) => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "infrastructure_error")
                    }
                };
                (status, code, err.to_string())
            }
            Self::Reading(err) => {
                let (status, code) = match &err {
                    ReadingError::UnknownCard(_) => (StatusCode::BAD_REQUEST, "unknown_card"),
                    ReadingError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
                    ReadingError::InsufficientEnergy(_) => {
                        (StatusCode::PAYMENT_REQUIRED, "insufficient_energy")
                    }
                    ReadingError::InvalidSession(_) => {
                        (StatusCode::UNAUTHORIZED, "invalid_session")
                    }
                    ReadingError::Server(_) => (StatusCode::BAD_GATEWAY, "reading_failed"),
                    ReadingError::Transport(_) => (StatusCode::BAD_GATEWAY, "network_error"),
                    // Recoverable: the reading id is kept and a retry
                    // resumes polling, so this is not a failure status.
                    ReadingError::StillPreparing => (StatusCode::ACCEPTED, "still_preparing"),
                    ReadingError::Infrastructure(_) => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "infrastructure_error")
                    }
                };
                (status, code, err.to_string())
            }
        };

        let body = ErrorBody {
            error: error_code,
            message,
        };

        (status, Json(body)).into_response()
    }
}
