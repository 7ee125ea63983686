use actix_web::{error, http::StatusCode, HttpRequest, HttpResponse, ResponseError};
use thiserror::Error;

use crate::core::ValidationError;
use crate::models::ErrorResponse;
use crate::services::PostgresError;

/// Errors returned by HTTP handlers, rendered as [`ErrorResponse`] JSON
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidThesis(#[from] ValidationError),

    #[error("{0}")]
    InvalidRequest(String),

    #[error("batch of {size} candidates exceeds the limit of {max}")]
    BatchTooLarge { size: usize, max: usize },

    #[error("{0}")]
    NotFound(String),

    #[error("persistence is not configured")]
    PersistenceUnavailable,

    #[error("{0}")]
    Storage(#[from] PostgresError),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    fn kind(&self) -> &'static str {
        match self {
            ApiError::InvalidThesis(_) => "invalid_thesis",
            ApiError::InvalidRequest(_) => "invalid_request",
            ApiError::BatchTooLarge { .. } => "batch_too_large",
            ApiError::NotFound(_) => "not_found",
            ApiError::PersistenceUnavailable => "persistence_unavailable",
            ApiError::Storage(_) => "storage_error",
            ApiError::Internal(_) => "internal_error",
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidThesis(_) | ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::BatchTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::PersistenceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Storage(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        HttpResponse::build(status).json(ErrorResponse {
            error: self.kind().to_string(),
            message: self.to_string(),
            status_code: status.as_u16(),
        })
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::InvalidRequest(errors.to_string())
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    ApiError::InvalidRequest(format!("Invalid JSON: {}", err)).into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    ApiError::InvalidRequest(format!("Invalid query: {}", err)).into()
}
