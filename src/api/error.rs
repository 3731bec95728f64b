//! API Error Types
//!
//! Defines error types for the API layer and implements conversion
//! to HTTP responses with appropriate status codes. Error bodies are
//! always the empty JSON object; only the status carries the outcome.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::api::routes::json_response;
use crate::store::{StoreError, ValidationError};

/// API error types
#[derive(Error, Debug)]
pub enum ApiError {
    /// Unknown entity kind, unknown id, or unmatched path shape
    #[error("Not found")]
    NotFound,

    /// Body could not be decoded, failed validation, or clashes with a stored id
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// HTTP method outside GET and POST
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Internal(_) | ApiError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            let request_id = uuid::Uuid::new_v4().to_string();
            tracing::error!(
                request_id = %request_id,
                error_message = %self,
                "API error occurred"
            );
        } else if let ApiError::BadRequest(reason) = &self {
            tracing::debug!("Rejected request: {}", reason);
        }

        json_response(status, EMPTY_OBJECT)
    }
}

/// Body of every POST response and of every error response
pub const EMPTY_OBJECT: &str = "{}";

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;
