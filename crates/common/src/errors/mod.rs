//! Error types for Acervo services
//!
//! Provides a single error type for the library and the gateway with:
//! - Distinct variants for "too vague" queries, bad input, catalog load
//!   failures and generation backend failures
//! - HTTP status code mapping
//! - Structured error responses
//! - Error codes for client handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::context::ServiceError;

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

/// Error codes for machine-readable error identification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Query errors (1xxx)
    ValidationError,
    EmptyQuery,
    InvalidFormat,

    // Resource errors (4xxx)
    NotFound,
    RecordNotFound,

    // Catalog errors (7xxx)
    CatalogLoadError,

    // External service errors (8xxx)
    GenerationError,

    // Internal errors (9xxx)
    InternalError,
    ConfigurationError,
    SerializationError,
}

impl ErrorCode {
    /// Get the numeric code for this error
    pub fn as_code(&self) -> u16 {
        match self {
            ErrorCode::ValidationError => 1001,
            ErrorCode::EmptyQuery => 1002,
            ErrorCode::InvalidFormat => 1003,

            ErrorCode::NotFound => 4001,
            ErrorCode::RecordNotFound => 4002,

            ErrorCode::CatalogLoadError => 7001,

            ErrorCode::GenerationError => 8001,

            ErrorCode::InternalError => 9001,
            ErrorCode::ConfigurationError => 9002,
            ErrorCode::SerializationError => 9003,
        }
    }
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation failed: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    /// Every query word was a stopword or too short. Kept apart from an
    /// empty match list so callers can ask the user to be more specific.
    #[error("Query too vague: no significant terms in {query:?}")]
    EmptyQuery { query: String },

    #[error("Invalid format: {message}")]
    InvalidFormat { message: String },

    #[error("Record not found: {id}")]
    RecordNotFound { id: usize },

    #[error("Failed to load catalog from {path}: {message}")]
    CatalogLoad { path: String, message: String },

    #[error("Generation service error: {0}")]
    Generation(#[from] ServiceError),

    #[error("Internal server error: {message}")]
    Internal { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Get the error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Validation { .. } => ErrorCode::ValidationError,
            AppError::EmptyQuery { .. } => ErrorCode::EmptyQuery,
            AppError::InvalidFormat { .. } => ErrorCode::InvalidFormat,
            AppError::RecordNotFound { .. } => ErrorCode::RecordNotFound,
            AppError::CatalogLoad { .. } => ErrorCode::CatalogLoadError,
            AppError::Generation(_) => ErrorCode::GenerationError,
            AppError::Internal { .. } => ErrorCode::InternalError,
            AppError::Configuration { .. } => ErrorCode::ConfigurationError,
            AppError::Serialization(_) => ErrorCode::SerializationError,
            AppError::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            AppError::Validation { .. } | AppError::InvalidFormat { .. } => {
                StatusCode::BAD_REQUEST
            }

            // 404 Not Found
            AppError::RecordNotFound { .. } => StatusCode::NOT_FOUND,

            // 422 Unprocessable Entity
            AppError::EmptyQuery { .. } => StatusCode::UNPROCESSABLE_ENTITY,

            // 500 Internal Server Error
            AppError::CatalogLoad { .. }
            | AppError::Internal { .. }
            | AppError::Configuration { .. }
            | AppError::Serialization(_)
            | AppError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,

            // 502 Bad Gateway
            AppError::Generation(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Check if this error should be logged at error level
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// Check if this error is a client error
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }
}

/// Structured error response for API
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetails,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();
        let message = self.to_string();

        if self.is_server_error() {
            tracing::error!(
                error = %message,
                code = ?code,
                status = status.as_u16(),
                "Server error"
            );
        } else if self.is_client_error() {
            tracing::warn!(
                error = %message,
                code = ?code,
                status = status.as_u16(),
                "Client error"
            );
        }

        let field = match &self {
            AppError::Validation { field, .. } => field.clone(),
            _ => None,
        };

        let body = ErrorResponse {
            error: ErrorDetails {
                code,
                message,
                field,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Configuration {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_query_is_distinct_client_error() {
        let err = AppError::EmptyQuery {
            query: "o que".into(),
        };
        assert_eq!(err.code(), ErrorCode::EmptyQuery);
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(err.is_client_error());
        assert!(!err.is_server_error());
    }

    #[test]
    fn test_generation_error_maps_to_bad_gateway() {
        let err = AppError::from(ServiceError::QuotaExceeded);
        assert_eq!(err.code(), ErrorCode::GenerationError);
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
        assert!(err.is_server_error());
    }

    #[test]
    fn test_error_code_numbers_are_grouped() {
        assert_eq!(ErrorCode::EmptyQuery.as_code(), 1002);
        assert_eq!(ErrorCode::RecordNotFound.as_code(), 4002);
        assert_eq!(ErrorCode::GenerationError.as_code(), 8001);
    }

    #[test]
    fn test_error_code_wire_format() {
        let json = serde_json::to_string(&ErrorCode::EmptyQuery).unwrap();
        assert_eq!(json, "\"EMPTY_QUERY\"");
    }
}
