// src/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

/// Error body returned to HTTP clients: `{"status": "error", "message",
/// "errors"?}`. The `errors` object carries field-level validation detail.
#[derive(Serialize, Debug)]
struct ErrorResponse {
    status: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<serde_json::Value>,
}

/// Application error type.
///
/// Implements `IntoResponse` so handlers can bubble errors with `?` and
/// still produce the standardized JSON envelope.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid request data")]
    RequestValidation(#[from] validator::ValidationErrors),

    #[error("{0}")]
    InvalidRequest(String),

    #[error("Database connection failed: {0}")]
    DatabaseConnection(String),

    #[error("Database operation failed: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON processing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parsing error: {0}")]
    YamlParsing(#[from] serde_yaml::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// HTTP status this error surfaces as. Boundary rejections map to 400;
    /// a failed database connectivity check to 503; everything else is a
    /// generic internal error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::RequestValidation(_) | Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::DatabaseConnection(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Config(_)
            | Self::Database(_)
            | Self::Io(_)
            | Self::Json(_)
            | Self::YamlParsing(_)
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn client_message(&self) -> String {
        match self {
            Self::RequestValidation(_) => "Invalid request data".to_string(),
            Self::InvalidRequest(message) => message.clone(),
            // Internal detail stays in the logs, not in the response body.
            _ => "Internal server error".to_string(),
        }
    }

    fn field_errors(&self) -> Option<serde_json::Value> {
        match self {
            Self::RequestValidation(errors) => serde_json::to_value(errors).ok(),
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, http.status_code = status.as_u16(), "Request failed");
        } else {
            warn!(error = %self, http.status_code = status.as_u16(), "Request rejected");
        }

        let body = ErrorResponse {
            status: "error",
            message: self.client_message(),
            errors: self.field_errors(),
        };
        (status, Json(body)).into_response()
    }
}

/// Result type alias for the application.
pub type Result<T, E = AppError> = std::result::Result<T, E>;
