//! Error types for the HTTP service

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use sentry_sms_core::{RouteTableError, WebhookError};
use tracing::{error, warn};

/// Webhook handler errors with HTTP status code mapping
///
/// - `401 Unauthorized`: the signature header is missing or does not match
/// - `400 Bad Request`: the body is not a JSON object
/// - `500 Internal Server Error`: anything else; the detail is logged
///   server-side and a generic message is returned
#[derive(Debug, thiserror::Error)]
pub enum WebhookHandlerError {
    /// Webhook processing pipeline failure
    #[error("Processing failed: {0}")]
    ProcessingFailed(#[from] WebhookError),

    /// Unexpected failure outside the pipeline, such as a handler panic
    #[error("Internal server error: {message}")]
    InternalError { message: String },
}

impl WebhookHandlerError {
    /// Status code this error is reported with
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::ProcessingFailed(WebhookError::InvalidSignature(_)) => StatusCode::UNAUTHORIZED,
            Self::ProcessingFailed(WebhookError::MalformedPayload(_)) => StatusCode::BAD_REQUEST,
            Self::ProcessingFailed(WebhookError::Internal { .. }) | Self::InternalError { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Client-facing message; never carries internal detail
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::ProcessingFailed(WebhookError::InvalidSignature(_)) => "Invalid signature",
            Self::ProcessingFailed(WebhookError::MalformedPayload(_)) => "Invalid JSON payload",
            Self::ProcessingFailed(WebhookError::Internal { .. }) | Self::InternalError { .. } => {
                "Failed to process webhook"
            }
        }
    }
}

impl IntoResponse for WebhookHandlerError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            error!(error = %self, "Error processing webhook");
        } else {
            warn!(error = %self, status = %status, "Rejected webhook");
        }

        let body = serde_json::json!({ "error": self.public_message() });
        (status, Json(body)).into_response()
    }
}

/// Service-level errors
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Failed to bind to address {address}: {message}")]
    BindFailed { address: String, message: String },

    #[error("Server failed: {message}")]
    ServerFailed { message: String },

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),
}

impl ServiceError {
    /// Process exit code for this failure
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::BindFailed { .. } => 1,
            Self::ServerFailed { .. } => 2,
            Self::Configuration(_) => 3,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Configuration loading failed: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid project route table: {0}")]
    RouteTable(#[from] RouteTableError),
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;
