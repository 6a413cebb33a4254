//! Response types for the API.

use sentry_sms_core::{DispatchResult, Timestamp};
use serde::{Deserialize, Serialize};

/// Message returned when at least one delivery was attempted
pub const SENT_MESSAGE: &str = "Notification sent";

/// Message returned when no recipients were resolved
pub const SKIPPED_MESSAGE: &str = "No recipients configured for project; notification skipped";

/// Webhook processing response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookResponse {
    pub success: bool,
    pub message: String,

    /// Per-recipient outcomes; absent when the notification was skipped
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<DispatchResult>>,
}

impl WebhookResponse {
    /// Delivery was attempted; individual failures live in `results`
    pub fn sent(results: Vec<DispatchResult>) -> Self {
        Self {
            success: true,
            message: SENT_MESSAGE.to_string(),
            results: Some(results),
        }
    }

    pub fn skipped() -> Self {
        Self {
            success: true,
            message: SKIPPED_MESSAGE.to_string(),
            results: None,
        }
    }
}

/// Health check response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,

    /// RFC 3339 UTC timestamp with millisecond precision
    pub timestamp: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Timestamp::now().to_rfc3339(),
        }
    }
}
