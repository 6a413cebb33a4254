//! # SMS Dispatch
//!
//! Sends one formatted alert to every resolved recipient.
//!
//! Attempts are sequential and independent: a failure for one number is
//! recorded and the loop moves on to the next. There are no retries; a single
//! failed attempt is final for that recipient.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// Error message reported when no SMS provider credentials are configured
pub const UNCONFIGURED_MESSAGE: &str = "SMS provider is not configured";

/// Provider-assigned identifier of an accepted message
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageSid(String);

impl MessageSid {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageSid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Failures reported by an [`SmsSender`]
#[derive(Debug, Clone, thiserror::Error)]
pub enum SmsError {
    #[error("SMS provider is not configured")]
    Unconfigured,

    #[error("SMS provider rejected the message (HTTP {status}): {message}")]
    Rejected {
        status: u16,
        code: Option<u64>,
        message: String,
    },

    #[error("SMS provider request failed: {message}")]
    Transport { message: String },

    #[error("SMS provider returned an unreadable response: {message}")]
    InvalidResponse { message: String },
}

/// Capability to deliver a single SMS
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SmsSender: Send + Sync {
    /// Send `body` to the number `to`, returning the provider's message id
    async fn send(&self, body: &str, to: &str) -> Result<MessageSid, SmsError>;
}

/// Outcome of one delivery attempt
///
/// Serialized as `{to, success, sid}` on success and `{to, success, error}`
/// on failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchResult {
    pub to: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DispatchResult {
    pub fn delivered(to: impl Into<String>, sid: &MessageSid) -> Self {
        Self {
            to: to.into(),
            success: true,
            sid: Some(sid.to_string()),
            error: None,
        }
    }

    pub fn failed(to: impl Into<String>, error: impl fmt::Display) -> Self {
        Self {
            to: to.into(),
            success: false,
            sid: None,
            error: Some(error.to_string()),
        }
    }
}

/// Sends alerts through an optional [`SmsSender`]
#[derive(Clone, Default)]
pub struct Dispatcher {
    sender: Option<Arc<dyn SmsSender>>,
}

impl Dispatcher {
    pub fn new(sender: Option<Arc<dyn SmsSender>>) -> Self {
        Self { sender }
    }

    /// Dispatcher with no provider; every dispatch reports a configuration failure
    pub fn unconfigured() -> Self {
        Self::default()
    }

    pub fn is_configured(&self) -> bool {
        self.sender.is_some()
    }

    /// Send `message` to each recipient in order and collect one result per
    /// attempt.
    ///
    /// Without a configured sender a single failure result is returned
    /// immediately and no delivery is attempted. Its `to` field lists the
    /// recipients that were skipped.
    #[instrument(skip(self, message, recipients), fields(recipients = recipients.len()))]
    pub async fn dispatch(&self, message: &str, recipients: &[String]) -> Vec<DispatchResult> {
        let Some(sender) = self.sender.as_ref() else {
            warn!("SMS provider is not configured; dropping notification");
            return vec![DispatchResult::failed(
                recipients.join(","),
                SmsError::Unconfigured,
            )];
        };

        let mut results = Vec::with_capacity(recipients.len());
        for to in recipients {
            match sender.send(message, to).await {
                Ok(sid) => {
                    info!(to = %to, sid = %sid, "SMS sent");
                    results.push(DispatchResult::delivered(to.as_str(), &sid));
                }
                Err(e) => {
                    error!(to = %to, error = %e, "Failed to send SMS");
                    results.push(DispatchResult::failed(to.as_str(), &e));
                }
            }
        }

        results
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("configured", &self.is_configured())
            .finish()
    }
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
