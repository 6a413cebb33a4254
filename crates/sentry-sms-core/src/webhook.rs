//! # Webhook Request Model
//!
//! Raw request data received from Sentry's integration platform and the parsed
//! payload shapes the relay understands.
//!
//! Sentry tags every delivery with a `Sentry-Hook-Resource` header naming the
//! payload shape. The relay recognises three of them and treats everything
//! else as an opaque notification.

use crate::Timestamp;
use bytes::Bytes;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;

/// Header carrying the payload shape (`issue`, `event_alert`, `metric_alert`, ...)
pub const RESOURCE_HEADER: &str = "sentry-hook-resource";

/// Header carrying the hex HMAC-SHA256 digest of the body
pub const SIGNATURE_HEADER: &str = "sentry-hook-signature";

/// Header carrying Sentry's delivery identifier
pub const REQUEST_ID_HEADER: &str = "request-id";

/// Header carrying the unix time Sentry sent the delivery
pub const TIMESTAMP_HEADER: &str = "sentry-hook-timestamp";

// ============================================================================
// Resource Type
// ============================================================================

/// Payload shape announced by the `Sentry-Hook-Resource` header
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResourceType {
    Issue,
    EventAlert,
    MetricAlert,
    Other(String),
}

impl ResourceType {
    /// Parse the header value. Unknown values are preserved verbatim.
    pub fn parse(value: &str) -> Self {
        match value {
            "issue" => Self::Issue,
            "event_alert" => Self::EventAlert,
            "metric_alert" => Self::MetricAlert,
            other => Self::Other(other.to_string()),
        }
    }

    /// Wire representation of the resource type
    pub fn as_str(&self) -> &str {
        match self {
            Self::Issue => "issue",
            Self::EventAlert => "event_alert",
            Self::MetricAlert => "metric_alert",
            Self::Other(value) => value,
        }
    }
}

impl Default for ResourceType {
    fn default() -> Self {
        Self::Other("unknown".to_string())
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Request Types
// ============================================================================

/// Sentry-specific HTTP headers consumed by the relay
#[derive(Debug, Clone, Default)]
pub struct WebhookHeaders {
    pub resource: ResourceType,            // Sentry-Hook-Resource
    pub signature: Option<String>,         // Sentry-Hook-Signature
    pub request_id: Option<String>,        // Request-ID
    pub hook_timestamp: Option<String>,    // Sentry-Hook-Timestamp
}

impl WebhookHeaders {
    /// Parse headers from an HTTP header map with lowercase keys.
    ///
    /// Never fails: a missing resource header yields [`ResourceType::default`],
    /// and the signature is only checked later against the configured secret.
    pub fn from_http_headers(headers: &HashMap<String, String>) -> Self {
        let resource = headers
            .get(RESOURCE_HEADER)
            .filter(|v| !v.is_empty())
            .map(|v| ResourceType::parse(v))
            .unwrap_or_default();

        Self {
            resource,
            signature: headers.get(SIGNATURE_HEADER).cloned(),
            request_id: headers.get(REQUEST_ID_HEADER).cloned(),
            hook_timestamp: headers.get(TIMESTAMP_HEADER).cloned(),
        }
    }
}

/// Raw HTTP request data from a Sentry webhook delivery
#[derive(Debug, Clone)]
pub struct WebhookRequest {
    pub headers: WebhookHeaders,
    pub body: Bytes,
    pub received_at: Timestamp,
}

impl WebhookRequest {
    /// Create new webhook request
    pub fn new(headers: WebhookHeaders, body: Bytes) -> Self {
        Self {
            headers,
            body,
            received_at: Timestamp::now(),
        }
    }

    /// Get resource type from headers
    pub fn resource(&self) -> &ResourceType {
        &self.headers.resource
    }

    /// Get signature from headers if present
    pub fn signature(&self) -> Option<&str> {
        self.headers.signature.as_deref()
    }
}

// ============================================================================
// Payload
// ============================================================================

/// Errors raised while turning a request body into a [`WebhookPayload`]
#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    #[error("Body is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Body must be a JSON object")]
    NotAnObject,
}

/// Parsed webhook body together with its resource tag
#[derive(Debug, Clone, PartialEq)]
pub struct WebhookPayload {
    pub resource: ResourceType,
    pub action: Option<String>,
    pub data: Value,
}

impl WebhookPayload {
    /// Build a payload from its parts
    pub fn new(resource: ResourceType, action: Option<String>, data: Value) -> Self {
        Self {
            resource,
            action,
            data,
        }
    }

    /// Parse the JSON body of a delivery.
    ///
    /// `action` is kept when it is a truthy scalar, with numbers and booleans
    /// rendered as text; a missing `data` key becomes `null` so that
    /// formatting can still degrade gracefully.
    pub fn from_body(resource: ResourceType, body: &[u8]) -> Result<Self, PayloadError> {
        let value: Value = serde_json::from_slice(body)?;
        let Value::Object(mut object) = value else {
            return Err(PayloadError::NotAnObject);
        };

        let action = object
            .remove("action")
            .filter(|a| !matches!(a, Value::Array(_) | Value::Object(_)))
            .and_then(|a| text(Some(&a)));
        let data = object.remove("data").unwrap_or(Value::Null);

        Ok(Self::new(resource, action, data))
    }

    /// Parse the payload carried by a request
    pub fn from_request(request: &WebhookRequest) -> Result<Self, PayloadError> {
        Self::from_body(request.resource().clone(), &request.body)
    }

    /// The action, treating an empty string as absent
    pub fn action(&self) -> Option<&str> {
        self.action.as_deref().filter(|a| !a.is_empty())
    }

    /// Classify the payload into the shape the formatter renders.
    ///
    /// First match wins: an `issue` delivery without `data.issue` or an
    /// `event_alert` delivery without `data.event` falls through to
    /// [`Alert::Unrecognized`]. `metric_alert` always matches.
    pub fn alert(&self) -> Alert<'_> {
        let action = self.action();

        match &self.resource {
            ResourceType::Issue => {
                if let Some(issue) = present(self.data.get("issue")) {
                    return Alert::Issue { action, issue };
                }
            }
            ResourceType::EventAlert => {
                if let Some(event) = present(self.data.get("event")) {
                    return Alert::EventAlert {
                        event,
                        triggered_rule: self.data.get("triggered_rule"),
                    };
                }
            }
            ResourceType::MetricAlert => {
                return Alert::MetricAlert {
                    action,
                    data: &self.data,
                    metric_alert: present(self.data.get("metric_alert")),
                };
            }
            ResourceType::Other(_) => {}
        }

        Alert::Unrecognized {
            action,
            data: &self.data,
        }
    }
}

/// A payload viewed through the shape it was classified as
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Alert<'a> {
    /// `issue` resource: `data.issue` with title, project, level, urls
    Issue {
        action: Option<&'a str>,
        issue: &'a Value,
    },
    /// `event_alert` resource: the triggering event and the rule name
    EventAlert {
        event: &'a Value,
        triggered_rule: Option<&'a Value>,
    },
    /// `metric_alert` resource: description fields live directly on `data`
    MetricAlert {
        action: Option<&'a str>,
        data: &'a Value,
        metric_alert: Option<&'a Value>,
    },
    /// Any other resource, or a recognised resource missing its key object
    Unrecognized {
        action: Option<&'a str>,
        data: &'a Value,
    },
}

/// Empty objects are still "present"; only `null` and falsy scalars are not.
fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| is_truthy(v))
}

/// Truthiness of a JSON value as a webhook sender would understand it.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Render a JSON value as display text, treating falsy values as absent.
pub(crate) fn text(value: Option<&Value>) -> Option<String> {
    let value = value.filter(|v| is_truthy(v))?;
    Some(match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    })
}

/// Follow a path of object keys through nested JSON
pub(crate) fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |current, key| current.get(*key))
}

/// Shared empty object used when an optional sub-object is missing
pub(crate) fn empty_object() -> &'static Value {
    static EMPTY: std::sync::OnceLock<Value> = std::sync::OnceLock::new();
    EMPTY.get_or_init(|| Value::Object(Map::new()))
}

#[cfg(test)]
#[path = "webhook_tests.rs"]
mod tests;
