//! # Sentry-SMS Core
//!
//! Core business logic for the Sentry-SMS webhook relay.
//!
//! This crate contains the domain logic for receiving Sentry integration
//! webhooks, verifying their signatures, turning them into short human-readable
//! alerts, and relaying those alerts as SMS messages to the recipients
//! configured for the affected project.
//!
//! ## Architecture
//!
//! The pipeline is a straight line with no shared mutable state:
//!
//! 1. [`signature`] checks the `Sentry-Hook-Signature` header against the raw body
//! 2. [`webhook`] parses the body and classifies it into an [`webhook::Alert`]
//! 3. [`project`] extracts the project slug the alert belongs to
//! 4. [`routing`] maps the slug onto a recipient list
//! 5. [`format`] renders the alert text
//! 6. [`dispatch`] sends the text to every recipient through an [`dispatch::SmsSender`]
//!
//! [`processor::SentryAlertRelay`] wires these together behind the
//! [`processor::WebhookProcessor`] trait consumed by the HTTP layer.
//!
//! ## Usage
//!
//! ```rust
//! use sentry_sms_core::routing::{RecipientRouter, RouteTable};
//!
//! let table = RouteTable::parse(r#"{"Backend": ["+15550001"]}"#).unwrap();
//! let router = RecipientRouter::new(table, vec!["+15559999".to_string()]);
//!
//! assert_eq!(router.resolve(Some("backend")), ["+15550001".to_string()]);
//! assert!(router.resolve(Some("frontend")).is_empty());
//! ```

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod adapters;
pub mod dispatch;
pub mod format;
pub mod processor;
pub mod project;
pub mod routing;
pub mod signature;
pub mod webhook;

pub use dispatch::{DispatchResult, Dispatcher, MessageSid, SmsError, SmsSender};
pub use processor::{RelayOutcome, SentryAlertRelay, WebhookError, WebhookProcessor};
pub use routing::{RecipientRouter, RouteTable, RouteTableError};
pub use signature::{SignatureError, SignatureVerifier};
pub use webhook::{Alert, ResourceType, WebhookHeaders, WebhookPayload, WebhookRequest};

// ============================================================================
// Shared Types
// ============================================================================

/// UTC timestamp used for request bookkeeping and health responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Create timestamp for current moment
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Convert to an RFC 3339 string with millisecond precision and a `Z` suffix
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// Get underlying DateTime
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(value: DateTime<Utc>) -> Self {
        Self(value)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_rfc3339())
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
