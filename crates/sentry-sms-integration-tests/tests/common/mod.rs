//! Common test utilities for sentry-sms integration tests
//!
//! This module provides:
//! - A recording [`SmsSender`] fake with per-number failure injection
//! - A [`WebhookProcessor`] stub returning a preset error
//! - Helpers for building app state, routers and signed webhook requests

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use axum::Router;
use sentry_sms_api::{
    build_relay, create_router, AppState, NotificationConfig, ServiceConfig, ServiceMetrics,
    WEBHOOK_PATH,
};
use sentry_sms_core::{
    signature::compute_signature, MessageSid, RelayOutcome, RouteTable, SmsError, SmsSender,
    WebhookError, WebhookProcessor, WebhookRequest,
};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

// ============================================================================
// Recording SMS sender
// ============================================================================

/// A message handed to the fake sender
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub body: String,
    pub to: String,
}

/// Fake SMS provider that records every send
#[derive(Clone, Default)]
#[allow(dead_code)]
pub struct RecordingSmsSender {
    sent: Arc<Mutex<Vec<SentMessage>>>,
    failing_numbers: Arc<Mutex<HashSet<String>>>,
}

impl RecordingSmsSender {
    #[allow(dead_code)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every send to `number` fail with a provider rejection
    #[allow(dead_code)]
    pub fn fail_for(&self, number: &str) {
        self.failing_numbers
            .lock()
            .unwrap()
            .insert(number.to_string());
    }

    #[allow(dead_code)]
    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }

    /// Every send attempt, including the ones that failed
    #[allow(dead_code)]
    pub fn attempted_numbers(&self) -> Vec<String> {
        self.sent.lock().unwrap().iter().map(|m| m.to.clone()).collect()
    }
}

#[async_trait::async_trait]
impl SmsSender for RecordingSmsSender {
    async fn send(&self, body: &str, to: &str) -> Result<MessageSid, SmsError> {
        let attempt = {
            let mut sent = self.sent.lock().unwrap();
            sent.push(SentMessage {
                body: body.to_string(),
                to: to.to_string(),
            });
            sent.len()
        };

        if self.failing_numbers.lock().unwrap().contains(to) {
            return Err(SmsError::Rejected {
                status: 400,
                code: Some(21211),
                message: format!("The 'To' number {} is not a valid phone number.", to),
            });
        }

        Ok(MessageSid::new(format!("SM{:032}", attempt)))
    }
}

// ============================================================================
// Processor stub
// ============================================================================

/// Processor that always fails with an internal error
#[allow(dead_code)]
pub struct FailingProcessor;

#[async_trait::async_trait]
impl WebhookProcessor for FailingProcessor {
    async fn process_webhook(&self, _request: WebhookRequest) -> Result<RelayOutcome, WebhookError> {
        Err(WebhookError::Internal {
            message: "unexpected failure".to_string(),
        })
    }
}

// ============================================================================
// Fixtures
// ============================================================================

/// Build a service configuration with the given routing and secret
#[allow(dead_code)]
pub fn test_config(
    route_table_json: Option<&str>,
    defaults: &[&str],
    secret: Option<&str>,
) -> ServiceConfig {
    let routes = route_table_json
        .map(|raw| RouteTable::parse(raw).expect("test route table must parse"))
        .unwrap_or_default();

    ServiceConfig {
        notifications: NotificationConfig {
            routes,
            default_recipients: defaults.iter().map(|d| d.to_string()).collect(),
        },
        webhook_secret: secret.map(|s| zeroize::Zeroizing::new(s.to_string())),
        ..ServiceConfig::default()
    }
}

/// Build app state around a real relay and the given sender
#[allow(dead_code)]
pub fn create_test_app_state(config: ServiceConfig, sender: Option<Arc<dyn SmsSender>>) -> AppState {
    let relay = build_relay(&config, sender);
    let metrics = ServiceMetrics::new().expect("metrics must initialize");
    AppState::new(config, Arc::new(relay), metrics)
}

/// Build a router around a real relay and the given sender
#[allow(dead_code)]
pub fn create_test_app(config: ServiceConfig, sender: Option<Arc<dyn SmsSender>>) -> Router {
    create_router(create_test_app_state(config, sender))
}

/// Build a webhook request, signing the body when a secret is given
#[allow(dead_code)]
pub fn webhook_request(resource: &str, body: &str, secret: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(WEBHOOK_PATH)
        .header("content-type", "application/json")
        .header("sentry-hook-resource", resource)
        .header("request-id", "0d9f6e5c-5a1a-4a54-9c8e-1f6f3f2f1a00")
        .header("sentry-hook-timestamp", "1700000000");

    if let Some(secret) = secret {
        builder = builder.header(
            "sentry-hook-signature",
            compute_signature(secret, body.as_bytes()),
        );
    }

    builder
        .body(Body::from(body.to_string()))
        .expect("valid request")
}

/// Read a response body as JSON
#[allow(dead_code)]
pub async fn json_body(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("readable body");
    serde_json::from_slice(&bytes).expect("JSON body")
}
