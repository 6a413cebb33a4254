//! # Webhook Processing Pipeline
//!
//! Orchestrates one delivery end to end:
//! verify signature → parse → resolve project → resolve recipients →
//! (skip when nobody should be notified) → format → dispatch.

use crate::dispatch::{DispatchResult, Dispatcher};
use crate::format::format_alert;
use crate::project::resolve_project_slug;
use crate::routing::RecipientRouter;
use crate::signature::{SignatureError, SignatureVerifier};
use crate::webhook::{PayloadError, WebhookPayload, WebhookRequest};
use async_trait::async_trait;
use tracing::{info, instrument, warn};

/// Result of a successfully processed delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayOutcome {
    /// No recipients resolved; nothing was sent
    Skipped { project: Option<String> },

    /// The alert was handed to the dispatcher, one result per attempt
    Dispatched {
        project: Option<String>,
        message: String,
        results: Vec<DispatchResult>,
    },
}

impl RelayOutcome {
    /// Results of delivery attempts; empty when skipped
    pub fn results(&self) -> &[DispatchResult] {
        match self {
            Self::Skipped { .. } => &[],
            Self::Dispatched { results, .. } => results,
        }
    }
}

/// Top-level error for webhook processing failures
#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    #[error("Signature validation failed: {0}")]
    InvalidSignature(#[from] SignatureError),

    #[error("Malformed payload: {0}")]
    MalformedPayload(#[from] PayloadError),

    #[error("Internal processing error: {message}")]
    Internal { message: String },
}

/// Main interface for the webhook processing pipeline
#[async_trait]
pub trait WebhookProcessor: Send + Sync {
    /// Process a complete webhook request
    async fn process_webhook(&self, request: WebhookRequest) -> Result<RelayOutcome, WebhookError>;
}

/// Relays Sentry alerts as SMS
#[derive(Debug, Clone)]
pub struct SentryAlertRelay {
    verifier: SignatureVerifier,
    router: RecipientRouter,
    dispatcher: Dispatcher,
}

impl SentryAlertRelay {
    pub fn new(verifier: SignatureVerifier, router: RecipientRouter, dispatcher: Dispatcher) -> Self {
        Self {
            verifier,
            router,
            dispatcher,
        }
    }

    pub fn router(&self) -> &RecipientRouter {
        &self.router
    }
}

#[async_trait]
impl WebhookProcessor for SentryAlertRelay {
    #[instrument(skip(self, request), fields(
        resource = %request.resource(),
        request_id = request.headers.request_id.as_deref().unwrap_or("-"),
    ))]
    async fn process_webhook(&self, request: WebhookRequest) -> Result<RelayOutcome, WebhookError> {
        if let Err(e) = self.verifier.verify(&request.body, request.signature()) {
            warn!(error = %e, "Invalid webhook signature");
            return Err(e.into());
        }

        let payload = WebhookPayload::from_request(&request)?;
        info!(
            resource = %payload.resource,
            action = payload.action().unwrap_or("-"),
            "Received Sentry webhook"
        );

        let project = resolve_project_slug(&payload);
        let recipients = self.router.resolve(project.as_deref());
        if recipients.is_empty() {
            info!(
                project = project.as_deref().unwrap_or("-"),
                "No recipients for project; skipping notification"
            );
            return Ok(RelayOutcome::Skipped { project });
        }

        let message = format_alert(&payload);
        let results = self.dispatcher.dispatch(&message, recipients).await;

        let delivered = results.iter().filter(|r| r.success).count();
        info!(
            project = project.as_deref().unwrap_or("-"),
            attempted = results.len(),
            delivered,
            "Notification dispatched"
        );

        Ok(RelayOutcome::Dispatched {
            project,
            message,
            results,
        })
    }
}

#[cfg(test)]
#[path = "processor_tests.rs"]
mod tests;
