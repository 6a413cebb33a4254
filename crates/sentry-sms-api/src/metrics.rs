//! Prometheus metrics for the relay.
//!
//! Metrics live on a registry owned by [`ServiceMetrics`] rather than the
//! process-global default registry, so several router instances (one per test,
//! for example) can coexist in one process.

use prometheus::{
    Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry,
    TextEncoder,
};
use sentry_sms_core::{DispatchResult, ResourceType};
use std::sync::Arc;

/// Service metrics for observability
#[derive(Debug)]
pub struct ServiceMetrics {
    registry: Registry,

    // HTTP request metrics
    pub http_requests_total: IntCounterVec,
    pub http_request_duration: HistogramVec,

    // Webhook processing metrics
    pub webhooks_received_total: IntCounterVec,
    pub signature_failures_total: IntCounter,
    pub webhooks_skipped_total: IntCounter,
    pub webhook_duration_seconds: Histogram,

    // Delivery metrics
    pub sms_dispatch_total: IntCounterVec,
}

impl ServiceMetrics {
    pub fn new() -> Result<Arc<Self>, prometheus::Error> {
        let registry = Registry::new();

        let http_requests_total = IntCounterVec::new(
            Opts::new("http_requests_total", "Total number of HTTP requests"),
            &["method", "path", "status"],
        )?;
        let http_request_duration = HistogramVec::new(
            HistogramOpts::new(
                "http_request_duration_seconds",
                "HTTP request processing time",
            )
            .buckets(vec![0.001, 0.01, 0.1, 0.5, 1.0, 5.0, 10.0]),
            &["method", "path"],
        )?;
        let webhooks_received_total = IntCounterVec::new(
            Opts::new(
                "sentry_webhooks_received_total",
                "Sentry webhooks received, by resource",
            ),
            &["resource"],
        )?;
        let signature_failures_total = IntCounter::new(
            "sentry_webhook_signature_failures_total",
            "Webhooks rejected for a missing or invalid signature",
        )?;
        let webhooks_skipped_total = IntCounter::new(
            "sentry_webhooks_skipped_total",
            "Webhooks accepted without any recipients to notify",
        )?;
        // SMS sends are sequential, so a single webhook can take several seconds.
        let webhook_duration_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "sentry_webhook_duration_seconds",
                "Webhook processing time distribution",
            )
            .buckets(vec![0.01, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0]),
        )?;
        let sms_dispatch_total = IntCounterVec::new(
            Opts::new("sms_dispatch_total", "SMS delivery attempts, by outcome"),
            &["outcome"],
        )?;

        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(http_request_duration.clone()))?;
        registry.register(Box::new(webhooks_received_total.clone()))?;
        registry.register(Box::new(signature_failures_total.clone()))?;
        registry.register(Box::new(webhooks_skipped_total.clone()))?;
        registry.register(Box::new(webhook_duration_seconds.clone()))?;
        registry.register(Box::new(sms_dispatch_total.clone()))?;

        Ok(Arc::new(Self {
            registry,
            http_requests_total,
            http_request_duration,
            webhooks_received_total,
            signature_failures_total,
            webhooks_skipped_total,
            webhook_duration_seconds,
            sms_dispatch_total,
        }))
    }

    pub fn record_http_request(
        &self,
        method: &str,
        path: &str,
        status: u16,
        duration: std::time::Duration,
    ) {
        let status = status.to_string();
        self.http_requests_total
            .with_label_values(&[method, path, status.as_str()])
            .inc();
        self.http_request_duration
            .with_label_values(&[method, path])
            .observe(duration.as_secs_f64());
    }

    /// Count an incoming webhook; unknown resources share one label value
    pub fn record_webhook_received(&self, resource: &ResourceType) {
        let label = match resource {
            ResourceType::Other(_) => "other",
            known => known.as_str(),
        };
        self.webhooks_received_total
            .with_label_values(&[label])
            .inc();
    }

    pub fn record_dispatch_results(&self, results: &[DispatchResult]) {
        for result in results {
            let outcome = if result.success { "delivered" } else { "failed" };
            self.sms_dispatch_total.with_label_values(&[outcome]).inc();
        }
    }

    /// Render every metric in the Prometheus text exposition format
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        TextEncoder::new().encode_to_string(&self.registry.gather())
    }
}

#[cfg(test)]
#[path = "metrics_tests.rs"]
mod tests;
