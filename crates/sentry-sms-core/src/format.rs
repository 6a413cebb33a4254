//! # Alert Formatting
//!
//! Renders a classified payload as the SMS body. Formatting is total: missing
//! or malformed fields degrade to placeholder text and never fail.
//!
//! The leading emoji is part of the message contract. Issue and event alerts
//! start with 🚨, metric alerts with 📊, so recipients can triage at a glance.

use crate::webhook::{empty_object, lookup, text, Alert, WebhookPayload};
use serde_json::Value;

/// Maximum number of characters of raw `data` included in a fallback message
pub const FALLBACK_DATA_LIMIT: usize = 200;

/// Render the SMS text for a payload
pub fn format_alert(payload: &WebhookPayload) -> String {
    match payload.alert() {
        Alert::Issue { action, issue } => format_issue(action, issue),
        Alert::EventAlert {
            event,
            triggered_rule,
        } => format_event_alert(event, triggered_rule),
        Alert::MetricAlert {
            action,
            data,
            metric_alert,
        } => format_metric_alert(action, data, metric_alert.unwrap_or(empty_object())),
        Alert::Unrecognized { action, data } => format_fallback(action, data),
    }
}

fn format_issue(action: Option<&str>, issue: &Value) -> String {
    let url = text(issue.get("web_url"))
        .or_else(|| text(issue.get("permalink")))
        .unwrap_or_else(|| "N/A".to_string());

    [
        format!("🚨 Sentry Issue {}", upper_or(action, "ALERT")),
        format!("Title: {}", or(text(issue.get("title")), "Unknown")),
        format!(
            "Project: {}",
            or(text(lookup(issue, &["project", "name"])), "Unknown")
        ),
        format!("Level: {}", or(text(issue.get("level")), "error")),
        format!("URL: {}", url),
    ]
    .join("\n")
}

fn format_event_alert(event: &Value, triggered_rule: Option<&Value>) -> String {
    let message = text(event.get("title")).or_else(|| text(event.get("message")));

    [
        "🚨 Sentry Alert Triggered".to_string(),
        format!("Rule: {}", or(text(triggered_rule), "Unknown rule")),
        format!("Message: {}", or(message, "No message")),
        format!("Project: {}", or(text(event.get("project")), "Unknown")),
        format!("URL: {}", or(text(event.get("web_url")), "N/A")),
    ]
    .join("\n")
}

fn format_metric_alert(action: Option<&str>, data: &Value, metric_alert: &Value) -> String {
    let title = text(data.get("description_title"))
        .or_else(|| text(lookup(metric_alert, &["alert_rule", "name"])));

    [
        format!("📊 Sentry Metric Alert: {}", upper_or(action, "ALERT")),
        format!("Title: {}", or(title, "Unknown")),
        format!(
            "Description: {}",
            or(text(data.get("description_text")), "N/A")
        ),
        format!("URL: {}", or(text(data.get("web_url")), "N/A")),
    ]
    .join("\n")
}

fn format_fallback(action: Option<&str>, data: &Value) -> String {
    let rendered = data.to_string();
    format!(
        "🚨 Sentry Notification: {}\n{}",
        action.unwrap_or("Alert"),
        truncate_chars(&rendered, FALLBACK_DATA_LIMIT)
    )
}

fn upper_or(action: Option<&str>, default: &str) -> String {
    action
        .map(str::to_uppercase)
        .unwrap_or_else(|| default.to_string())
}

fn or(value: Option<String>, default: &str) -> String {
    value.unwrap_or_else(|| default.to_string())
}

/// Cut `value` to at most `limit` characters without splitting a code point
pub fn truncate_chars(value: &str, limit: usize) -> &str {
    match value.char_indices().nth(limit) {
        Some((index, _)) => &value[..index],
        None => value,
    }
}

#[cfg(test)]
#[path = "format_tests.rs"]
mod tests;
