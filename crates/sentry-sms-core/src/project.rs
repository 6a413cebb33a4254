//! Project slug extraction.
//!
//! Each payload shape carries its project in a different place; the slug is
//! used as the key into the route table and is always lowercased.

use crate::webhook::{lookup, text, ResourceType, WebhookPayload};

/// Extract the lowercase project slug a payload belongs to.
///
/// | resource | source |
/// |---|---|
/// | `issue` | `data.issue.project.slug` |
/// | `event_alert` | `data.event.project` (numbers rendered as text) |
/// | `metric_alert` | `data.metric_alert.alert_rule.project.slug` |
///
/// Any other resource, or a missing field, yields `None`.
pub fn resolve_project_slug(payload: &WebhookPayload) -> Option<String> {
    let path: &[&str] = match payload.resource {
        ResourceType::Issue => &["issue", "project", "slug"],
        ResourceType::EventAlert => &["event", "project"],
        ResourceType::MetricAlert => &["metric_alert", "alert_rule", "project", "slug"],
        ResourceType::Other(_) => return None,
    };

    text(lookup(&payload.data, path)).map(|slug| slug.to_lowercase())
}

#[cfg(test)]
#[path = "project_tests.rs"]
mod tests;
