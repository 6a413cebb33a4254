//! # Recipient Routing
//!
//! Maps a project slug onto the phone numbers that should be notified.
//!
//! Routing has an intentional asymmetry:
//!
//! - With an **empty** route table every alert goes to the default recipients.
//! - With a **non-empty** route table only listed projects are delivered; an
//!   alert for any other project (or with no project at all) is suppressed
//!   rather than broadcast to the defaults.
//!
//! The table is built once at startup and never mutated afterwards.

use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

/// Errors raised while parsing a route table definition
#[derive(Debug, thiserror::Error)]
pub enum RouteTableError {
    #[error("Route table is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Route table must be a JSON object mapping project slugs to number lists")]
    NotAnObject,

    #[error("Route table entry '{project}' must be a list of strings")]
    InvalidEntry { project: String },
}

/// Per-project recipient lists keyed by lowercase project slug
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteTable(HashMap<String, Vec<String>>);

impl RouteTable {
    /// Build a table, lowercasing every project key
    pub fn new(routes: HashMap<String, Vec<String>>) -> Self {
        Self(
            routes
                .into_iter()
                .map(|(project, numbers)| (project.to_lowercase(), numbers))
                .collect(),
        )
    }

    /// Parse a table from JSON.
    ///
    /// Accepts either an object (`{"backend": ["+1555..."]}`) or a JSON string
    /// containing such an object, which is what shells and container
    /// orchestrators tend to produce when the value is quoted twice. Exactly
    /// one level of string wrapping is unwrapped.
    pub fn parse(raw: &str) -> Result<Self, RouteTableError> {
        let mut value: Value = serde_json::from_str(raw)?;
        if let Value::String(inner) = value {
            debug!("Route table is double-encoded; unwrapping one level");
            value = serde_json::from_str(&inner)?;
        }

        let Value::Object(object) = value else {
            return Err(RouteTableError::NotAnObject);
        };

        let mut routes = HashMap::with_capacity(object.len());
        for (project, numbers) in object {
            let Value::Array(items) = numbers else {
                return Err(RouteTableError::InvalidEntry { project });
            };
            let numbers = items
                .into_iter()
                .map(|item| match item {
                    Value::String(number) => Some(number.trim().to_string()),
                    _ => None,
                })
                .collect::<Option<Vec<_>>>()
                .ok_or_else(|| RouteTableError::InvalidEntry {
                    project: project.clone(),
                })?;
            routes.insert(project, numbers);
        }

        Ok(Self::new(routes))
    }

    /// Look up the recipients listed for `project`
    pub fn get(&self, project: &str) -> Option<&[String]> {
        self.0.get(project).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Configured project slugs, sorted for stable logging
    pub fn projects(&self) -> Vec<&str> {
        let mut projects: Vec<&str> = self.0.keys().map(String::as_str).collect();
        projects.sort_unstable();
        projects
    }
}

impl FromIterator<(String, Vec<String>)> for RouteTable {
    fn from_iter<I: IntoIterator<Item = (String, Vec<String>)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Immutable routing configuration: the route table plus the default list
#[derive(Debug, Clone, Default)]
pub struct RecipientRouter {
    table: RouteTable,
    defaults: Vec<String>,
}

impl RecipientRouter {
    pub fn new(table: RouteTable, defaults: Vec<String>) -> Self {
        Self { table, defaults }
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    pub fn defaults(&self) -> &[String] {
        &self.defaults
    }

    /// Resolve the recipients for an optional project slug.
    ///
    /// Order matters: a non-empty table suppresses unmatched projects before
    /// the defaults are ever considered.
    pub fn resolve(&self, slug: Option<&str>) -> &[String] {
        resolve_recipients(slug, &self.table, &self.defaults)
    }
}

/// Free-standing form of [`RecipientRouter::resolve`]
pub fn resolve_recipients<'a>(
    slug: Option<&str>,
    table: &'a RouteTable,
    defaults: &'a [String],
) -> &'a [String] {
    if let Some(recipients) = slug.and_then(|s| table.get(s)) {
        return recipients;
    }
    if !table.is_empty() {
        return &[];
    }
    defaults
}

/// Split a comma-separated number list, trimming whitespace and dropping
/// empty entries.
pub fn parse_recipient_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
#[path = "routing_tests.rs"]
mod tests;
