//! Jira search payload types and their translation into issue records.
//!
//! Every field is optional on the wire; anything missing or oddly typed
//! becomes `None` instead of failing the whole page.

use crate::analysis::estimate::parse_estimate;
use crate::models::IssueRecord;
use serde::Deserialize;
use serde_json::Value;
use tracing::trace;

/// One page of `/rest/api/2/search` results.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    #[serde(default)]
    pub start_at: u64,
    #[serde(default)]
    pub max_results: u64,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub issues: Vec<RawIssue>,
}

#[derive(Debug, Deserialize)]
pub struct RawIssue {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub fields: Value,
}

impl RawIssue {
    /// Translate into an [`IssueRecord`].
    pub fn into_record(self) -> IssueRecord {
        let fields = &self.fields;
        let parent = &fields["parent"];
        trace!("Translating issue {}", self.key.as_deref().unwrap_or("<no key>"));

        IssueRecord {
            summary: string_at(&fields["summary"]).unwrap_or_default(),
            parent_key: string_at(&parent["key"]),
            parent_summary: string_at(&parent["fields"]["summary"]),
            parent_status_name: string_at(&parent["fields"]["status"]["name"]),
            estimate_seconds: estimate_seconds(&fields["timetracking"]),
            assignee_name: assignee_name(&fields["assignee"]),
            status_name: string_at(&fields["status"]["name"]),
        }
    }
}

fn string_at(value: &Value) -> Option<String> {
    value.as_str().map(String::from)
}

/// Prefer `originalEstimateSeconds`; fall back to the `originalEstimate`
/// shorthand (`"1d 2h"`), which may also arrive as a bare number.
fn estimate_seconds(timetracking: &Value) -> Option<f64> {
    if let Some(seconds) = timetracking["originalEstimateSeconds"].as_f64() {
        return Some(seconds);
    }

    match &timetracking["originalEstimate"] {
        Value::String(raw) => Some(parse_estimate(raw).saturating_mul(60) as f64),
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

/// First non-empty of `displayName`, `name`, `emailAddress`.
fn assignee_name(assignee: &Value) -> Option<String> {
    ["displayName", "name", "emailAddress"]
        .iter()
        .filter_map(|field| assignee[*field].as_str())
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(fields: Value) -> RawIssue {
        RawIssue {
            key: Some("ACL-1".to_string()),
            fields,
        }
    }

    #[test]
    fn test_full_issue() {
        let record = raw(json!({
            "summary": "Add login button",
            "parent": {
                "key": "ACL-0",
                "fields": {
                    "summary": "Login story",
                    "status": { "name": "In Progress" }
                }
            },
            "timetracking": { "originalEstimateSeconds": 5400 },
            "assignee": { "displayName": "Jane Doe", "name": "jdoe" },
            "status": { "name": "To Do" }
        }))
        .into_record();

        assert_eq!(record.summary, "Add login button");
        assert_eq!(record.parent_key.as_deref(), Some("ACL-0"));
        assert_eq!(record.parent_summary.as_deref(), Some("Login story"));
        assert_eq!(record.parent_status_name.as_deref(), Some("In Progress"));
        assert_eq!(record.estimate_seconds, Some(5400.0));
        assert_eq!(record.assignee_name.as_deref(), Some("Jane Doe"));
        assert_eq!(record.status_name.as_deref(), Some("To Do"));
    }

    #[test]
    fn test_missing_fields_degrade_to_none() {
        let record =
            raw(json!({ "summary": "Bare", "parent": null, "assignee": null })).into_record();
        assert_eq!(record.summary, "Bare");
        assert!(record.parent_key.is_none());
        assert!(record.parent_summary.is_none());
        assert!(record.estimate_seconds.is_none());
        assert!(record.assignee_name.is_none());
        assert!(record.status_name.is_none());
    }

    #[test]
    fn test_missing_fields_object() {
        let record = RawIssue {
            key: None,
            fields: Value::Null,
        }
        .into_record();
        assert_eq!(record, IssueRecord::default());
    }

    #[test]
    fn test_assignee_first_non_empty_wins() {
        let record = raw(json!({
            "summary": "x",
            "assignee": { "displayName": "  ", "name": "", "emailAddress": "a@example.com" }
        }))
        .into_record();
        assert_eq!(record.assignee_name.as_deref(), Some("a@example.com"));
    }

    #[test]
    fn test_estimate_string_fallback() {
        let record = raw(json!({
            "summary": "x",
            "timetracking": { "originalEstimate": "1d 2h 30m" }
        }))
        .into_record();
        assert_eq!(record.estimate_seconds, Some(630.0 * 60.0));
    }

    #[test]
    fn test_search_response_deserializes() {
        let body = json!({
            "startAt": 0,
            "maxResults": 50,
            "total": 1,
            "issues": [ { "key": "ACL-9", "fields": { "summary": "Only one" } } ]
        });
        let page: SearchResponse = serde_json::from_value(body).unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.issues.len(), 1);
        assert_eq!(page.issues[0].key.as_deref(), Some("ACL-9"));
    }
}
