//! Data models for the estimate summarizer.
//!
//! This module contains the issue records handed over by the Jira client,
//! the aggregation results, and the report wrapper used for rendering.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::analysis::estimate::MINUTES_PER_WORK_DAY;

/// A single tracker issue, reduced to the fields the summary needs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IssueRecord {
    /// The issue's own summary line.
    pub summary: String,
    /// Key of the parent issue (e.g. `PROJ-12`).
    pub parent_key: Option<String>,
    /// Summary of the parent issue.
    pub parent_summary: Option<String>,
    /// Status name of the parent issue.
    pub parent_status_name: Option<String>,
    /// Original estimate in seconds.
    pub estimate_seconds: Option<f64>,
    /// Assignee display name (or login / email when no display name).
    pub assignee_name: Option<String>,
    /// Status name of the issue.
    pub status_name: Option<String>,
}

impl IssueRecord {
    /// The bucket this issue is summed into: its parent's summary, or its
    /// own summary when it has no parent.
    pub fn grouping_key(&self) -> &str {
        self.parent_summary.as_deref().unwrap_or(&self.summary)
    }

    /// The issue's status if set and non-empty, otherwise the parent's.
    pub fn effective_status(&self) -> Option<&str> {
        match self.status_name.as_deref() {
            Some(status) if !status.trim().is_empty() => Some(status),
            _ => self.parent_status_name.as_deref(),
        }
    }
}

/// Duration split into 8-hour work days, hours and minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkTime {
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
}

impl WorkTime {
    pub fn from_minutes(total: u64) -> Self {
        let remainder = total % MINUTES_PER_WORK_DAY;
        Self {
            days: total / MINUTES_PER_WORK_DAY,
            hours: remainder / 60,
            minutes: remainder % 60,
        }
    }
}

impl fmt::Display for WorkTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d {}h {}m", self.days, self.hours, self.minutes)
    }
}

/// Summed minutes for one grouping key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupTotal {
    pub key: String,
    pub minutes: u64,
}

/// Summed minutes for one configured author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorTotal {
    pub author: String,
    pub minutes: u64,
    pub work_time: String,
}

impl AuthorTotal {
    pub fn new(author: impl Into<String>, minutes: u64) -> Self {
        Self {
            author: author.into(),
            minutes,
            work_time: WorkTime::from_minutes(minutes).to_string(),
        }
    }
}

/// Grand total divided evenly across the configured authors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AverageTotal {
    pub minutes: u64,
    pub work_time: String,
}

/// Totals computed from a non-empty set of issues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstimateSummary {
    /// Number of issues that went into the summary.
    pub issue_count: usize,
    /// Per-parent totals.
    pub by_parent: Vec<GroupTotal>,
    /// Sum of every issue's minutes.
    pub total_minutes: u64,
    /// `total_minutes` in work-day format.
    pub total_work_time: String,
    /// Per-author totals, present when authors were configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub by_author: Option<Vec<AuthorTotal>>,
    /// Per-author totals restricted to the status whitelist.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub by_author_filtered: Option<Vec<AuthorTotal>>,
    /// Grand total divided by the number of authors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_person_average: Option<AverageTotal>,
}

/// Result of aggregating one query's issues.
///
/// An empty issue list is reported as [`Aggregation::NoMatchingIssues`], never
/// as a summary with zero minutes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum Aggregation {
    NoMatchingIssues,
    Summary(EstimateSummary),
}

impl Aggregation {
    pub fn summary(&self) -> Option<&EstimateSummary> {
        match self {
            Aggregation::Summary(summary) => Some(summary),
            Aggregation::NoMatchingIssues => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Aggregation::NoMatchingIssues)
    }
}

/// Metadata about a generated report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Jira site the issues came from.
    pub jira_url: String,
    /// The JQL filter that was run.
    pub jql: String,
    /// When the report was generated.
    pub generated_at: DateTime<Utc>,
    /// Status whitelist applied to the filtered author table.
    pub status_filter: Vec<String>,
}

/// The complete estimate report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    pub aggregation: Aggregation,
}
