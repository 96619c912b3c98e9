//! Estimate aggregation.
//!
//! Turns a batch of issue records into per-story, per-author and grand
//! totals. Pure: no I/O, no logging side effects beyond debug traces.

use crate::analysis::estimate::minutes_from_seconds;
use crate::models::{
    Aggregation, AuthorTotal, AverageTotal, EstimateSummary, GroupTotal, IssueRecord, WorkTime,
};
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// Knobs that change presentation but not totals.
#[derive(Debug, Clone, Copy, Default)]
pub struct AggregateOptions {
    /// Sort per-parent rows by key instead of first-occurrence order.
    pub sort_groups_by_key: bool,
}

/// Minutes contributed by one issue.
pub fn issue_minutes(issue: &IssueRecord) -> u64 {
    issue.estimate_seconds.map(minutes_from_seconds).unwrap_or(0)
}

/// Aggregate issues with default options.
#[allow(dead_code)] // Convenience wrapper
pub fn aggregate(
    issues: &[IssueRecord],
    authors: &[String],
    status_filter: Option<&BTreeSet<String>>,
) -> Aggregation {
    aggregate_with(issues, authors, status_filter, AggregateOptions::default())
}

/// Aggregate issues into an [`Aggregation`].
///
/// Per-author tables are only produced when `authors` is non-empty, and the
/// filtered table only when `status_filter` is a non-empty set.
pub fn aggregate_with(
    issues: &[IssueRecord],
    authors: &[String],
    status_filter: Option<&BTreeSet<String>>,
    options: AggregateOptions,
) -> Aggregation {
    if issues.is_empty() {
        return Aggregation::NoMatchingIssues;
    }

    let mut by_parent = group_by_parent(issues);
    if options.sort_groups_by_key {
        by_parent.sort_by(|a, b| a.key.cmp(&b.key));
    }

    let total_minutes = by_parent
        .iter()
        .map(|g| g.minutes)
        .fold(0, u64::saturating_add);
    debug!(
        "Aggregated {} issues into {} groups ({} minutes)",
        issues.len(),
        by_parent.len(),
        total_minutes
    );

    let status_filter = status_filter.filter(|set| !set.is_empty());

    let (by_author, by_author_filtered, per_person_average) = if authors.is_empty() {
        (None, None, None)
    } else {
        let unfiltered = totals_by_author(issues, authors, |_| true);
        let filtered = status_filter.map(|whitelist| {
            totals_by_author(issues, authors, |issue| {
                issue
                    .effective_status()
                    .is_some_and(|status| whitelist.contains(status))
            })
        });
        let average = total_minutes / authors.len() as u64;
        (
            Some(unfiltered),
            filtered,
            Some(AverageTotal {
                minutes: average,
                work_time: WorkTime::from_minutes(average).to_string(),
            }),
        )
    };

    Aggregation::Summary(EstimateSummary {
        issue_count: issues.len(),
        by_parent,
        total_minutes,
        total_work_time: WorkTime::from_minutes(total_minutes).to_string(),
        by_author,
        by_author_filtered,
        per_person_average,
    })
}

/// Sum minutes per grouping key, keeping first-occurrence order.
pub fn group_by_parent(issues: &[IssueRecord]) -> Vec<GroupTotal> {
    let mut grouped: Vec<GroupTotal> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for issue in issues {
        let key = issue.grouping_key();
        let minutes = issue_minutes(issue);

        match index.get(key) {
            Some(&i) => grouped[i].minutes = grouped[i].minutes.saturating_add(minutes),
            None => {
                index.insert(key, grouped.len());
                grouped.push(GroupTotal {
                    key: key.to_string(),
                    minutes,
                });
            }
        }
    }

    grouped
}

/// Sum minutes per configured author over the issues accepted by `include`.
///
/// Rows follow `authors` order; authors without matches report 0.
pub fn totals_by_author<F>(
    issues: &[IssueRecord],
    authors: &[String],
    include: F,
) -> Vec<AuthorTotal>
where
    F: Fn(&IssueRecord) -> bool,
{
    authors
        .iter()
        .map(|author| {
            let minutes = issues
                .iter()
                .filter(|&issue| include(issue))
                .filter(|issue| {
                    issue
                        .assignee_name
                        .as_deref()
                        .is_some_and(|name| name.trim() == author.as_str())
                })
                .map(issue_minutes)
                .fold(0, u64::saturating_add);
            AuthorTotal::new(author.clone(), minutes)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_issue(
        summary: &str,
        parent: Option<&str>,
        minutes: u64,
        assignee: Option<&str>,
        status: Option<&str>,
    ) -> IssueRecord {
        IssueRecord {
            summary: summary.to_string(),
            parent_key: parent.map(|_| "PROJ-1".to_string()),
            parent_summary: parent.map(String::from),
            parent_status_name: None,
            estimate_seconds: Some((minutes * 60) as f64),
            assignee_name: assignee.map(String::from),
            status_name: status.map(String::from),
        }
    }

    fn authors(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn whitelist(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_input_is_no_matching_issues() {
        let result = aggregate(&[], &authors(&["A"]), None);
        assert_eq!(result, Aggregation::NoMatchingIssues);
        assert!(result.summary().is_none());
    }

    #[test]
    fn test_zero_estimates_are_a_summary() {
        let issues = vec![IssueRecord {
            summary: "No estimate".to_string(),
            ..Default::default()
        }];
        let result = aggregate(&issues, &[], None);
        let summary = result.summary().expect("summary");
        assert_eq!(summary.total_minutes, 0);
        assert_eq!(summary.total_work_time, "0d 0h 0m");
    }

    #[test]
    fn test_group_by_parent_first_occurrence_order() {
        let issues = vec![
            create_test_issue("a", Some("Story B"), 30, None, None),
            create_test_issue("b", Some("Story A"), 60, None, None),
            create_test_issue("c", Some("Story B"), 15, None, None),
            create_test_issue("Standalone bug", None, 5, None, None),
        ];

        let groups = group_by_parent(&issues);
        assert_eq!(
            groups,
            vec![
                GroupTotal {
                    key: "Story B".to_string(),
                    minutes: 45
                },
                GroupTotal {
                    key: "Story A".to_string(),
                    minutes: 60
                },
                GroupTotal {
                    key: "Standalone bug".to_string(),
                    minutes: 5
                },
            ]
        );
    }

    #[test]
    fn test_sort_groups_by_key() {
        let issues = vec![
            create_test_issue("a", Some("Zeta"), 1, None, None),
            create_test_issue("b", Some("Alpha"), 2, None, None),
        ];
        let options = AggregateOptions {
            sort_groups_by_key: true,
        };
        let result = aggregate_with(&issues, &[], None, options);
        let keys: Vec<_> = result
            .summary()
            .unwrap()
            .by_parent
            .iter()
            .map(|g| g.key.as_str())
            .collect();
        assert_eq!(keys, vec!["Alpha", "Zeta"]);
    }

    #[test]
    fn test_group_totals_sum_to_grand_total() {
        let issues = vec![
            create_test_issue("a", Some("S1"), 90, None, None),
            create_test_issue("b", None, 7, None, None),
            create_test_issue("c", Some("S2"), 480, None, None),
            create_test_issue("d", Some("S1"), 33, None, None),
        ];
        let result = aggregate(&issues, &[], None);
        let summary = result.summary().unwrap();
        let group_sum: u64 = summary.by_parent.iter().map(|g| g.minutes).sum();
        let issue_sum: u64 = issues.iter().map(issue_minutes).sum();
        assert_eq!(group_sum, summary.total_minutes);
        assert_eq!(issue_sum, summary.total_minutes);
        assert_eq!(summary.total_minutes, 610);
    }

    #[test]
    fn test_seconds_truncate_per_issue() {
        let mut issue = create_test_issue("a", None, 0, None, None);
        issue.estimate_seconds = Some(119.0);
        assert_eq!(issue_minutes(&issue), 1);

        issue.estimate_seconds = Some(-60.0);
        assert_eq!(issue_minutes(&issue), 0);
    }

    #[test]
    fn test_author_totals_with_status_filter() {
        let issues = vec![
            create_test_issue("x", None, 60, Some("A"), Some("To Do")),
            create_test_issue("y", None, 30, Some("B"), Some("Done")),
        ];
        let whitelist = whitelist(&["To Do"]);
        let result = aggregate(&issues, &authors(&["A", "B"]), Some(&whitelist));
        let summary = result.summary().unwrap();

        let unfiltered = summary.by_author.as_ref().unwrap();
        assert_eq!(unfiltered[0], AuthorTotal::new("A", 60));
        assert_eq!(unfiltered[1], AuthorTotal::new("B", 30));

        let filtered = summary.by_author_filtered.as_ref().unwrap();
        assert_eq!(filtered[0], AuthorTotal::new("A", 60));
        assert_eq!(filtered[1], AuthorTotal::new("B", 0));
    }

    #[test]
    fn test_filter_uses_parent_status_when_own_is_missing() {
        let mut issue = create_test_issue("sub", Some("Story"), 45, Some("A"), None);
        issue.parent_status_name = Some("In Progress".to_string());
        let whitelist = whitelist(&["In Progress"]);

        let result = aggregate(&[issue], &authors(&["A"]), Some(&whitelist));
        let filtered = result.summary().unwrap().by_author_filtered.clone().unwrap();
        assert_eq!(filtered[0].minutes, 45);
    }

    #[test]
    fn test_assignee_matching_is_exact_after_trim() {
        let issues = vec![
            create_test_issue("a", None, 10, Some("  Alice  "), None),
            create_test_issue("b", None, 20, Some("alice"), None),
            create_test_issue("c", None, 40, None, None),
        ];
        let totals = totals_by_author(&issues, &authors(&["Alice", "Bob"]), |_| true);
        assert_eq!(totals[0].minutes, 10);
        assert_eq!(totals[1].minutes, 0);
        assert_eq!(totals[1].author, "Bob");
    }

    #[test]
    fn test_no_authors_skips_author_tables() {
        let issues = vec![create_test_issue("a", None, 10, Some("A"), Some("To Do"))];
        let whitelist = whitelist(&["To Do"]);
        let result = aggregate(&issues, &[], Some(&whitelist));
        let summary = result.summary().unwrap();
        assert!(summary.by_author.is_none());
        assert!(summary.by_author_filtered.is_none());
        assert!(summary.per_person_average.is_none());
    }

    #[test]
    fn test_empty_whitelist_skips_filtered_table() {
        let issues = vec![create_test_issue("a", None, 10, Some("A"), Some("To Do"))];
        let empty = BTreeSet::new();
        let result = aggregate(&issues, &authors(&["A"]), Some(&empty));
        assert!(result.summary().unwrap().by_author_filtered.is_none());
    }

    #[test]
    fn test_per_person_average_floors() {
        let issues = vec![create_test_issue("a", None, 100, None, None)];
        let result = aggregate(&issues, &authors(&["A", "B", "C"]), None);
        let average = result.summary().unwrap().per_person_average.clone().unwrap();
        assert_eq!(average.minutes, 33);
        assert_eq!(average.work_time, "0d 0h 33m");
    }

    #[test]
    fn test_huge_estimates_saturate_instead_of_overflowing() {
        let mut same_story = create_test_issue("a", Some("Story"), 0, Some("A"), None);
        same_story.estimate_seconds = Some(1e30);
        let issues = vec![same_story.clone(), same_story];

        let result = aggregate(&issues, &authors(&["A"]), None);
        let summary = result.summary().unwrap();
        assert_eq!(summary.by_parent[0].minutes, u64::MAX);
        assert_eq!(summary.total_minutes, u64::MAX);
        assert_eq!(summary.by_author.as_ref().unwrap()[0].minutes, u64::MAX);

        let mut other = create_test_issue("b", None, 0, Some("A"), None);
        other.estimate_seconds = Some(1e30);
        let mut first = create_test_issue("c", Some("Story"), 0, Some("A"), None);
        first.estimate_seconds = Some(1e30);

        let result = aggregate(&[first, other], &authors(&["A"]), None);
        let summary = result.summary().unwrap();
        assert_eq!(summary.by_parent.len(), 2);
        assert_eq!(summary.total_minutes, u64::MAX);
        assert_eq!(summary.per_person_average.as_ref().unwrap().minutes, u64::MAX);
    }
}
