//! Markdown and JSON report generation.
//!
//! This module renders an estimate aggregation as a Markdown report for the
//! terminal or a file, or as pretty-printed JSON.

use crate::analysis::estimate::format_hm;
use crate::models::{Aggregation, AuthorTotal, EstimateSummary, GroupTotal, Report, ReportMetadata};
use anyhow::Result;

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &Report) -> String {
    let mut output = String::new();

    output.push_str("# Jira Original Estimate Summary\n\n");
    output.push_str(&generate_metadata_section(&report.metadata));

    match &report.aggregation {
        Aggregation::NoMatchingIssues => {
            output.push_str("## Result\n\n");
            output.push_str("No issues matched the query.\n\n");
        }
        Aggregation::Summary(summary) => {
            output.push_str(&generate_groups_section(&summary.by_parent));
            output.push_str(&generate_total_section(summary));
            output.push_str(&generate_author_sections(summary, &report.metadata.status_filter));
        }
    }

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Jira:** {}\n", metadata.jira_url));
    section.push_str(&format!("- **JQL:** `{}`\n", metadata.jql));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push('\n');

    section
}

/// Generate the per-story table.
fn generate_groups_section(groups: &[GroupTotal]) -> String {
    let mut section = String::new();

    section.push_str("## Original Estimate by Parent Summary\n\n");
    section.push_str("| Parent summary | Minutes | Work time |\n");
    section.push_str("|:---|---:|:---|\n");

    for group in groups {
        section.push_str(&format!(
            "| {} | {} | {} |\n",
            escape_cell(&group.key),
            group.minutes,
            crate::analysis::format_dhm(group.minutes)
        ));
    }
    section.push('\n');

    section
}

/// Generate the grand total block.
fn generate_total_section(summary: &EstimateSummary) -> String {
    let mut section = String::new();

    section.push_str("## Total\n\n");
    section.push_str(&format!("- **Issues:** {}\n", summary.issue_count));
    section.push_str(&format!("- **Minutes:** {}\n", summary.total_minutes));
    section.push_str(&format!(
        "- **Clock time:** {}\n",
        format_hm(summary.total_minutes)
    ));
    section.push_str(&format!(
        "- **Work-day format:** **{}**\n\n",
        summary.total_work_time
    ));

    section
}

/// Generate the per-author tables and the per-person average.
fn generate_author_sections(summary: &EstimateSummary, status_filter: &[String]) -> String {
    let mut section = String::new();

    if let Some(ref totals) = summary.by_author {
        section.push_str("## Original Estimate by Author\n\n");
        section.push_str(&author_table(totals));
    }

    if let Some(ref totals) = summary.by_author_filtered {
        section.push_str("## Remaining Estimate by Author\n\n");
        section.push_str(&format!("*Statuses: {}*\n\n", status_filter.join(", ")));
        section.push_str(&author_table(totals));
    }

    if let Some(ref average) = summary.per_person_average {
        section.push_str("## Per-Person Average\n\n");
        section.push_str(&format!(
            "- {} minutes (**{}**)\n\n",
            average.minutes, average.work_time
        ));
    }

    section
}

fn author_table(totals: &[AuthorTotal]) -> String {
    let mut table = String::new();

    table.push_str("| Author | Minutes | Work time |\n");
    table.push_str("|:---|---:|:---|\n");
    for total in totals {
        table.push_str(&format!(
            "| {} | {} | {} |\n",
            escape_cell(&total.author),
            total.minutes,
            total.work_time
        ));
    }
    table.push('\n');

    table
}

/// Keep pipes in issue summaries from breaking the table.
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}
