//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// jira-estimates - summarize Jira original estimates
///
/// Fetches the issues of a fix version, sums their original estimates per
/// story and per author, and prints totals in 8-hour work days.
///
/// Examples:
///   jira-estimates --project ACL --fix-version 2025.04.30 --authors alice,bob
///   jira-estimates --jql 'project = ACL AND sprint in openSprints()' --format json
///   jira-estimates --convert "1d 2h 30m"
///   jira-estimates --init-config
#[derive(Parser, Debug, Clone, Default)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Jira site base URL
    #[arg(long, value_name = "URL", env = "JIRA_URL")]
    pub url: Option<String>,

    /// Account email for the Jira API
    #[arg(long, value_name = "EMAIL", env = "JIRA_EMAIL")]
    pub email: Option<String>,

    /// Jira API token
    #[arg(long, value_name = "TOKEN", env = "JIRA_API_TOKEN", hide_env_values = true)]
    pub api_token: Option<String>,

    /// Project key to query
    #[arg(short, long, value_name = "KEY")]
    pub project: Option<String>,

    /// Fix version to query (e.g. 2025.04.30)
    #[arg(short, long, value_name = "VERSION")]
    pub fix_version: Option<String>,

    /// Authors to track (comma-separated)
    ///
    /// Used both in the JQL filter and for the per-author tables.
    #[arg(short, long, value_name = "NAMES", value_delimiter = ',')]
    pub authors: Option<Vec<String>>,

    /// Issue field the authors are matched against in JQL
    #[arg(long, value_name = "FIELD")]
    pub author_field: Option<String>,

    /// Raw JQL filter, bypassing project/fix version/authors
    #[arg(long, value_name = "JQL")]
    pub jql: Option<String>,

    /// Status whitelist for the filtered author table (comma-separated)
    #[arg(
        long,
        value_name = "STATUSES",
        value_delimiter = ',',
        conflicts_with = "no_status_filter"
    )]
    pub status: Option<Vec<String>>,

    /// Skip the status-filtered author table
    #[arg(long)]
    pub no_status_filter: bool,

    /// Sort story rows by name instead of first-seen order
    #[arg(long)]
    pub sort_by_key: bool,

    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Also write the report to this file
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .jira-estimates.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Maximum number of issues to fetch
    #[arg(long, value_name = "COUNT")]
    pub max_issues: Option<usize>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Exit with code 2 when no issues match the query
    #[arg(long)]
    pub fail_on_empty: bool,

    /// Save the effective Jira settings and authors to the config file
    #[arg(long)]
    pub save_config: bool,

    /// Generate a default .jira-estimates.toml configuration file
    #[arg(long)]
    pub init_config: bool,

    /// Convert an estimate ("5400" seconds or "1d 2h 30m") and exit
    #[arg(long, value_name = "ESTIMATE")]
    pub convert: Option<String>,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config || self.convert.is_some() {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(ref url) = self.url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("Jira URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        if let Some(max_issues) = self.max_issues {
            if max_issues == 0 {
                return Err("Max issues must be at least 1".to_string());
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
