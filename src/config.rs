//! Configuration file handling.
//!
//! This module handles loading, saving and merging configuration from
//! `.jira-estimates.toml` files. The file is a flat settings blob: Jira
//! credentials and project, the tracked authors, and the status whitelist.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

/// Default config file name, looked up in the current directory.
pub const DEFAULT_CONFIG_FILE: &str = ".jira-estimates.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Jira connection settings.
    #[serde(default)]
    pub jira: JiraConfig,

    /// What to query and how to split it.
    #[serde(default)]
    pub query: QueryConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// Jira connection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JiraConfig {
    /// Base URL of the Jira site.
    #[serde(default = "default_url")]
    pub url: String,

    /// Account email used for basic auth.
    #[serde(default)]
    pub email: String,

    /// API token used for basic auth.
    #[serde(default)]
    pub api_token: String,

    /// Default project key.
    #[serde(default)]
    pub project: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Issues requested per search page.
    #[serde(default = "default_page_size")]
    pub page_size: u64,

    /// Hard cap on fetched issues.
    #[serde(default = "default_max_issues")]
    pub max_issues: usize,
}

impl Default for JiraConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            email: String::new(),
            api_token: String::new(),
            project: String::new(),
            timeout_seconds: default_timeout(),
            page_size: default_page_size(),
            max_issues: default_max_issues(),
        }
    }
}

fn default_url() -> String {
    "https://acloset.atlassian.net".to_string()
}

fn default_timeout() -> u64 {
    60
}

fn default_page_size() -> u64 {
    100
}

fn default_max_issues() -> usize {
    1000
}

/// Query settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Authors tracked in the per-author tables, in display order.
    #[serde(default)]
    pub authors: Vec<String>,

    /// Issue field the authors are matched against in JQL.
    #[serde(default = "default_author_field")]
    pub author_field: String,

    /// Status names counted in the filtered per-author table.
    #[serde(default = "default_status_filter")]
    pub status_filter: Vec<String>,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            authors: Vec::new(),
            author_field: default_author_field(),
            status_filter: default_status_filter(),
        }
    }
}

fn default_author_field() -> String {
    "reporter".to_string()
}

fn default_status_filter() -> Vec<String> {
    vec!["To Do", "In Progress", "Pending"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Report settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Sort story rows alphabetically instead of first-seen order.
    #[serde(default)]
    pub sort_groups_by_key: bool,
}

impl QueryConfig {
    /// Trim author names and drop blank entries, keeping order.
    pub fn normalize_authors(&mut self) {
        self.authors = self
            .authors
            .iter()
            .map(|a| a.trim())
            .filter(|a| !a.is_empty())
            .map(String::from)
            .collect();
    }

    /// The status whitelist as a set, `None` when empty.
    pub fn status_set(&self) -> Option<BTreeSet<String>> {
        let set: BTreeSet<String> = self
            .status_filter
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
        (!set.is_empty()).then_some(set)
    }
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.query.normalize_authors();

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(DEFAULT_CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Write this configuration to `path`, replacing any existing file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref url) = args.url {
            self.jira.url = url.clone();
        }
        if let Some(ref email) = args.email {
            self.jira.email = email.clone();
        }
        if let Some(ref token) = args.api_token {
            self.jira.api_token = token.clone();
        }
        if let Some(ref project) = args.project {
            self.jira.project = project.clone();
        }
        if let Some(timeout) = args.timeout {
            self.jira.timeout_seconds = timeout;
        }
        if let Some(max_issues) = args.max_issues {
            self.jira.max_issues = max_issues;
        }

        if let Some(ref authors) = args.authors {
            self.query.authors = crate::jira::split_authors(&authors.join(","));
        }
        if let Some(ref field) = args.author_field {
            self.query.author_field = field.clone();
        }
        if let Some(ref statuses) = args.status {
            self.query.status_filter = statuses.clone();
        }
        if args.no_status_filter {
            self.query.status_filter.clear();
        }

        if args.sort_by_key {
            self.report.sort_groups_by_key = true;
        }
    }

    /// Check that everything needed to run a query is present.
    ///
    /// With a raw JQL filter only credentials are required; otherwise the
    /// project, fix version and at least one author are needed too.
    pub fn validate_for_query(
        &self,
        fix_version: Option<&str>,
        raw_jql: Option<&str>,
    ) -> Result<()> {
        let has_credentials =
            !self.jira.email.trim().is_empty() && !self.jira.api_token.trim().is_empty();

        let has_filter = raw_jql.is_some_and(|jql| !jql.trim().is_empty())
            || (!self.jira.project.trim().is_empty()
                && fix_version.is_some_and(|v| !v.trim().is_empty())
                && !self.query.authors.is_empty());

        if !has_credentials || !has_filter {
            bail!("All of email, API token, project, fix version and authors are required");
        }
        Ok(())
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
