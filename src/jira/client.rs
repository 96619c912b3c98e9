//! Jira REST search client.
//!
//! Runs one JQL query against `/rest/api/2/search`, following pagination,
//! and hands back issue records.

use crate::jira::payload::SearchResponse;
use crate::models::IssueRecord;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// Fields requested from the search endpoint.
pub const SEARCH_FIELDS: &str = "summary,parent,timetracking,assignee,status";

/// Errors raised while talking to Jira.
#[derive(Debug, Error)]
pub enum JiraError {
    #[error("request timed out after {0}s")]
    Timeout(u64),
    #[error("cannot connect to Jira at {0}")]
    Connect(String),
    #[error("failed to send request: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Jira API request failed: {status} {body}")]
    Status { status: u16, body: String },
    #[error("failed to parse Jira response: {0}")]
    Decode(String),
}

/// Connection settings for the client.
#[derive(Debug, Clone)]
pub struct JiraClientConfig {
    pub base_url: String,
    pub email: String,
    pub api_token: String,
    pub timeout_seconds: u64,
    /// Page size requested per call.
    pub page_size: u64,
    /// Stop after this many issues.
    pub max_issues: usize,
}

impl Default for JiraClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            email: String::new(),
            api_token: String::new(),
            timeout_seconds: 60,
            page_size: 100,
            max_issues: 1000,
        }
    }
}

pub struct JiraClient {
    config: JiraClientConfig,
    http_client: reqwest::Client,
}

impl JiraClient {
    pub fn new(config: JiraClientConfig) -> Result<Self, JiraError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// The search endpoint URL.
    pub fn search_url(&self) -> String {
        format!(
            "{}/rest/api/2/search",
            self.config.base_url.trim_end_matches('/')
        )
    }

    /// Fetch every issue matching `jql`, up to `max_issues`.
    pub async fn search(&self, jql: &str) -> Result<Vec<IssueRecord>, JiraError> {
        info!("Searching Jira: {}", jql);

        let mut records = Vec::new();
        let mut start_at: u64 = 0;

        loop {
            let page = self.fetch_page(jql, start_at).await?;
            let page_len = page.issues.len() as u64;
            debug!(
                "Fetched page startAt={} maxResults={} ({} issues, total {})",
                page.start_at, page.max_results, page_len, page.total
            );

            let page_records = page.issues.into_iter().map(|issue| issue.into_record());
            match absorb_page(
                &mut records,
                page_records,
                page.start_at,
                page.total,
                self.config.max_issues,
            ) {
                Some(next) => start_at = next,
                None => break,
            }
        }

        info!("Fetched {} issues", records.len());
        Ok(records)
    }

    async fn fetch_page(&self, jql: &str, start_at: u64) -> Result<SearchResponse, JiraError> {
        let start_at = start_at.to_string();
        let max_results = self.config.page_size.to_string();

        let response = self
            .http_client
            .get(self.search_url())
            .header(reqwest::header::ACCEPT, "application/json")
            .basic_auth(&self.config.email, Some(&self.config.api_token))
            .query(&[
                ("jql", jql),
                ("fields", SEARCH_FIELDS),
                ("startAt", start_at.as_str()),
                ("maxResults", max_results.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    JiraError::Timeout(self.config.timeout_seconds)
                } else if e.is_connect() {
                    JiraError::Connect(self.config.base_url.clone())
                } else {
                    JiraError::Http(e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(JiraError::Status { status, body });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| JiraError::Decode(e.to_string()))
    }
}

/// Append one page to `records` and decide where the next page starts.
///
/// Returns `None` once the page was empty, `total` is reached, or `records`
/// hit `max_issues` (in which case it is truncated to exactly that many).
pub fn absorb_page<T>(
    records: &mut Vec<T>,
    page: impl IntoIterator<Item = T>,
    page_start: u64,
    total: u64,
    max_issues: usize,
) -> Option<u64> {
    let before = records.len();
    records.extend(page);
    let page_len = (records.len() - before) as u64;

    if records.len() >= max_issues {
        records.truncate(max_issues);
        info!("Reached issue cap of {}", max_issues);
        return None;
    }

    let next = page_start.saturating_add(page_len);
    if page_len == 0 || next >= total {
        return None;
    }
    Some(next)
}
