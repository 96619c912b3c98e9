//! Jira integration.
//!
//! Query construction, the REST search client, and payload translation.

pub mod client;
pub mod jql;
pub mod payload;

pub use client::{JiraClient, JiraClientConfig};
pub use jql::{build_jql, split_authors};
