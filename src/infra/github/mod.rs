//! GitHub API client module using octocrab.
//!
//! Provides OctocrabClient for GitHub operations, split into one trait per
//! concern, with authentication via `GITHUB_TOKEN` or `gh auth token`.

mod client;
pub(crate) mod error;
mod issue;
mod label;
#[cfg(test)]
pub(crate) mod mock;
mod models;
mod project;
mod repo;
mod search;

pub use client::OctocrabClient;
pub use error::GitHubError;
pub use issue::{IssueClient, NewIssue};
pub use label::LabelClient;
pub use models::{CreatedIssue, IssueSummary, Label};
pub use project::{FieldValue, ProjectClient, ProjectField, ProjectRef};
pub use repo::RepoName;
pub use search::{SearchClient, quote_phrase};
