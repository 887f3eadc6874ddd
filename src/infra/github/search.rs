//! Issue search.

use super::client::OctocrabClient;
use super::error::Result;
use super::models::IssueSummary;

#[async_trait::async_trait]
pub trait SearchClient: Send + Sync {
    /// Run an issue search query and return every matching item (max 1000).
    async fn search_issues(&self, query: &str) -> Result<Vec<IssueSummary>>;
}

#[async_trait::async_trait]
impl SearchClient for OctocrabClient {
    async fn search_issues(&self, query: &str) -> Result<Vec<IssueSummary>> {
        tracing::debug!(query, "searching issues");
        self.search_all("/search/issues", query).await
    }
}

/// Quote a phrase for use in a search query. Embedded quotes are dropped
/// because the search syntax has no escape for them.
pub fn quote_phrase(text: &str) -> String {
    format!("\"{}\"", text.replace('"', ""))
}
