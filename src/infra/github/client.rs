//! GitHub API client implementation using octocrab.

use std::collections::BTreeMap;
use std::process::Command;
use std::sync::OnceLock;

use serde::Deserialize;
use serde::de::DeserializeOwned;

use super::error::{GitHubError, Result};
use crate::shared::env_var::EnvVars;

/// Page size used for every paginated REST listing.
pub(crate) const PER_PAGE: u32 = 100;

/// GitHub caps search results at 1000 items (10 pages of 100).
const MAX_SEARCH_PAGES: u32 = 10;

/// Internal wrapper for GitHub GraphQL API responses.
#[derive(Debug, Deserialize)]
struct GraphQLResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQLError>>,
}

#[derive(Debug, Deserialize)]
struct GraphQLError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct SearchPage<T> {
    total_count: u64,
    items: Vec<T>,
}

/// Query parameters for one page of a listing.
fn page_params<'a>(page: u32, extra: &[(&'a str, &'a str)]) -> BTreeMap<&'a str, String> {
    let mut params: BTreeMap<&str, String> = extra
        .iter()
        .map(|(key, value)| (*key, (*value).to_string()))
        .collect();
    params.insert("per_page", PER_PAGE.to_string());
    params.insert("page", page.to_string());
    params
}

/// Production implementation using octocrab.
pub struct OctocrabClient {
    pub(crate) client: octocrab::Octocrab,
}

/// Global singleton instance of OctocrabClient, initialized lazily.
///
/// Stores the `Result` of initialization so the token lookup runs only once.
static OCTOCRAB_CLIENT: OnceLock<std::result::Result<OctocrabClient, String>> = OnceLock::new();

impl OctocrabClient {
    /// Create a client from `GITHUB_TOKEN`, falling back to `gh auth token`.
    /// Prefer using `OctocrabClient::get()` to reuse the singleton instance.
    fn new() -> Result<Self> {
        let token = resolve_token()?;
        Self::with_token(&token)
    }

    /// Create a client authenticated with an explicit token.
    pub fn with_token(token: &str) -> Result<Self> {
        let client = octocrab::Octocrab::builder()
            .personal_token(token.to_string())
            .build()
            .map_err(|e| {
                GitHubError::TokenError(format!("Failed to build octocrab client: {e}"))
            })?;
        Ok(Self { client })
    }

    /// Create a client talking to a custom API root (used against mock servers).
    pub fn with_base_url(base_url: &str, token: &str) -> Result<Self> {
        let client = octocrab::Octocrab::builder()
            .base_uri(base_url)?
            .personal_token(token.to_string())
            .build()?;
        Ok(Self { client })
    }

    /// Get the singleton instance of OctocrabClient.
    pub fn get() -> Result<&'static Self> {
        let result = OCTOCRAB_CLIENT.get_or_init(|| Self::new().map_err(|e| e.to_string()));

        match result {
            Ok(client) => Ok(client),
            Err(e) => Err(GitHubError::TokenError(e.clone())),
        }
    }

    /// Execute a GraphQL query and deserialize the response.
    ///
    /// Automatically handles the `data` wrapper and `errors` field from GitHub
    /// GraphQL responses. Returns the unwrapped data on success, or an error
    /// if the response contains GraphQL errors.
    pub async fn graphql<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T> {
        let body = serde_json::json!({
            "query": query,
            "variables": variables,
        });
        let response: GraphQLResponse<T> = self.client.graphql(&body).await?;

        if let Some(errors) = response.errors {
            let messages: Vec<&str> = errors.iter().map(|e| e.message.as_str()).collect();
            return Err(GitHubError::GraphQLError(messages.join(", ")));
        }

        response
            .data
            .ok_or_else(|| GitHubError::GraphQLError("No data in response".to_string()))
    }

    /// GET every page of a REST listing until a short page is returned.
    pub(crate) async fn get_all_pages<T: DeserializeOwned>(
        &self,
        route: &str,
        extra: &[(&str, &str)],
    ) -> Result<Vec<T>> {
        let mut all = Vec::new();
        let mut page = 1;
        loop {
            let params = page_params(page, extra);
            let items: Vec<T> = self.client.get(route, Some(&params)).await?;
            let len = items.len();
            all.extend(items);
            if len < PER_PAGE as usize {
                break;
            }
            page += 1;
        }
        tracing::debug!(route, count = all.len(), "fetched paginated listing");
        Ok(all)
    }

    /// Run a search query over every result page (GitHub returns at most 1000 items).
    pub(crate) async fn search_all<T: DeserializeOwned>(
        &self,
        route: &str,
        query: &str,
    ) -> Result<Vec<T>> {
        let mut all = Vec::new();
        for page in 1..=MAX_SEARCH_PAGES {
            let params = page_params(page, &[("q", query)]);
            let result: SearchPage<T> = self.client.get(route, Some(&params)).await?;
            let len = result.items.len();
            all.extend(result.items);
            if len < PER_PAGE as usize || all.len() as u64 >= result.total_count {
                break;
            }
        }
        tracing::debug!(query, count = all.len(), "search finished");
        Ok(all)
    }
}

/// Resolve the API token: `GITHUB_TOKEN` first, then the GitHub CLI session.
fn resolve_token() -> Result<String> {
    if let Some(token) = EnvVars::load().github_token {
        return Ok(token);
    }
    get_gh_token()
}

/// Get GitHub token from `gh auth token` command.
/// This reuses the authentication from GitHub CLI.
fn get_gh_token() -> Result<String> {
    let output = Command::new("gh")
        .args(["auth", "token"])
        .output()
        .map_err(|e| GitHubError::TokenError(format!("Failed to run gh auth token: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(GitHubError::TokenError(format!(
            "gh auth token failed: {stderr}"
        )));
    }

    let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if token.is_empty() {
        return Err(GitHubError::TokenError(
            "gh auth token returned empty token".to_string(),
        ));
    }

    Ok(token)
}
