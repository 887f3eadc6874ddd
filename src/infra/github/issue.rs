//! Issue operations.

use serde::Serialize;

use super::client::OctocrabClient;
use super::error::Result;
use super::models::{CreatedIssue, IssueSummary, SubIssue};
use super::repo::RepoName;

/// Parameters for creating an issue.
#[derive(Debug, Clone, Serialize)]
pub struct NewIssue {
    pub title: String,
    pub body: String,
    pub labels: Vec<String>,
}

/// Trait for issue operations.
#[async_trait::async_trait]
pub trait IssueClient: Send + Sync {
    /// Create an issue and return its URL and node id.
    async fn create_issue(&self, repo: &RepoName, issue: &NewIssue) -> Result<CreatedIssue>;

    /// List issues in a state (`open`, `closed`, `all`) carrying every label in `labels`.
    /// Pull requests are filtered out.
    async fn list_issues(
        &self,
        repo: &RepoName,
        state: &str,
        labels: &[&str],
    ) -> Result<Vec<IssueSummary>>;

    /// Add labels to an issue.
    async fn add_labels(&self, repo: &RepoName, issue_number: u64, labels: &[String])
    -> Result<()>;

    /// Numbers of the native sub-issues of an issue. A 404 means "none".
    async fn sub_issue_numbers(&self, repo: &RepoName, issue_number: u64) -> Result<Vec<u64>>;
}

#[async_trait::async_trait]
impl IssueClient for OctocrabClient {
    async fn create_issue(&self, repo: &RepoName, issue: &NewIssue) -> Result<CreatedIssue> {
        let route = format!("{}/issues", repo.route());
        let created: CreatedIssue = self.client.post(route, Some(issue)).await?;
        tracing::debug!(repo = %repo, number = created.number, "issue created");
        Ok(created)
    }

    async fn list_issues(
        &self,
        repo: &RepoName,
        state: &str,
        labels: &[&str],
    ) -> Result<Vec<IssueSummary>> {
        let route = format!("{}/issues", repo.route());
        let labels = labels.join(",");
        let mut extra = vec![("state", state)];
        if !labels.is_empty() {
            extra.push(("labels", labels.as_str()));
        }
        let issues: Vec<IssueSummary> = self.get_all_pages(&route, &extra).await?;
        Ok(issues
            .into_iter()
            .filter(|issue| !issue.is_pull_request())
            .collect())
    }

    async fn add_labels(
        &self,
        repo: &RepoName,
        issue_number: u64,
        labels: &[String],
    ) -> Result<()> {
        let route = format!("{}/issues/{issue_number}/labels", repo.route());
        let body = serde_json::json!({ "labels": labels });
        let _: serde_json::Value = self.client.post(route, Some(&body)).await?;
        Ok(())
    }

    async fn sub_issue_numbers(&self, repo: &RepoName, issue_number: u64) -> Result<Vec<u64>> {
        let route = format!("{}/issues/{issue_number}/sub_issues", repo.route());
        match self.get_all_pages::<SubIssue>(&route, &[]).await {
            Ok(subs) => Ok(subs.into_iter().map(|s| s.number).collect()),
            Err(e) if e.is_not_found() => {
                tracing::debug!(repo = %repo, issue_number, "no sub-issues");
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::github::mock::GitHubMockServer;

    #[tokio::test]
    async fn create_issue_returns_url_and_node_id() {
        let mock = GitHubMockServer::start().await;
        mock.repo("NASA-PDS", "validate")
            .issue(42)
            .title("B17 Sprint kickoff")
            .create()
            .await;
        let client = mock.client();

        let created = client
            .create_issue(
                &RepoName::new("NASA-PDS", "validate"),
                &NewIssue {
                    title: "B17 Sprint kickoff".to_string(),
                    body: "body".to_string(),
                    labels: vec!["theme".to_string()],
                },
            )
            .await
            .unwrap();

        assert_eq!(created.number, 42);
        assert_eq!(
            created.html_url,
            "https://github.com/NASA-PDS/validate/issues/42"
        );
        assert_eq!(created.node_id, "I_42");
    }

    #[tokio::test]
    async fn list_issues_skips_pull_requests() {
        let mock = GitHubMockServer::start().await;
        let ctx = mock.repo("NASA-PDS", "validate");
        ctx.list_issues(&[
            ctx.issue(1).title("Real bug").labels(vec!["bug"]).to_json(),
            ctx.issue(2).title("A PR").pull_request().to_json(),
        ])
        .await;
        let client = mock.client();

        let issues = client
            .list_issues(&RepoName::new("NASA-PDS", "validate"), "open", &["bug"])
            .await
            .unwrap();

        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].number, 1);
    }

    #[tokio::test]
    async fn sub_issue_numbers_treats_not_found_as_empty() {
        let mock = GitHubMockServer::start().await;
        mock.repo("NASA-PDS", "validate")
            .issue(3)
            .sub_issues_not_found()
            .await;
        let client = mock.client();

        let subs = client
            .sub_issue_numbers(&RepoName::new("NASA-PDS", "validate"), 3)
            .await
            .unwrap();
        assert!(subs.is_empty());
    }

    #[tokio::test]
    async fn sub_issue_numbers_lists_children() {
        let mock = GitHubMockServer::start().await;
        mock.repo("NASA-PDS", "validate")
            .issue(3)
            .sub_issues(&[4, 5])
            .await;
        let client = mock.client();

        let subs = client
            .sub_issue_numbers(&RepoName::new("NASA-PDS", "validate"), 3)
            .await
            .unwrap();
        assert_eq!(subs, vec![4, 5]);
    }
}
