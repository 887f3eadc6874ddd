//! Repository label operations.

use super::client::OctocrabClient;
use super::error::Result;
use super::models::Label;
use super::repo::RepoName;

/// Trait for repository label operations.
#[async_trait::async_trait]
pub trait LabelClient: Send + Sync {
    /// Names of every label defined in the repository.
    async fn list_labels(&self, repo: &RepoName) -> Result<Vec<String>>;

    /// Create a label. `color` is a hex string with or without a leading '#'.
    async fn create_label(&self, repo: &RepoName, name: &str, color: &str) -> Result<()>;
}

#[async_trait::async_trait]
impl LabelClient for OctocrabClient {
    async fn list_labels(&self, repo: &RepoName) -> Result<Vec<String>> {
        let route = format!("{}/labels", repo.route());
        let labels: Vec<Label> = self.get_all_pages(&route, &[]).await?;
        Ok(labels.into_iter().map(|l| l.name).collect())
    }

    async fn create_label(&self, repo: &RepoName, name: &str, color: &str) -> Result<()> {
        let route = format!("{}/labels", repo.route());
        let body = serde_json::json!({
            "name": name,
            "color": color.trim_start_matches('#'),
        });
        let _: Label = self.client.post(route, Some(&body)).await?;
        tracing::info!(repo = %repo, label = name, "created label");
        Ok(())
    }
}
