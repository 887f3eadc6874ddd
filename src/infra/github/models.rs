//! REST payload models shared by the issue, label and search clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
}

/// Issue as returned by the issue listing and search endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct IssueSummary {
    pub number: u64,
    pub title: String,
    pub html_url: String,
    pub state: String,
    #[serde(default)]
    pub node_id: String,
    #[serde(default)]
    pub labels: Vec<Label>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub closed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub pull_request: Option<serde_json::Value>,
}

impl IssueSummary {
    pub fn label_names(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(|l| l.name.as_str())
    }

    pub fn has_label(&self, name: &str) -> bool {
        self.label_names().any(|l| l == name)
    }

    pub fn is_pull_request(&self) -> bool {
        self.pull_request.is_some()
    }

    pub fn is_closed(&self) -> bool {
        self.state.eq_ignore_ascii_case("closed")
    }

    /// Repository name taken from `html_url`
    /// (`https://github.com/{owner}/{repo}/issues/{n}`).
    pub fn repo_name(&self) -> Option<&str> {
        let mut parts = self.html_url.trim_end_matches('/').rsplit('/');
        let _number = parts.next()?;
        let _kind = parts.next()?;
        parts.next().filter(|name| !name.is_empty())
    }
}

/// Result of a successful issue creation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreatedIssue {
    pub number: u64,
    pub html_url: String,
    pub node_id: String,
}

/// Sub-issue reference returned by the sub-issues endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct SubIssue {
    pub number: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn issue(html_url: &str) -> IssueSummary {
        serde_json::from_value(json!({
            "number": 7,
            "title": "Fix",
            "html_url": html_url,
            "state": "open",
            "labels": [{"name": "bug"}, {"name": "s.high"}],
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-02T00:00:00Z"
        }))
        .unwrap()
    }

    #[test]
    fn repo_name_is_parsed_from_html_url() {
        let issue = issue("https://github.com/NASA-PDS/validate/issues/7");
        assert_eq!(issue.repo_name(), Some("validate"));
    }

    #[test]
    fn repo_name_is_none_for_short_url() {
        let issue = issue("7");
        assert_eq!(issue.repo_name(), None);
    }

    #[test]
    fn labels_and_state_helpers() {
        let issue = issue("https://github.com/NASA-PDS/validate/issues/7");
        assert!(issue.has_label("bug"));
        assert!(!issue.has_label("enhancement"));
        assert!(!issue.is_closed());
        assert!(!issue.is_pull_request());
        assert_eq!(issue.closed_at, None);
    }
}
