//! GitHub API error types.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GitHubError {
    #[error("Failed to get GitHub token: {0}")]
    TokenError(String),

    #[error("{}", format_octocrab_error(.0))]
    ApiError(#[from] octocrab::Error),

    #[error("GraphQL error: {0}")]
    GraphQLError(String),

    #[error("Invalid repository '{0}': expected owner/name")]
    InvalidRepo(String),
}

impl GitHubError {
    /// True when the API answered with HTTP 404.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            GitHubError::ApiError(octocrab::Error::GitHub { source, .. })
                if source.status_code.as_u16() == 404
        )
    }
}

pub type Result<T> = std::result::Result<T, GitHubError>;

/// Format octocrab::Error to extract detailed error information from GitHub API responses.
fn format_octocrab_error(err: &octocrab::Error) -> String {
    match err {
        octocrab::Error::GitHub { source, .. } => {
            let mut msg = format!(
                "GitHub API error: {} (HTTP {})",
                source.message,
                source.status_code.as_u16()
            );

            if let Some(errors) = &source.errors {
                msg.push_str(&format_error_details(errors));
            }

            msg
        }
        _ => format!("GitHub API error: {err}"),
    }
}

/// Format error details from GitHub API errors array.
/// Returns a formatted string like "[field1 is code1, field2 is code2]" or empty string.
fn format_error_details(errors: &[serde_json::Value]) -> String {
    let error_details: Vec<String> = errors
        .iter()
        .filter_map(|e| {
            let field = e.get("field").and_then(|v| v.as_str());
            let code = e.get("code").and_then(|v| v.as_str());
            match (field, code) {
                (Some(f), Some(c)) => Some(format!("{f} is {c}")),
                (Some(f), None) => Some(f.to_string()),
                (None, Some(c)) => Some(c.to_string()),
                (None, None) => None,
            }
        })
        .collect();

    if error_details.is_empty() {
        String::new()
    } else {
        format!(" [{}]", error_details.join(", "))
    }
}
