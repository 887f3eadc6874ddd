//! Repository names in `owner/name` form.

use std::fmt;
use std::str::FromStr;

use lazy_regex::regex_is_match;

use super::error::GitHubError;

/// A repository identified by owner and name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RepoName {
    pub owner: String,
    pub name: String,
}

impl RepoName {
    pub fn new(owner: &str, name: &str) -> Self {
        Self {
            owner: owner.to_string(),
            name: name.to_string(),
        }
    }

    /// REST route prefix, e.g. `/repos/NASA-PDS/validate`.
    pub fn route(&self) -> String {
        format!("/repos/{}/{}", self.owner, self.name)
    }
}

impl FromStr for RepoName {
    type Err = GitHubError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if !regex_is_match!(r"^[A-Za-z0-9][A-Za-z0-9-]*/[A-Za-z0-9._-]+$", s) {
            return Err(GitHubError::InvalidRepo(s.to_string()));
        }
        let (owner, name) = s
            .split_once('/')
            .ok_or_else(|| GitHubError::InvalidRepo(s.to_string()))?;
        Ok(Self::new(owner, name))
    }
}

impl fmt::Display for RepoName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}
