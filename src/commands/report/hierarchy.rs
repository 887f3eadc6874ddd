//! Parent/child relations between reported issues, from the sub-issues API.

use std::collections::HashSet;

use crate::infra::github::{IssueClient, IssueSummary, OctocrabClient, RepoName};

/// Parent issues and their children, restricted to one list of issues.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Hierarchy {
    /// (parent, children) in the order parents appear in the issue list.
    parents: Vec<(u64, Vec<u64>)>,
    children: HashSet<u64>,
}

impl Hierarchy {
    pub fn from_pairs(parents: Vec<(u64, Vec<u64>)>) -> Self {
        let children = parents
            .iter()
            .flat_map(|(_, kids)| kids.iter().copied())
            .collect();
        Self { parents, children }
    }

    pub fn children_of(&self, parent: u64) -> Option<&[u64]> {
        self.parents
            .iter()
            .find(|(number, _)| *number == parent)
            .map(|(_, kids)| kids.as_slice())
    }

    pub fn is_parent(&self, number: u64) -> bool {
        self.children_of(number).is_some()
    }

    pub fn is_child(&self, number: u64) -> bool {
        self.children.contains(&number)
    }

    pub fn parents(&self) -> impl Iterator<Item = (u64, &[u64])> {
        self.parents.iter().map(|(n, kids)| (*n, kids.as_slice()))
    }
}

/// Ask GitHub for the sub-issues of every issue and keep the children that are
/// part of `issues` themselves.
pub async fn build_hierarchy(
    client: &OctocrabClient,
    repo: &RepoName,
    issues: &[&IssueSummary],
) -> Hierarchy {
    let known: HashSet<u64> = issues.iter().map(|i| i.number).collect();
    let mut parents = Vec::new();

    for issue in issues {
        let subs = match client.sub_issue_numbers(repo, issue.number).await {
            Ok(subs) => subs,
            Err(e) => {
                tracing::warn!(repo = %repo, number = issue.number, error = %e, "failed to fetch sub-issues");
                continue;
            }
        };
        let kids: Vec<u64> = subs.into_iter().filter(|n| known.contains(n)).collect();
        if !kids.is_empty() {
            parents.push((issue.number, kids));
        }
    }

    Hierarchy::from_pairs(parents)
}
