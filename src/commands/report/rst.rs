//! Release description document in reStructuredText.

use super::collect::{IssueType, RepoIssues};
use crate::shared::rst::{RstDocument, link};

pub fn render_rdd(issues: &RepoIssues, build: Option<&str>) -> String {
    let title = match build {
        Some(build) => format!("Release Description Document ({build})"),
        None => "Release Description Document".to_string(),
    };
    let mut doc = RstDocument::new(&title);

    for (repo, by_type) in issues {
        if by_type.values().all(Vec::is_empty) {
            continue;
        }
        doc.section(1, repo);
        for issue_type in IssueType::ALL {
            let Some(list) = by_type.get(&issue_type).filter(|l| !l.is_empty()) else {
                continue;
            };
            doc.section(2, issue_type.title());
            let rows: Vec<Vec<String>> = list
                .iter()
                .map(|issue| {
                    vec![
                        link(&format!("{repo}#{}", issue.number), &issue.html_url),
                        issue.title.clone(),
                    ]
                })
                .collect();
            doc.list_table(&["Issue", "Title"], &rows);
        }
    }

    doc.render()
}
