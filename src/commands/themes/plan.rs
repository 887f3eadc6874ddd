//! Derive the issue to create from a schedule row.

use chrono::NaiveDate;
use indoc::formatdoc;

use super::schedule::ScheduleRow;
use crate::infra::github::{NewIssue, RepoName};

/// Everything needed to create one release theme issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedIssue {
    pub title: String,
    pub body: String,
    pub repo: RepoName,
    /// Base labels followed by the build label, without duplicates.
    pub labels: Vec<String>,
    pub product: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl PlannedIssue {
    pub fn to_new_issue(&self) -> NewIssue {
        NewIssue {
            title: self.title.clone(),
            body: self.body.clone(),
            labels: self.labels.clone(),
        }
    }
}

pub fn build_label(build_number: u32) -> String {
    format!("B{build_number}")
}

pub fn plan_issue(row: &ScheduleRow, build_number: u32, base_labels: &[String]) -> PlannedIssue {
    let build_label = build_label(build_number);

    let mut labels: Vec<String> = Vec::with_capacity(base_labels.len() + 1);
    for label in base_labels.iter().chain(std::iter::once(&build_label)) {
        if !labels.contains(label) {
            labels.push(label.clone());
        }
    }

    PlannedIssue {
        title: format!("{build_label} {}", row.title),
        body: render_body(&row.description, &row.checklist),
        repo: row.repo.clone(),
        labels,
        product: row.product.clone(),
        start_date: row.start_date,
        end_date: row.end_date,
    }
}

pub fn render_body(description: &str, checklist: &[String]) -> String {
    let mut body = formatdoc! {"
        ## Are you sure this is not a new requirement or bug?
        Yes

        ## 💡 Description
        {description}
    ", description = description};

    let items: Vec<&str> = checklist
        .iter()
        .map(|item| item.trim())
        .filter(|item| !item.is_empty())
        .collect();
    if !items.is_empty() {
        body.push_str("\n## ✅ Checklist\n");
        for item in items {
            body.push_str(&format!("- [ ] {item}\n"));
        }
    }
    body
}
