//! Markdown planning and known-bugs reports.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, NaiveDate, Utc};

use super::collect::{
    IssueState, IssueType, IssuesByType, RepoIssues, is_on_deck, issue_priority, issue_type,
};
use super::hierarchy::Hierarchy;
use super::products::RepoProducts;
use crate::infra::github::IssueSummary;
use crate::shared::markdown::MarkdownDocument;

const PLANNING_COLUMNS: [&str; 5] = ["Issue", "Type", "Priority / Bug Severity", "Status", "On Deck"];
const KNOWN_BUGS_COLUMNS: [&str; 3] = ["Issue", "Severity", "Status"];
const KNOWN_BUGS_INTRO: &str = "Here is the list of the known bug for the current release, \
    click on them for more information and possible work around.";
const CHILD_PREFIX: &str = "  ↳ ";
const OTHER_COMPONENT: &str = "Other";

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportKind {
    Planning,
    KnownBugs,
}

/// Everything the Markdown renderer needs besides the issues.
pub struct MarkdownOptions<'a> {
    pub kind: ReportKind,
    pub state: IssueState,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    /// Set when repositories are grouped by component.
    pub products: Option<&'a RepoProducts>,
    /// Parent/child relations per repository, when requested.
    pub hierarchies: &'a HashMap<String, Hierarchy>,
    pub today: NaiveDate,
}

pub fn render_markdown(issues: &RepoIssues, options: &MarkdownOptions) -> String {
    let title = match options.kind {
        ReportKind::Planning => "PDS EN Issues".to_string(),
        ReportKind::KnownBugs => format!("Known Bugs on {}", options.today.format("%Y-%m-%d")),
    };
    let mut doc = MarkdownDocument::new(&title);

    match options.products {
        Some(products) => {
            let mut by_product: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
            let mut ungrouped: Vec<&str> = Vec::new();
            for repo in issues.keys() {
                match products.get(repo) {
                    Some(product) => by_product.entry(product.as_str()).or_default().push(repo),
                    None => ungrouped.push(repo),
                }
            }

            for (product, repos) in &by_product {
                if !repos.iter().any(|r| has_section(options.kind, &issues[*r])) {
                    continue;
                }
                doc.header(1, &format!("Component: {product}"));
                for repo in repos {
                    repo_section(&mut doc, repo, &issues[*repo], options);
                }
            }
            for repo in ungrouped {
                repo_section(&mut doc, repo, &issues[repo], options);
            }
        }
        None => {
            for (repo, by_type) in issues {
                repo_section(&mut doc, repo, by_type, options);
            }
        }
    }

    summary_metrics(&mut doc, issues, options);
    doc.render()
}

fn has_section(kind: ReportKind, by_type: &IssuesByType) -> bool {
    match kind {
        ReportKind::Planning => by_type.values().any(|v| !v.is_empty()),
        ReportKind::KnownBugs => by_type.get(&IssueType::Bug).is_some_and(|v| !v.is_empty()),
    }
}

fn repo_section(doc: &mut MarkdownDocument, repo: &str, by_type: &IssuesByType, options: &MarkdownOptions) {
    if !has_section(options.kind, by_type) {
        return;
    }
    let hierarchy = options.hierarchies.get(repo);
    match options.kind {
        ReportKind::Planning => planning_section(doc, repo, by_type, hierarchy),
        ReportKind::KnownBugs => known_bugs_section(doc, repo, by_type, hierarchy),
    }
}

/// Issues of every type, in type order, each issue once.
pub fn all_issues(by_type: &IssuesByType) -> Vec<&IssueSummary> {
    let mut seen = std::collections::HashSet::new();
    by_type
        .values()
        .flatten()
        .filter(|issue| seen.insert(issue.number))
        .collect()
}

fn issue_link(repo: &str, issue: &IssueSummary) -> String {
    format!("[{repo}#{}]({}) - {}", issue.number, issue.html_url, issue.title)
}

fn planning_row(repo: &str, issue: &IssueSummary, prefix: &str, status: Option<&str>) -> Vec<String> {
    let priority = issue_priority(issue);
    vec![
        format!("{prefix}{}", issue_link(repo, issue)),
        issue_type(issue).to_string(),
        priority.to_string(),
        status.unwrap_or(issue.state.as_str()).to_string(),
        if is_on_deck(priority) { "X" } else { "" }.to_string(),
    ]
}

fn planning_section(
    doc: &mut MarkdownDocument,
    repo: &str,
    by_type: &IssuesByType,
    hierarchy: Option<&Hierarchy>,
) {
    doc.header(2, repo);
    let issues = all_issues(by_type);

    let Some(hierarchy) = hierarchy else {
        let rows: Vec<_> = issues.iter().map(|i| planning_row(repo, i, "", None)).collect();
        doc.table(&PLANNING_COLUMNS, &rows);
        return;
    };

    let lookup: HashMap<u64, &IssueSummary> = issues.iter().map(|i| (i.number, *i)).collect();
    let is_closed = |n: &u64| lookup.get(n).is_some_and(|i| i.is_closed());

    // Open parents with finished children are shown as in progress,
    // followed by the finished children only.
    let in_progress: Vec<u64> = hierarchy
        .parents()
        .filter(|(parent, kids)| {
            lookup.get(parent).is_some_and(|p| !p.is_closed()) && kids.iter().any(is_closed)
        })
        .map(|(parent, _)| parent)
        .collect();

    let mut parent_rows = Vec::new();
    for parent in &in_progress {
        if hierarchy.is_child(*parent) {
            continue;
        }
        let Some(issue) = lookup.get(parent) else { continue };
        parent_rows.push(planning_row(repo, issue, "", Some("in progress")));
        for kid in hierarchy.children_of(*parent).unwrap_or_default() {
            if let Some(child) = lookup.get(kid).filter(|c| c.is_closed()) {
                parent_rows.push(planning_row(repo, child, CHILD_PREFIX, None));
            }
        }
    }
    for issue in issues.iter().filter(|i| hierarchy.is_parent(i.number)) {
        if in_progress.contains(&issue.number) {
            continue;
        }
        parent_rows.push(planning_row(repo, issue, "", None));
        for kid in hierarchy.children_of(issue.number).unwrap_or_default() {
            if let Some(child) = lookup.get(kid) {
                parent_rows.push(planning_row(repo, child, CHILD_PREFIX, None));
            }
        }
    }

    let other_rows: Vec<_> = issues
        .iter()
        .filter(|i| !hierarchy.is_parent(i.number) && !hierarchy.is_child(i.number))
        .map(|i| planning_row(repo, i, "", None))
        .collect();

    if !parent_rows.is_empty() {
        doc.header(3, "Parent Issues");
        doc.table(&PLANNING_COLUMNS, &parent_rows);
    }
    if !other_rows.is_empty() {
        doc.header(3, "Other Issues");
        doc.table(&PLANNING_COLUMNS, &other_rows);
    }
}

fn bug_row(repo: &str, issue: &IssueSummary, prefix: &str) -> Vec<String> {
    vec![
        format!("{prefix}{}", issue_link(repo, issue)),
        issue_priority(issue).to_string(),
        issue.state.clone(),
    ]
}

fn known_bugs_section(
    doc: &mut MarkdownDocument,
    repo: &str,
    by_type: &IssuesByType,
    hierarchy: Option<&Hierarchy>,
) {
    let bugs: Vec<&IssueSummary> = by_type
        .get(&IssueType::Bug)
        .map(|v| v.iter().collect())
        .unwrap_or_default();

    doc.header(2, repo);
    doc.line(KNOWN_BUGS_INTRO);

    let mut rows = Vec::new();
    for bug in &bugs {
        if hierarchy.is_some_and(|h| h.is_child(bug.number)) {
            continue;
        }
        rows.push(bug_row(repo, bug, ""));
        let kids = hierarchy.and_then(|h| h.children_of(bug.number)).unwrap_or_default();
        for kid in kids {
            if let Some(child) = bugs.iter().find(|b| b.number == *kid) {
                rows.push(bug_row(repo, child, CHILD_PREFIX));
            }
        }
    }
    doc.table(&KNOWN_BUGS_COLUMNS, &rows);
}

/// Issue counts per type for one repository or component.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TypeCounts(BTreeMap<IssueType, usize>);

impl TypeCounts {
    fn add(&mut self, by_type: &IssuesByType) {
        for (issue_type, issues) in by_type {
            *self.0.entry(*issue_type).or_default() += issues.len();
        }
    }

    pub fn get(&self, issue_type: IssueType) -> usize {
        self.0.get(&issue_type).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.0.values().sum()
    }
}

/// Column order of the metrics table.
const METRIC_TYPES: [IssueType; 5] = [
    IssueType::Bug,
    IssueType::Enhancement,
    IssueType::Requirement,
    IssueType::Task,
    IssueType::Theme,
];

fn metrics_description(options: &MarkdownOptions) -> String {
    let date = |t: Option<DateTime<Utc>>, fallback: &str| {
        t.map_or_else(|| fallback.to_string(), |t| t.format("%Y-%m-%d").to_string())
    };
    match options.state {
        IssueState::Closed => format!(
            "Issues closed between {} and {}",
            date(options.start_time, "start"),
            date(options.end_time, "end")
        ),
        IssueState::Open => "Open issues updated in the specified period".to_string(),
        IssueState::All => "All issues in the specified period".to_string(),
    }
}

fn summary_metrics(doc: &mut MarkdownDocument, issues: &RepoIssues, options: &MarkdownOptions) {
    doc.header(1, "Summary Metrics");
    doc.line(&metrics_description(options));

    let mut grouped: BTreeMap<String, TypeCounts> = BTreeMap::new();
    let first_column = match options.products {
        Some(products) => {
            for (repo, by_type) in issues {
                let component = products.get(repo).map_or(OTHER_COMPONENT, String::as_str);
                grouped.entry(component.to_string()).or_default().add(by_type);
            }
            doc.header(2, "By Component");
            "Component"
        }
        None => {
            for (repo, by_type) in issues {
                grouped.entry(repo.clone()).or_default().add(by_type);
            }
            "Repository"
        }
    };

    let mut totals = TypeCounts::default();
    let mut rows: Vec<Vec<String>> = Vec::with_capacity(grouped.len() + 1);
    for (name, counts) in &grouped {
        let mut row = vec![name.clone()];
        row.extend(METRIC_TYPES.iter().map(|t| counts.get(*t).to_string()));
        row.push(counts.total().to_string());
        rows.push(row);
        for t in METRIC_TYPES {
            *totals.0.entry(t).or_default() += counts.get(t);
        }
    }
    let mut total_row = vec!["**TOTAL**".to_string()];
    total_row.extend(METRIC_TYPES.iter().map(|t| format!("**{}**", totals.get(*t))));
    total_row.push(format!("**{}**", totals.total()));
    rows.push(total_row);

    let mut headers = vec![first_column];
    headers.extend(METRIC_TYPES.iter().map(|t| t.title()));
    headers.push("Total");
    doc.table(&headers, &rows);
}
