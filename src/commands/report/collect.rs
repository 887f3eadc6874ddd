//! Organization-wide issue collection grouped by repository and issue type.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::infra::github::{IssueSummary, OctocrabClient, SearchClient};

/// Labels that exclude an issue from every report.
pub const IGNORE_LABELS: [&str; 3] = ["wontfix", "duplicate", "invalid"];

/// Priorities that put an issue "on deck".
pub const TOP_PRIORITIES: [&str; 3] = ["p.must-have", "s.high", "s.critical"];

/// Issue type labels, in search order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IssueType {
    Bug,
    Enhancement,
    Requirement,
    Theme,
    Task,
}

impl IssueType {
    pub const ALL: [IssueType; 5] = [
        IssueType::Bug,
        IssueType::Enhancement,
        IssueType::Requirement,
        IssueType::Theme,
        IssueType::Task,
    ];

    pub fn label(self) -> &'static str {
        match self {
            IssueType::Bug => "bug",
            IssueType::Enhancement => "enhancement",
            IssueType::Requirement => "requirement",
            IssueType::Theme => "theme",
            IssueType::Task => "task",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            IssueType::Bug => "Bug",
            IssueType::Enhancement => "Enhancement",
            IssueType::Requirement => "Requirement",
            IssueType::Theme => "Theme",
            IssueType::Task => "Task",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.label() == label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum IssueState {
    Open,
    Closed,
    All,
}

impl IssueState {
    fn qualifier(self) -> Option<&'static str> {
        match self {
            IssueState::Open => Some("is:open"),
            IssueState::Closed => Some("is:closed"),
            IssueState::All => None,
        }
    }
}

/// What to collect.
#[derive(Debug, Clone)]
pub struct CollectOptions {
    pub org: String,
    /// Repository names to keep; empty keeps every repository.
    pub repos: Vec<String>,
    pub state: IssueState,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

/// Issues of one repository keyed by type.
pub type IssuesByType = BTreeMap<IssueType, Vec<IssueSummary>>;

/// Issues keyed by repository name, then type.
pub type RepoIssues = BTreeMap<String, IssuesByType>;

/// Search query for one issue type.
pub fn build_query(options: &CollectOptions, issue_type: IssueType) -> String {
    let mut parts = vec![
        format!("org:{}", options.org),
        format!("label:{}", issue_type.label()),
        "is:issue".to_string(),
    ];
    if let Some(state) = options.state.qualifier() {
        parts.push(state.to_string());
    }

    match (options.state, options.start_time, options.end_time) {
        (IssueState::Closed, Some(start), Some(end)) => parts.push(format!(
            "closed:{}..{}",
            start.format("%Y-%m-%d"),
            end.format("%Y-%m-%d")
        )),
        (_, Some(start), _) => parts.push(format!("updated:>={}", start.format("%Y-%m-%d"))),
        _ => {}
    }
    parts.join(" ")
}

/// Run one search per issue type and group the results.
pub async fn collect_issues(
    client: &OctocrabClient,
    options: &CollectOptions,
) -> anyhow::Result<RepoIssues> {
    let mut grouped = RepoIssues::new();
    for issue_type in IssueType::ALL {
        let query = build_query(options, issue_type);
        tracing::info!(%query, "searching issues");
        let found = client.search_issues(&query).await?;
        for issue in found {
            if !keep_issue(&issue, options) {
                continue;
            }
            let Some(repo) = issue.repo_name().map(str::to_string) else {
                tracing::warn!(url = %issue.html_url, "could not determine repository");
                continue;
            };
            grouped
                .entry(repo)
                .or_default()
                .entry(issue_type)
                .or_default()
                .push(issue);
        }
    }
    tracing::info!(repos = grouped.len(), "collected issues");
    Ok(grouped)
}

fn keep_issue(issue: &IssueSummary, options: &CollectOptions) -> bool {
    if issue.is_pull_request() || is_ignored(issue) {
        return false;
    }
    if !options.repos.is_empty() {
        match issue.repo_name() {
            Some(repo) if options.repos.iter().any(|r| r == repo) => {}
            _ => return false,
        }
    }
    within_end_time(issue, options.state, options.end_time)
}

pub fn is_ignored(issue: &IssueSummary) -> bool {
    issue.label_names().any(|l| IGNORE_LABELS.contains(&l))
}

/// The search API only filters by date; this applies the exact end time.
pub fn within_end_time(
    issue: &IssueSummary,
    state: IssueState,
    end_time: Option<DateTime<Utc>>,
) -> bool {
    let Some(end) = end_time else {
        return true;
    };
    let checked = match (state, issue.closed_at) {
        (IssueState::Closed, Some(closed_at)) => closed_at,
        _ => issue.updated_at,
    };
    checked <= end
}

/// First label that looks like a priority (`p.*`) or severity (`s.*`).
pub fn issue_priority(issue: &IssueSummary) -> &str {
    issue
        .label_names()
        .find(|l| l.contains("p.") || l.contains("s."))
        .unwrap_or("unknown")
}

/// First label naming an issue type.
pub fn issue_type(issue: &IssueSummary) -> &str {
    issue
        .label_names()
        .find(|l| IssueType::from_label(l).is_some())
        .unwrap_or("unknown")
}

pub fn is_on_deck(priority: &str) -> bool {
    TOP_PRIORITIES.contains(&priority)
}

/// Parse an ISO 8601 timestamp. Offsets are honoured; a bare date or a
/// timestamp without offset is taken as UTC.
pub fn parse_time(value: &str) -> Result<DateTime<Utc>, String> {
    let value = value.trim();
    if let Ok(time) = DateTime::parse_from_rfc3339(value) {
        return Ok(time.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        return Ok(Utc.from_utc_datetime(&naive));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
        .ok_or_else(|| format!("invalid timestamp '{value}' (expected YYYY-MM-DDTHH:MM:SS+00:00)"))
}
