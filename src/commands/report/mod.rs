//! Organization issue reports: Markdown planning / known-bugs reports and the
//! reStructuredText release description document.

pub(crate) mod collect;
pub(crate) mod hierarchy;
pub(crate) mod markdown;
pub(crate) mod products;
pub(crate) mod rst;

use std::collections::HashMap;
use std::path::PathBuf;

use chrono::{DateTime, Local, NaiveDate, Utc};
use clap::{Args, ValueEnum};

use crate::infra::github::{OctocrabClient, RepoName};
use crate::shared::config::{Config, load_config};

use collect::{CollectOptions, IssueState, IssueType, RepoIssues, collect_issues, parse_time};
use hierarchy::{Hierarchy, build_hierarchy};
use markdown::{MarkdownOptions, ReportKind, all_issues, render_markdown};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Md,
    Rst,
}

impl ReportFormat {
    fn default_output(self) -> PathBuf {
        match self {
            ReportFormat::Md => PathBuf::from("pdsen_issues.md"),
            ReportFormat::Rst => PathBuf::from("pdsen_issues.rst"),
        }
    }
}

#[derive(Args, Clone, PartialEq, Eq, Debug)]
pub struct ReportArgs {
    /// GitHub organization (defaults to github.org from the config)
    #[arg(long)]
    pub org: Option<String>,

    /// Repository names to include (all repositories when omitted)
    #[arg(long = "repo", num_args = 1..)]
    pub repos: Vec<String>,

    /// Issue state to report on
    #[arg(long, value_enum, default_value = "all")]
    pub state: IssueState,

    /// Start of the period, ISO 8601 (e.g. 2025-01-01T00:00:00+00:00)
    #[arg(long, value_parser = parse_time)]
    pub start_time: Option<DateTime<Utc>>,

    /// End of the period, ISO 8601
    #[arg(long, value_parser = parse_time)]
    pub end_time: Option<DateTime<Utc>>,

    /// Output format
    #[arg(long, value_enum, default_value = "md")]
    pub format: ReportFormat,

    /// Markdown report to produce
    #[arg(long, value_enum, default_value = "planning")]
    pub report: ReportKind,

    /// Build label shown in the release description document (e.g. B17)
    #[arg(long)]
    pub build: Option<String>,

    /// Group repositories by component using the products file (Markdown only)
    #[arg(long)]
    pub group_by_component: bool,

    /// List sub-issues under their parent issues (Markdown only)
    #[arg(long)]
    pub show_parent_child: bool,

    /// Output file (defaults to pdsen_issues.md or pdsen_issues.rst)
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// GitHub token (defaults to GITHUB_TOKEN, then `gh auth token`)
    #[arg(long)]
    pub token: Option<String>,
}

pub async fn run(args: &ReportArgs) -> anyhow::Result<()> {
    let config = load_config()?;

    let owned;
    let client = match &args.token {
        Some(token) => {
            owned = OctocrabClient::with_token(token)?;
            &owned
        }
        None => OctocrabClient::get()?,
    };

    let today = Local::now().date_naive();
    let report = run_with_client(args, &config, client, today).await?;

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| args.format.default_output());
    std::fs::write(&output, report)?;
    println!("Report written to {}", output.display());
    Ok(())
}

/// Collect issues and render the requested report.
pub(crate) async fn run_with_client(
    args: &ReportArgs,
    config: &Config,
    client: &OctocrabClient,
    today: NaiveDate,
) -> anyhow::Result<String> {
    let org = args.org.clone().unwrap_or_else(|| config.github.org.clone());
    let options = CollectOptions {
        org: org.clone(),
        repos: args.repos.clone(),
        state: args.state,
        start_time: args.start_time,
        end_time: args.end_time,
    };
    tracing::info!(org = %org, format = ?args.format, "generating issue report");
    let issues = collect_issues(client, &options).await?;

    if args.format == ReportFormat::Rst {
        return Ok(rst::render_rdd(&issues, args.build.as_deref()));
    }

    let repo_products = if args.group_by_component {
        products::load_products(&config.report.products_config).map(|p| p.repo_products())
    } else {
        None
    };

    let hierarchies = if args.show_parent_child {
        fetch_hierarchies(client, &org, &issues, args.report).await
    } else {
        HashMap::new()
    };

    Ok(render_markdown(
        &issues,
        &MarkdownOptions {
            kind: args.report,
            state: args.state,
            start_time: args.start_time,
            end_time: args.end_time,
            products: repo_products.as_ref(),
            hierarchies: &hierarchies,
            today,
        },
    ))
}

async fn fetch_hierarchies(
    client: &OctocrabClient,
    org: &str,
    issues: &RepoIssues,
    kind: ReportKind,
) -> HashMap<String, Hierarchy> {
    let mut hierarchies = HashMap::new();
    for (repo, by_type) in issues {
        let list = match kind {
            ReportKind::Planning => all_issues(by_type),
            ReportKind::KnownBugs => by_type
                .get(&IssueType::Bug)
                .map(|bugs| bugs.iter().collect())
                .unwrap_or_default(),
        };
        if list.is_empty() {
            continue;
        }
        let hierarchy = build_hierarchy(client, &RepoName::new(org, repo), &list).await;
        hierarchies.insert(repo.clone(), hierarchy);
    }
    hierarchies
}
