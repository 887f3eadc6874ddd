//! Attach a version label to every open bug of a repository.

use clap::Args;

use crate::infra::github::{IssueClient, LabelClient, OctocrabClient, RepoName};
use crate::shared::config::{Config, load_config};

const BUG_LABEL: &str = "bug";

#[derive(Args, Clone, PartialEq, Eq, Debug)]
pub struct LabelBugsArgs {
    /// Repository name (e.g. validate)
    #[arg(long)]
    pub repo: String,

    /// Version label to add (e.g. 3.5.0)
    #[arg(long)]
    pub label: String,

    /// GitHub organization (defaults to github.org from the config)
    #[arg(long)]
    pub org: Option<String>,

    /// Show which issues would be labelled without changing anything
    #[arg(long)]
    pub dry_run: bool,

    /// GitHub token (defaults to GITHUB_TOKEN, then `gh auth token`)
    #[arg(long)]
    pub token: Option<String>,
}

/// What happened to one bug.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelResult {
    Labelled,
    WouldLabel,
    AlreadyLabelled,
}

pub async fn run(args: &LabelBugsArgs) -> anyhow::Result<()> {
    let config = load_config()?;

    let owned;
    let client = match &args.token {
        Some(token) => {
            owned = OctocrabClient::with_token(token)?;
            &owned
        }
        None => OctocrabClient::get()?,
    };

    let results = run_with_client(args, &config, client).await?;
    let labelled = results
        .iter()
        .filter(|(_, r)| *r != LabelResult::AlreadyLabelled)
        .count();
    println!(
        "{}{labelled} of {} open bug(s) labelled '{}'",
        if args.dry_run { "[dry-run] " } else { "" },
        results.len(),
        args.label
    );
    Ok(())
}

/// Ensure the label exists, then add it to each open bug.
/// Returns (issue number, result) per bug in listing order.
pub(crate) async fn run_with_client(
    args: &LabelBugsArgs,
    config: &Config,
    client: &OctocrabClient,
) -> anyhow::Result<Vec<(u64, LabelResult)>> {
    let org = args.org.as_deref().unwrap_or(&config.github.org);
    let repo = RepoName::new(org, &args.repo);

    let existing = client.list_labels(&repo).await?;
    if existing.iter().any(|l| *l == args.label) {
        tracing::debug!(repo = %repo, label = %args.label, "label exists");
    } else if args.dry_run {
        println!("[dry-run] Would create label '{}' in {repo}", args.label);
    } else {
        client
            .create_label(&repo, &args.label, &config.labels.version_label_color)
            .await?;
    }

    let bugs = client.list_issues(&repo, "open", &[BUG_LABEL]).await?;
    tracing::info!(repo = %repo, count = bugs.len(), "found open bugs");

    let labels = vec![args.label.clone()];
    let mut results = Vec::with_capacity(bugs.len());
    for bug in bugs {
        let result = if bug.has_label(&args.label) {
            LabelResult::AlreadyLabelled
        } else if args.dry_run {
            LabelResult::WouldLabel
        } else {
            client.add_labels(&repo, bug.number, &labels).await?;
            LabelResult::Labelled
        };

        let marker = match result {
            LabelResult::Labelled => "+",
            LabelResult::WouldLabel => "~",
            LabelResult::AlreadyLabelled => "=",
        };
        println!("  {marker} {repo}#{} {}", bug.number, bug.title);
        results.push((bug.number, result));
    }
    Ok(results)
}
