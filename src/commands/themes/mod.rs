//! Create release theme issues for a build from a CSV schedule.

pub(crate) mod outcome;
pub(crate) mod pipeline;
pub(crate) mod plan;
pub(crate) mod schedule;

use std::path::PathBuf;

use clap::Args;

use crate::infra::github::OctocrabClient;
use crate::shared::config::{Config, load_config};

use outcome::{Outcome, OutcomeRecord, RowRef};
use pipeline::Pipeline;
use plan::{build_label, plan_issue};
use schedule::{RowParseError, ScheduleRow, load_schedule};

#[derive(Args, Clone, PartialEq, Eq, Debug)]
pub struct ThemesArgs {
    /// Path to the CSV file containing the release theme schedule
    #[arg(long)]
    pub csv_file: PathBuf,

    /// Build number (e.g. 17 for B17)
    #[arg(long)]
    pub build_number: u32,

    /// Preview what would be created without creating anything
    #[arg(long)]
    pub dry_run: bool,

    /// GitHub token (defaults to GITHUB_TOKEN, then `gh auth token`)
    #[arg(long)]
    pub token: Option<String>,
}

pub async fn run(args: &ThemesArgs) -> anyhow::Result<()> {
    let config = load_config()?;
    // A broken schedule is fatal before any API call.
    let rows = load_schedule(&args.csv_file)?;

    let owned;
    let client = match &args.token {
        Some(token) => {
            owned = OctocrabClient::with_token(token)?;
            &owned
        }
        None => OctocrabClient::get()?,
    };

    if args.dry_run {
        println!("[dry-run] No issues, labels or project items will be created.");
    }

    let records = run_with_client(args, &config, rows, client).await;
    print!("{}", outcome::render_summary(&records, args.dry_run));
    outcome::ensure_no_failures(&records)
}

/// Process every row in file order and return one outcome per row.
pub(crate) async fn run_with_client(
    args: &ThemesArgs,
    config: &Config,
    rows: Vec<Result<ScheduleRow, RowParseError>>,
    client: &OctocrabClient,
) -> Vec<OutcomeRecord> {
    let mut pipeline = Pipeline::new(
        build_label(args.build_number),
        config.themes.build_label_color.clone(),
        args.dry_run,
    );
    pipeline
        .resolve_boards(
            client,
            &config.github.org,
            config.themes.tracking_project.as_deref(),
        )
        .await;

    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        let record = match row {
            Ok(row) => {
                let planned = plan_issue(&row, args.build_number, &config.themes.labels);
                pipeline.process(client, row.line, &planned).await
            }
            Err(e) => {
                tracing::error!(line = e.line, title = %e.title, error = %e.message, "skipping invalid row");
                OutcomeRecord::new(
                    RowRef {
                        line: e.line,
                        title: e.title.clone(),
                        repo: None,
                    },
                    Outcome::Failed {
                        error: e.to_string(),
                    },
                )
            }
        };
        records.push(record);
    }
    records
}
