//! Per-row outcomes and the end-of-run summary.

use std::fmt::Write as _;

use crate::infra::github::RepoName;

const RULE_WIDTH: usize = 60;

/// Which row of the schedule an outcome belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowRef {
    pub line: u64,
    /// Final (build-prefixed) title, or the raw title when the row did not parse.
    pub title: String,
    pub repo: Option<RepoName>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Created { url: String },
    /// Dry run: the issue would have been created.
    WouldCreate,
    /// An issue with the same title already exists.
    Skipped { existing_url: String },
    Failed { error: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Created,
    Skipped,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutcomeRecord {
    pub row: RowRef,
    pub outcome: Outcome,
    /// Board or field updates that failed after the issue was created.
    pub warnings: Vec<String>,
}

impl OutcomeRecord {
    pub fn new(row: RowRef, outcome: Outcome) -> Self {
        Self {
            row,
            outcome,
            warnings: Vec::new(),
        }
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings = warnings;
        self
    }

    pub fn status(&self) -> Status {
        match self.outcome {
            Outcome::Created { .. } | Outcome::WouldCreate => Status::Created,
            Outcome::Skipped { .. } => Status::Skipped,
            Outcome::Failed { .. } => Status::Failed,
        }
    }

    pub fn url(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Created { url } => Some(url),
            Outcome::Skipped { existing_url } => Some(existing_url),
            Outcome::WouldCreate | Outcome::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Failed { error } => Some(error),
            _ => None,
        }
    }
}

/// Number of rows per status.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Counts {
    pub created: usize,
    pub skipped: usize,
    pub failed: usize,
}

pub fn count(records: &[OutcomeRecord]) -> Counts {
    records.iter().fold(Counts::default(), |mut counts, record| {
        match record.status() {
            Status::Created => counts.created += 1,
            Status::Skipped => counts.skipped += 1,
            Status::Failed => counts.failed += 1,
        }
        counts
    })
}

pub fn has_failures(records: &[OutcomeRecord]) -> bool {
    records.iter().any(|r| r.status() == Status::Failed)
}

/// Error out when any row failed, so the process exits non-zero.
pub fn ensure_no_failures(records: &[OutcomeRecord]) -> anyhow::Result<()> {
    if has_failures(records) {
        anyhow::bail!("{} release theme(s) failed", count(records).failed);
    }
    Ok(())
}

/// Render the summary printed at the end of a run.
pub fn render_summary(records: &[OutcomeRecord], dry_run: bool) -> String {
    let counts = count(records);
    let rule = "=".repeat(RULE_WIDTH);
    let created_label = if dry_run { "would create" } else { "created" };
    let mut out = String::new();

    let _ = writeln!(out, "\n{rule}");
    let _ = writeln!(
        out,
        "Summary: {} {created_label}, {} skipped, {} failed",
        counts.created, counts.skipped, counts.failed
    );
    let _ = writeln!(out, "{rule}");

    let created: Vec<_> = records
        .iter()
        .filter(|r| matches!(r.outcome, Outcome::Created { .. }))
        .collect();
    if !created.is_empty() {
        let _ = writeln!(out, "\nCreated issues:");
        for record in created {
            let _ = writeln!(out, "  ✓ {}", record.row.title);
            if let Some(url) = record.url() {
                let _ = writeln!(out, "    {url}");
            }
            write_warnings(&mut out, record);
        }
    }

    let planned: Vec<_> = records
        .iter()
        .filter(|r| r.outcome == Outcome::WouldCreate)
        .collect();
    if !planned.is_empty() {
        let _ = writeln!(out, "\nWould create (dry run):");
        for record in planned {
            match &record.row.repo {
                Some(repo) => {
                    let _ = writeln!(out, "  ✓ {} ({repo})", record.row.title);
                }
                None => {
                    let _ = writeln!(out, "  ✓ {}", record.row.title);
                }
            }
            write_warnings(&mut out, record);
        }
    }

    let skipped: Vec<_> = records
        .iter()
        .filter(|r| r.status() == Status::Skipped)
        .collect();
    if !skipped.is_empty() {
        let _ = writeln!(out, "\nSkipped issues (already exist):");
        for record in skipped {
            let _ = writeln!(out, "  ⊙ {}", record.row.title);
            if let Some(url) = record.url() {
                let _ = writeln!(out, "    {url}");
            }
        }
    }

    let failed: Vec<_> = records
        .iter()
        .filter(|r| r.status() == Status::Failed)
        .collect();
    if !failed.is_empty() {
        let _ = writeln!(out, "\nFailed issues:");
        for record in failed {
            let _ = writeln!(
                out,
                "  ✗ {}: {}",
                record.row.title,
                record.error().unwrap_or_default()
            );
        }
    }

    out
}

fn write_warnings(out: &mut String, record: &OutcomeRecord) {
    for warning in &record.warnings {
        let _ = writeln!(out, "    ! {warning}");
    }
}
