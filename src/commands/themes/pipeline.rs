//! Per-row processing: duplicate check, label and board upkeep, issue creation.
//!
//! Every mutating call site checks `dry_run` itself. Reads (search, label
//! listing, project lookup) run in both modes so a dry run reports what a real
//! run would find.

use std::collections::HashSet;

use crate::infra::github::{
    FieldValue, GitHubError, IssueClient, LabelClient, OctocrabClient, ProjectClient, ProjectField,
    ProjectRef, RepoName, SearchClient, quote_phrase,
};

use super::outcome::{Outcome, OutcomeRecord, RowRef};
use super::plan::PlannedIssue;

const PRODUCT_FIELD: &str = "Product";
const START_DATE_FIELD: &str = "Start date";
const END_DATE_FIELD: &str = "End date";

/// A project board issues are added to.
#[derive(Debug, Clone)]
pub struct Board {
    pub project: ProjectRef,
    pub fields: Vec<ProjectField>,
    /// Whether product and date fields are filled in on this board.
    pub set_fields: bool,
}

/// Settings shared by every row of one run.
#[derive(Debug)]
pub struct Pipeline {
    pub build_label: String,
    pub build_label_color: String,
    pub dry_run: bool,
    pub boards: Vec<Board>,
    /// Problems found while resolving boards, attached to every created row.
    pub board_warnings: Vec<String>,
    labelled_repos: HashSet<RepoName>,
}

impl Pipeline {
    pub fn new(build_label: String, build_label_color: String, dry_run: bool) -> Self {
        Self {
            build_label,
            build_label_color,
            dry_run,
            boards: Vec::new(),
            board_warnings: Vec::new(),
            labelled_repos: HashSet::new(),
        }
    }

    /// Look up the tracking board and the build board once for the whole run.
    /// A board that is missing or cannot be read becomes a warning.
    pub async fn resolve_boards(
        &mut self,
        client: &OctocrabClient,
        org: &str,
        tracking_project: Option<&str>,
    ) {
        let mut wanted: Vec<(String, bool)> = Vec::new();
        if let Some(title) = tracking_project {
            wanted.push((title.to_string(), false));
        }
        if !wanted.iter().any(|(title, _)| *title == self.build_label) {
            wanted.push((self.build_label.clone(), true));
        }

        for (title, set_fields) in wanted {
            match resolve_board(client, org, &title, set_fields).await {
                Ok(Some(board)) => {
                    tracing::info!(
                        project = %board.project.title,
                        number = board.project.number,
                        "found project board"
                    );
                    self.boards.push(board);
                }
                Ok(None) => {
                    tracing::warn!(project = %title, org, "project board not found");
                    self.board_warnings
                        .push(format!("project '{title}' not found in {org}"));
                }
                Err(e) => {
                    tracing::warn!(project = %title, error = %e, "failed to look up project board");
                    self.board_warnings
                        .push(format!("failed to look up project '{title}': {e}"));
                }
            }
        }
    }

    /// Run one planned issue through duplicate check, label upkeep and creation.
    pub async fn process(
        &mut self,
        client: &OctocrabClient,
        line: u64,
        planned: &PlannedIssue,
    ) -> OutcomeRecord {
        let row = RowRef {
            line,
            title: planned.title.clone(),
            repo: Some(planned.repo.clone()),
        };
        tracing::info!(title = %planned.title, repo = %planned.repo, "processing release theme");

        match find_existing(client, &planned.repo, &planned.title).await {
            Ok(Some(existing_url)) => {
                tracing::info!(title = %planned.title, url = %existing_url, "issue already exists, skipping");
                return OutcomeRecord::new(row, Outcome::Skipped { existing_url });
            }
            Ok(None) => {}
            Err(e) => {
                return OutcomeRecord::new(
                    row,
                    Outcome::Failed {
                        error: format!("duplicate check failed: {e}"),
                    },
                );
            }
        }

        let mut warnings = Vec::new();
        if let Err(e) = self.ensure_build_label(client, &planned.repo).await {
            tracing::warn!(repo = %planned.repo, error = %e, "failed to ensure build label");
            warnings.push(format!("label '{}': {e}", self.build_label));
        }

        if self.dry_run {
            tracing::info!(
                title = %planned.title,
                repo = %planned.repo,
                labels = %planned.labels.join(","),
                product = planned.product.as_deref().unwrap_or(""),
                start = %planned.start_date,
                end = %planned.end_date,
                "[dry-run] would create issue"
            );
            warnings.extend(self.board_warnings.iter().cloned());
            return OutcomeRecord::new(row, Outcome::WouldCreate).with_warnings(warnings);
        }

        let created = match client
            .create_issue(&planned.repo, &planned.to_new_issue())
            .await
        {
            Ok(created) => created,
            Err(e) => {
                tracing::error!(title = %planned.title, error = %e, "failed to create issue");
                return OutcomeRecord::new(
                    row,
                    Outcome::Failed {
                        error: e.to_string(),
                    },
                )
                .with_warnings(warnings);
            }
        };
        tracing::info!(url = %created.html_url, "created issue");

        warnings.extend(self.board_warnings.iter().cloned());
        for board in &self.boards {
            if let Err(message) = add_to_board(client, board, &created.node_id, planned).await {
                tracing::warn!(project = %board.project.title, %message, "project update failed");
                warnings.push(message);
            }
        }

        OutcomeRecord::new(
            row,
            Outcome::Created {
                url: created.html_url,
            },
        )
        .with_warnings(warnings)
    }

    /// Make sure the build label exists in `repo`. Checked once per repository.
    async fn ensure_build_label(
        &mut self,
        client: &OctocrabClient,
        repo: &RepoName,
    ) -> Result<(), GitHubError> {
        if self.labelled_repos.contains(repo) {
            return Ok(());
        }

        let labels = client.list_labels(repo).await?;
        if labels.iter().any(|l| *l == self.build_label) {
            tracing::debug!(repo = %repo, label = %self.build_label, "label exists");
        } else if self.dry_run {
            tracing::info!(repo = %repo, label = %self.build_label, "[dry-run] would create label");
        } else {
            client
                .create_label(repo, &self.build_label, &self.build_label_color)
                .await?;
        }

        self.labelled_repos.insert(repo.clone());
        Ok(())
    }
}

async fn resolve_board(
    client: &OctocrabClient,
    org: &str,
    title: &str,
    set_fields: bool,
) -> Result<Option<Board>, GitHubError> {
    let Some(project) = client.find_project(org, title).await? else {
        return Ok(None);
    };
    let fields = if set_fields {
        client.project_fields(&project.id).await?
    } else {
        Vec::new()
    };
    Ok(Some(Board {
        project,
        fields,
        set_fields,
    }))
}

/// URL of an issue in `repo` whose title is exactly `title`, open or closed.
pub async fn find_existing(
    client: &OctocrabClient,
    repo: &RepoName,
    title: &str,
) -> Result<Option<String>, GitHubError> {
    let query = format!("repo:{repo} is:issue in:title {}", quote_phrase(title));
    let hits = client.search_issues(&query).await?;
    Ok(hits
        .into_iter()
        .find(|issue| issue.title == title && !issue.is_pull_request())
        .map(|issue| issue.html_url))
}

async fn add_to_board(
    client: &OctocrabClient,
    board: &Board,
    content_id: &str,
    planned: &PlannedIssue,
) -> Result<(), String> {
    let project = &board.project;
    let fail = |action: &str, e: GitHubError| format!("project '{}': {action}: {e}", project.title);

    let item_id = match client
        .project_item_id(&project.id, content_id)
        .await
        .map_err(|e| fail("item lookup failed", e))?
    {
        Some(id) => id,
        None => {
            let id = client
                .add_project_item(&project.id, content_id)
                .await
                .map_err(|e| fail("add failed", e))?;
            tracing::info!(project = %project.title, "added issue to project");
            id
        }
    };

    if !board.set_fields {
        return Ok(());
    }

    let mut updates: Vec<(&str, String)> = Vec::new();
    if let Some(product) = &planned.product {
        updates.push((PRODUCT_FIELD, product.clone()));
    }
    updates.push((START_DATE_FIELD, planned.start_date.format("%Y-%m-%d").to_string()));
    updates.push((END_DATE_FIELD, planned.end_date.format("%Y-%m-%d").to_string()));

    let mut problems = Vec::new();
    for (name, value) in updates {
        let Some(field) = board.fields.iter().find(|f| f.name == name) else {
            problems.push(format!("field '{name}' not found"));
            continue;
        };
        let Some(field_value) = FieldValue::for_field(field, &value) else {
            problems.push(format!("field '{name}' has no option '{value}'"));
            continue;
        };
        match client
            .set_item_field(&project.id, &item_id, &field.id, &field_value)
            .await
        {
            Ok(()) => tracing::info!(project = %project.title, field = name, %value, "set project field"),
            Err(e) => problems.push(format!("setting '{name}' failed: {e}")),
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(format!("project '{}': {}", project.title, problems.join("; ")))
    }
}
