//! CSV schedule loading.
//!
//! The header is validated up front: a missing required column aborts the
//! whole run before any API call. Per-row problems (bad dates, malformed repo)
//! and rows that are not valid UTF-8 are returned alongside the valid rows so
//! the caller can report them and keep going.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::infra::github::RepoName;

pub const TITLE: &str = "Title";
pub const REPO: &str = "Repo";
pub const START_DATE: &str = "Start Date";
pub const END_DATE: &str = "End Date";
pub const DESCRIPTION: &str = "Description";
pub const CHECKLIST: &str = "Checklist";
pub const PRODUCT: &str = "GitHub Project Product";

const REQUIRED_COLUMNS: [&str; 6] = [TITLE, REPO, START_DATE, END_DATE, DESCRIPTION, CHECKLIST];

/// One theme from the schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleRow {
    /// 1-based line in the CSV file.
    pub line: u64,
    pub title: String,
    pub repo: RepoName,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub description: String,
    /// Raw semicolon-separated items, trimmed, in file order (may contain empties).
    pub checklist: Vec<String>,
    pub product: Option<String>,
}

/// Structural problems that make the schedule unusable.
#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    #[error("Failed to open schedule {path}: {source}")]
    Open { path: PathBuf, source: io::Error },

    #[error("Failed to read schedule: {0}")]
    Csv(#[from] csv::Error),

    #[error("Schedule is missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),
}

/// A row that could not be turned into a `ScheduleRow`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line}: {message}")]
pub struct RowParseError {
    pub line: u64,
    pub title: String,
    pub message: String,
}

/// Column positions resolved from the header row.
struct Columns {
    index: HashMap<String, usize>,
}

impl Columns {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, ScheduleError> {
        let index: HashMap<String, usize> = headers
            .iter()
            .enumerate()
            .map(|(i, name)| (name.trim_start_matches('\u{feff}').trim().to_string(), i))
            .collect();

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|c| !index.contains_key(**c))
            .map(|c| (*c).to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ScheduleError::MissingColumns(missing));
        }
        Ok(Self { index })
    }

    fn get<'r>(&self, record: &'r csv::StringRecord, column: &str) -> &'r str {
        self.index
            .get(column)
            .and_then(|i| record.get(*i))
            .map(str::trim)
            .unwrap_or("")
    }

    /// Lossy read of a field from a row that is not valid UTF-8.
    fn get_lossy(&self, record: &csv::ByteRecord, column: &str) -> String {
        self.index
            .get(column)
            .and_then(|i| record.get(*i))
            .map(|bytes| String::from_utf8_lossy(bytes).trim().to_string())
            .unwrap_or_default()
    }
}

/// Load a schedule file. Rows come back in file order.
pub fn load_schedule(
    path: &Path,
) -> Result<Vec<Result<ScheduleRow, RowParseError>>, ScheduleError> {
    let file = std::fs::File::open(path).map_err(|source| ScheduleError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %path.display(), "reading schedule");
    read_schedule(file)
}

/// Parse a schedule from any reader.
pub fn read_schedule<R: io::Read>(
    reader: R,
) -> Result<Vec<Result<ScheduleRow, RowParseError>>, ScheduleError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let columns = Columns::from_headers(reader.headers()?)?;

    let mut rows = Vec::new();
    for (i, record) in reader.byte_records().enumerate() {
        let record = record?;
        let line = record.position().map_or(i as u64 + 2, |p| p.line());
        let record = match csv::StringRecord::from_byte_record(record) {
            Ok(record) => record,
            Err(e) => {
                let message = e.utf8_error().to_string();
                tracing::debug!(line, error = %message, "row is not valid UTF-8");
                rows.push(Err(RowParseError {
                    line,
                    title: columns.get_lossy(&e.into_byte_record(), TITLE),
                    message,
                }));
                continue;
            }
        };

        let title = columns.get(&record, TITLE);
        let repo = columns.get(&record, REPO);
        if title.is_empty() && repo.is_empty() {
            tracing::debug!(line, "skipping blank row");
            continue;
        }
        rows.push(parse_row(&columns, &record, line));
    }

    tracing::info!(rows = rows.len(), "found release themes");
    Ok(rows)
}

fn parse_row(
    columns: &Columns,
    record: &csv::StringRecord,
    line: u64,
) -> Result<ScheduleRow, RowParseError> {
    let title = columns.get(record, TITLE);
    let fail = |message: String| RowParseError {
        line,
        title: title.to_string(),
        message,
    };

    if title.is_empty() {
        return Err(fail("missing Title".to_string()));
    }
    let repo: RepoName = columns
        .get(record, REPO)
        .parse()
        .map_err(|e: crate::infra::github::GitHubError| fail(e.to_string()))?;
    let start_date = parse_date(columns.get(record, START_DATE)).map_err(fail)?;
    let end_date = parse_date(columns.get(record, END_DATE)).map_err(fail)?;
    let product = Some(columns.get(record, PRODUCT))
        .filter(|p| !p.is_empty())
        .map(str::to_string);

    Ok(ScheduleRow {
        line,
        title: title.to_string(),
        repo,
        start_date,
        end_date,
        description: columns.get(record, DESCRIPTION).to_string(),
        checklist: split_checklist(columns.get(record, CHECKLIST)),
        product,
    })
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|e| format!("invalid date '{value}' (expected YYYY-MM-DD): {e}"))
}

fn split_checklist(raw: &str) -> Vec<String> {
    if raw.trim().is_empty() {
        return Vec::new();
    }
    raw.split(';').map(|item| item.trim().to_string()).collect()
}
