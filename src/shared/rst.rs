//! Minimal reStructuredText document builder for the release description document.

use std::fmt::Write;

const SECTION_CHARS: [char; 4] = ['=', '-', '~', '^'];

#[derive(Debug, Clone)]
pub struct RstDocument {
    out: String,
}

impl RstDocument {
    /// Start a document with an over- and underlined title.
    pub fn new(title: &str) -> Self {
        let rule = "=".repeat(title.chars().count());
        Self {
            out: format!("{rule}\n{title}\n{rule}\n"),
        }
    }

    /// Append a section title. Level 1 is the highest section level below the title.
    pub fn section(&mut self, level: usize, title: &str) {
        let idx = level.clamp(1, SECTION_CHARS.len()) - 1;
        let rule: String = std::iter::repeat_n(SECTION_CHARS[idx], title.chars().count()).collect();
        let _ = write!(self.out, "\n{title}\n{rule}\n");
    }

    pub fn paragraph(&mut self, text: &str) {
        let _ = writeln!(self.out, "\n{text}");
    }

    /// Append a `list-table` directive with a header row.
    pub fn list_table(&mut self, headers: &[&str], rows: &[Vec<String>]) {
        let _ = write!(
            self.out,
            "\n.. list-table::\n   :header-rows: 1\n   :widths: auto\n\n"
        );
        push_row(&mut self.out, headers.iter().map(|h| (*h).to_string()));
        for row in rows {
            push_row(&mut self.out, row.iter().cloned());
        }
    }

    pub fn render(&self) -> String {
        self.out.clone()
    }
}

fn push_row(out: &mut String, cells: impl Iterator<Item = String>) {
    for (i, cell) in cells.enumerate() {
        let marker = if i == 0 { "* -" } else { "  -" };
        let _ = writeln!(out, "   {marker} {}", cell.replace('\n', " "));
    }
}

/// Format an external hyperlink.
pub fn link(text: &str, url: &str) -> String {
    format!("`{text} <{url}>`_")
}
