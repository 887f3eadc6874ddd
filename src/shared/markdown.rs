//! Minimal Markdown document builder used by the issue reports.

use std::fmt::Write;

/// A Markdown document assembled section by section.
#[derive(Debug, Clone)]
pub struct MarkdownDocument {
    out: String,
}

impl MarkdownDocument {
    /// Start a document with a setext-style title.
    pub fn new(title: &str) -> Self {
        let mut out = String::new();
        out.push_str(title);
        out.push('\n');
        out.push_str(&"=".repeat(title.chars().count().max(3)));
        out.push('\n');
        Self { out }
    }

    /// Append an ATX header. Levels outside 1..=6 are clamped.
    pub fn header(&mut self, level: usize, title: &str) {
        let level = level.clamp(1, 6);
        let _ = write!(self.out, "\n{} {}\n", "#".repeat(level), title);
    }

    /// Append a paragraph line.
    pub fn line(&mut self, text: &str) {
        let _ = writeln!(self.out, "\n{text}");
    }

    /// Append a left-aligned table. Rows shorter than the header are padded.
    pub fn table(&mut self, headers: &[&str], rows: &[Vec<String>]) {
        self.out.push('\n');
        let header_cells: Vec<String> = headers.iter().map(|h| escape_cell(h)).collect();
        push_row(&mut self.out, &header_cells);
        let separators: Vec<String> = headers.iter().map(|_| ":---".to_string()).collect();
        push_row(&mut self.out, &separators);
        for row in rows {
            let mut cells: Vec<String> = row.iter().map(|c| escape_cell(c)).collect();
            cells.resize(headers.len(), String::new());
            push_row(&mut self.out, &cells);
        }
    }

    pub fn render(&self) -> String {
        self.out.clone()
    }
}

fn push_row(out: &mut String, cells: &[String]) {
    let _ = writeln!(out, "| {} |", cells.join(" | "));
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}
