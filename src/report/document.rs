//! Format-neutral report document.
//!
//! Templates build a [`ReportDocument`] once; every output format is a
//! renderer over the same structure.

use crate::config::Signatory;
use crate::dashboard::Trend;

#[derive(Debug, Clone, PartialEq)]
pub struct ReportDocument {
    pub template_id: String,
    pub title: String,
    pub subtitle: String,
    /// Ordered `(label, value)` pairs printed under the title.
    pub metadata: Vec<(String, String)>,
    pub sections: Vec<Section>,
    pub footer: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub title: String,
    /// Worksheet name in spreadsheet output.
    pub sheet: String,
    pub page_break_before: bool,
    pub blocks: Vec<Block>,
}

impl Section {
    pub fn new(title: impl Into<String>) -> Self {
        let title = title.into();
        Self {
            sheet: title.clone(),
            title,
            page_break_before: false,
            blocks: Vec::new(),
        }
    }

    pub fn sheet(mut self, sheet: impl Into<String>) -> Self {
        self.sheet = sheet.into();
        self
    }

    pub fn on_new_page(mut self) -> Self {
        self.page_break_before = true;
        self
    }

    pub fn with(mut self, block: Block) -> Self {
        self.blocks.push(block);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Table(Table),
    Metrics(Vec<MetricLine>),
    Chart(Chart),
    Callout(Callout),
    Paragraph(String),
    Signature(Vec<Signatory>),
}

/// A grid of display strings. Every row has as many cells as the header.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub title: String,
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<S: Into<String>>(title: impl Into<String>, header: impl IntoIterator<Item = S>) -> Self {
        Self {
            title: title.into(),
            header: header.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row, padding with `-` or truncating to the header width.
    pub fn row<S: Into<String>>(mut self, cells: impl IntoIterator<Item = S>) -> Self {
        let mut row: Vec<String> = cells.into_iter().map(Into::into).collect();
        row.resize(self.header.len(), "-".to_string());
        self.rows.push(row);
        self
    }

    pub fn width(&self) -> usize {
        self.header.len()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetricLine {
    pub label: String,
    pub value: String,
    pub change: String,
    pub trend: Trend,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub title: String,
    pub bars: Vec<Bar>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub label: String,
    /// 0-100
    pub share: f64,
    pub display: String,
    pub color: String,
}

/// Highlighted box of short lines (highlights, consistency observations).
#[derive(Debug, Clone, PartialEq)]
pub struct Callout {
    pub title: String,
    pub lines: Vec<String>,
}

/// Greedy word wrap to at most `width` characters per line.
///
/// A single word longer than `width` is kept whole on its own line.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };

        if needed > width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
