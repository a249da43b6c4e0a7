//! Page layout for PDF output.
//!
//! [`LayoutManager`] walks a cursor down A4 pages (millimetres, origin top
//! left) and records absolute draw operations. The result is a plain
//! [`PdfDocument`] that can be inspected in tests and is turned into a real
//! file by the Typst backend.

use log::debug;
use serde::Serialize;

use crate::config::Signatory;
use crate::dashboard::Trend;
use crate::report::document::wrap_text;
use crate::report::{Bar, Block, MetricLine, Orientacao, ReportDocument, ReportOptions};

pub const A4_WIDTH: f64 = 210.0;
pub const A4_HEIGHT: f64 = 297.0;
pub const MARGIN: f64 = 20.0;
/// Space kept free at the bottom of every page for the footer.
pub const FOOTER_RESERVE: f64 = 30.0;
pub const ROW_HEIGHT: f64 = 7.0;

pub const HEADER_FILL: &str = "#1f2937";
pub const STRIPE_FILL: &str = "#f3f4f6";
pub const PLAIN_FILL: &str = "#ffffff";
pub const BORDER: &str = "#d1d5db";
pub const TEXT: &str = "#111827";
pub const MUTED: &str = "#6b7280";
pub const HIGHLIGHT_FILL: &str = "#fff7ed";
pub const HIGHLIGHT_BORDER: &str = "#f97316";
pub const HIGHLIGHT_TEXT: &str = "#c2410c";

const UP_COLOR: &str = "#16a34a";
const DOWN_COLOR: &str = "#dc2626";

/// Title band plus bottom padding of a highlight box.
const HIGHLIGHT_PADDING: f64 = 13.0;
const HIGHLIGHT_LINE: f64 = 4.8;

/// Rough average glyph width in mm at 10pt Helvetica.
const CHAR_WIDTH_10PT: f64 = 1.9;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DrawOp {
    Rect {
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        fill: String,
        stroke: Option<String>,
    },
    /// `y` is the top of the text line.
    Text {
        x: f64,
        y: f64,
        size: f64,
        bold: bool,
        color: String,
        content: String,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        color: String,
        width: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PdfPage {
    pub ops: Vec<DrawOp>,
}

impl PdfPage {
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { content, .. } => Some(content.as_str()),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PdfDocument {
    pub width: f64,
    pub height: f64,
    pub pages: Vec<PdfPage>,
}

impl PdfDocument {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Every drawn string, page by page.
    pub fn texts(&self) -> Vec<&str> {
        self.pages.iter().flat_map(PdfPage::texts).collect()
    }
}

pub struct LayoutManager {
    width: f64,
    height: f64,
    margin: f64,
    cursor: f64,
    pages: Vec<PdfPage>,
}

impl LayoutManager {
    pub fn new(orientacao: Orientacao) -> Self {
        let (width, height) = match orientacao {
            Orientacao::Retrato => (A4_WIDTH, A4_HEIGHT),
            Orientacao::Paisagem => (A4_HEIGHT, A4_WIDTH),
        };
        Self {
            width,
            height,
            margin: MARGIN,
            cursor: MARGIN,
            pages: vec![PdfPage::default()],
        }
    }

    pub fn cursor(&self) -> f64 {
        self.cursor
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn content_width(&self) -> f64 {
        self.width - 2.0 * self.margin
    }

    fn chars_per_line(&self, width: f64, size: f64) -> usize {
        (width / (CHAR_WIDTH_10PT * size / 10.0)).max(10.0) as usize
    }

    fn push(&mut self, op: DrawOp) {
        if let Some(page) = self.pages.last_mut() {
            page.ops.push(op);
        }
    }

    fn text(&mut self, x: f64, y: f64, size: f64, bold: bool, color: &str, content: &str) {
        self.push(DrawOp::Text {
            x,
            y,
            size,
            bold,
            color: color.to_string(),
            content: content.to_string(),
        });
    }

    fn rect(&mut self, x: f64, y: f64, w: f64, h: f64, fill: &str, stroke: Option<&str>) {
        self.push(DrawOp::Rect {
            x,
            y,
            w,
            h,
            fill: fill.to_string(),
            stroke: stroke.map(str::to_string),
        });
    }

    fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, color: &str, width: f64) {
        self.push(DrawOp::Line {
            x1,
            y1,
            x2,
            y2,
            color: color.to_string(),
            width,
        });
    }

    pub fn new_page(&mut self) {
        self.pages.push(PdfPage::default());
        self.cursor = self.margin;
        debug!("pdf layout: page {} started", self.pages.len());
    }

    /// Start a new page when `needed` mm no longer fit above the footer.
    pub fn check_page_break(&mut self, needed: f64) -> bool {
        if self.cursor + needed > self.height - FOOTER_RESERVE {
            self.new_page();
            true
        } else {
            false
        }
    }

    pub fn add_header_bar(&mut self, label: &str) {
        self.rect(0.0, 0.0, self.width, 14.0, HEADER_FILL, None);
        self.text(self.margin, 4.5, 11.0, true, PLAIN_FILL, label);
        self.cursor = self.cursor.max(24.0);
    }

    pub fn add_title(&mut self, title: &str, subtitle: &str) {
        self.check_page_break(18.0);
        let y = self.cursor;
        self.text(self.margin, y, 18.0, true, TEXT, title);
        if !subtitle.is_empty() {
            self.text(self.margin, y + 9.0, 11.0, false, MUTED, subtitle);
        }
        self.cursor += 18.0;
    }

    pub fn add_metadata(&mut self, fields: &[(String, String)]) {
        for (label, value) in fields {
            self.check_page_break(5.0);
            let y = self.cursor;
            self.text(self.margin, y, 9.0, true, TEXT, &format!("{label}:"));
            self.text(self.margin + 38.0, y, 9.0, false, TEXT, value);
            self.cursor += 5.0;
        }
        self.cursor += 2.0;
        let (x1, x2, y) = (self.margin, self.width - self.margin, self.cursor);
        self.line(x1, y, x2, y, BORDER, 0.5);
        self.cursor += 6.0;
    }

    pub fn add_section_heading(&mut self, title: &str) {
        // keep the heading with at least one table row
        self.check_page_break(12.0 + ROW_HEIGHT);
        let y = self.cursor;
        self.text(self.margin, y, 13.0, true, HEADER_FILL, title);
        let (x1, x2) = (self.margin, self.width - self.margin);
        self.line(x1, y + 7.0, x2, y + 7.0, HIGHLIGHT_BORDER, 0.8);
        self.cursor += 12.0;
    }

    pub fn add_caption(&mut self, caption: &str) {
        self.check_page_break(6.0 + ROW_HEIGHT);
        let y = self.cursor;
        self.text(self.margin, y, 10.0, true, TEXT, caption);
        self.cursor += 6.0;
    }

    /// Left edge and width of every column. The first column takes a larger
    /// fixed share; the rest split the remaining width evenly.
    fn column_offsets(&self, columns: usize) -> Vec<(f64, f64)> {
        let total = self.content_width();
        if columns <= 1 {
            return vec![(self.margin, total)];
        }
        let first = total * 0.36;
        let other = (total - first) / (columns - 1) as f64;
        (0..columns)
            .map(|i| {
                if i == 0 {
                    (self.margin, first)
                } else {
                    (self.margin + first + other * (i - 1) as f64, other)
                }
            })
            .collect()
    }

    fn table_row(&mut self, offsets: &[(f64, f64)], row: &[String], header: bool, fill: &str) {
        let y = self.cursor;
        let color = if header { PLAIN_FILL } else { TEXT };
        for (&(x, w), cell) in offsets.iter().zip(row) {
            self.rect(x, y, w, ROW_HEIGHT, fill, Some(BORDER));
            self.text(x + 2.0, y + 1.8, 9.0, header, color, cell);
        }
        self.cursor += ROW_HEIGHT;
    }

    /// Bordered table. With `has_header`, the first row is drawn dark and is
    /// repeated at the top of every continuation page.
    pub fn add_styled_table(&mut self, rows: &[Vec<String>], has_header: bool) {
        let Some(columns) = rows.iter().map(Vec::len).max() else {
            return;
        };
        let offsets = self.column_offsets(columns);
        let (header, body) = match rows.split_first() {
            Some((first, rest)) if has_header => (Some(first), rest),
            _ => (None, rows),
        };

        if let Some(header) = header {
            self.check_page_break(ROW_HEIGHT * 2.0);
            self.table_row(&offsets, header, true, HEADER_FILL);
        }

        for (index, row) in body.iter().enumerate() {
            if self.check_page_break(ROW_HEIGHT) {
                if let Some(header) = header {
                    self.table_row(&offsets, header, true, HEADER_FILL);
                }
            }
            let fill = if index % 2 == 0 { STRIPE_FILL } else { PLAIN_FILL };
            self.table_row(&offsets, row, false, fill);
        }
        self.cursor += 5.0;
    }

    fn highlight_chunk(&mut self, title: &str, lines: &[String]) {
        let height = HIGHLIGHT_PADDING + lines.len() as f64 * HIGHLIGHT_LINE;
        let (x, y, w) = (self.margin, self.cursor, self.content_width());
        self.rect(x, y, w, height, HIGHLIGHT_FILL, Some(HIGHLIGHT_BORDER));
        self.text(x + 5.0, y + 3.0, 10.0, true, HIGHLIGHT_TEXT, title);
        for (i, line) in lines.iter().enumerate() {
            self.text(x + 5.0, y + 9.5 + i as f64 * HIGHLIGHT_LINE, 9.0, false, HIGHLIGHT_TEXT, line);
        }
        self.cursor += height;
    }

    /// Orange callout box. A box taller than a page is split into one box per
    /// page, each repeating the title.
    pub fn add_highlight_box(&mut self, title: &str, lines: &[String]) {
        let inner = self.content_width() - 10.0;
        let per_line = self.chars_per_line(inner, 9.0);
        let wrapped: Vec<String> = lines
            .iter()
            .flat_map(|line| {
                wrap_text(line, per_line.saturating_sub(2))
                    .into_iter()
                    .enumerate()
                    .map(|(i, part)| if i == 0 { format!("• {part}") } else { format!("  {part}") })
            })
            .collect();

        let full = HIGHLIGHT_PADDING + wrapped.len() as f64 * HIGHLIGHT_LINE;
        if full <= self.height - FOOTER_RESERVE - self.margin {
            self.check_page_break(full);
        } else {
            self.check_page_break(HIGHLIGHT_PADDING + HIGHLIGHT_LINE);
        }

        let mut rest = wrapped.as_slice();
        loop {
            let room = self.height - FOOTER_RESERVE - self.cursor - HIGHLIGHT_PADDING;
            let fit = (((room + 1e-6) / HIGHLIGHT_LINE).floor().max(1.0) as usize).min(rest.len());
            let (chunk, tail) = rest.split_at(fit);
            self.highlight_chunk(title, chunk);
            rest = tail;
            if rest.is_empty() {
                break;
            }
            self.new_page();
        }
        self.cursor += 5.0;
    }

    pub fn add_metric_cards(&mut self, metrics: &[MetricLine]) {
        const GAP: f64 = 4.0;
        const CARD_HEIGHT: f64 = 20.0;
        let per_row = if self.width > A4_WIDTH { 4 } else { 3 };
        let card_width = (self.content_width() - GAP * (per_row - 1) as f64) / per_row as f64;

        for chunk in metrics.chunks(per_row) {
            self.check_page_break(CARD_HEIGHT + GAP);
            let y = self.cursor;
            for (i, metric) in chunk.iter().enumerate() {
                let x = self.margin + i as f64 * (card_width + GAP);
                let change_color = match metric.trend {
                    Trend::Up => UP_COLOR,
                    Trend::Down => DOWN_COLOR,
                };
                self.rect(x, y, card_width, CARD_HEIGHT, "#f9fafb", Some("#e5e7eb"));
                self.text(x + 3.0, y + 2.5, 8.0, false, MUTED, &metric.label);
                self.text(x + 3.0, y + 7.5, 12.0, true, TEXT, &metric.value);
                self.text(
                    x + 3.0,
                    y + 14.0,
                    8.0,
                    false,
                    change_color,
                    &format!("{} {}", metric.trend.arrow(), metric.change),
                );
            }
            self.cursor += CARD_HEIGHT + GAP;
        }
        self.cursor += 2.0;
    }

    pub fn add_bar_chart(&mut self, title: &str, bars: &[Bar]) {
        const LABEL_WIDTH: f64 = 52.0;
        const VALUE_WIDTH: f64 = 22.0;
        const BAR_STEP: f64 = 7.0;
        self.check_page_break(7.0 + BAR_STEP * bars.len().min(4) as f64);
        let y = self.cursor;
        self.text(self.margin, y, 10.0, true, TEXT, title);
        self.cursor += 7.0;

        let track = self.content_width() - LABEL_WIDTH - VALUE_WIDTH;
        for bar in bars {
            self.check_page_break(BAR_STEP);
            let y = self.cursor;
            let x = self.margin + LABEL_WIDTH;
            let filled = track * (bar.share / 100.0).clamp(0.0, 1.0);
            self.text(self.margin, y + 0.5, 8.0, false, TEXT, &bar.label);
            self.rect(x, y, track, 4.5, "#e5e7eb", None);
            if filled > 0.0 {
                self.rect(x, y, filled, 4.5, &bar.color, None);
            }
            self.text(x + track + 2.0, y + 0.5, 8.0, false, MUTED, &bar.display);
            self.cursor += BAR_STEP;
        }
        self.cursor += 4.0;
    }

    pub fn add_paragraph(&mut self, text: &str) {
        let per_line = self.chars_per_line(self.content_width(), 10.0);
        for line in wrap_text(text, per_line) {
            self.check_page_break(5.0);
            let y = self.cursor;
            self.text(self.margin, y, 10.0, false, TEXT, &line);
            self.cursor += 5.0;
        }
        self.cursor += 3.0;
    }

    /// Signature lines, two per row.
    pub fn add_signatures(&mut self, signatories: &[Signatory]) {
        let column = self.content_width() / 2.0;
        for pair in signatories.chunks(2) {
            self.check_page_break(30.0);
            self.cursor += 16.0;
            let y = self.cursor;
            for (i, signatory) in pair.iter().enumerate() {
                let x = self.margin + i as f64 * column;
                self.line(x + 6.0, y, x + column - 6.0, y, TEXT, 0.4);
                self.text(x + 6.0, y + 2.0, 9.0, true, TEXT, &signatory.name);
                self.text(x + 6.0, y + 6.5, 8.0, false, MUTED, &signatory.role);
            }
            self.cursor += 12.0;
        }
    }

    /// Stamp the footer and `Página i de n` on every page. Nothing is stamped
    /// without a footer.
    pub fn finish(mut self, footer: Option<&str>) -> PdfDocument {
        if let Some(footer) = footer {
            let total = self.pages.len();
            let (left, right, y) = (self.margin, self.width - self.margin, self.height - 15.0);
            for (index, page) in self.pages.iter_mut().enumerate() {
                page.ops.push(DrawOp::Line {
                    x1: left,
                    y1: y,
                    x2: right,
                    y2: y,
                    color: BORDER.to_string(),
                    width: 0.4,
                });
                page.ops.push(DrawOp::Text {
                    x: left,
                    y: y + 3.0,
                    size: 8.0,
                    bold: false,
                    color: MUTED.to_string(),
                    content: footer.to_string(),
                });
                page.ops.push(DrawOp::Text {
                    x: right - 24.0,
                    y: y + 3.0,
                    size: 8.0,
                    bold: false,
                    color: MUTED.to_string(),
                    content: format!("Página {} de {}", index + 1, total),
                });
            }
        }

        PdfDocument {
            width: self.width,
            height: self.height,
            pages: self.pages,
        }
    }
}

/// Lay the document out on pages. The header bar shows the `Empresa`
/// metadata value when present.
pub fn render_pdf(document: &ReportDocument, options: &ReportOptions) -> PdfDocument {
    let mut layout = LayoutManager::new(options.orientacao);

    let company = document
        .metadata
        .iter()
        .find(|(label, _)| label == "Empresa")
        .map(|(_, value)| value.as_str())
        .unwrap_or(document.title.as_str());
    layout.add_header_bar(company);
    layout.add_title(&document.title, &document.subtitle);
    layout.add_metadata(&document.metadata);

    for section in &document.sections {
        if section.page_break_before && layout.cursor() > MARGIN {
            layout.new_page();
        }
        layout.add_section_heading(&section.title);

        for block in &section.blocks {
            match block {
                Block::Table(table) => {
                    if !table.title.is_empty() {
                        layout.add_caption(&table.title);
                    }
                    let mut rows = Vec::with_capacity(table.rows.len() + 1);
                    rows.push(table.header.clone());
                    rows.extend(table.rows.iter().cloned());
                    layout.add_styled_table(&rows, true);
                }
                Block::Metrics(metrics) => layout.add_metric_cards(metrics),
                Block::Chart(chart) => layout.add_bar_chart(&chart.title, &chart.bars),
                Block::Callout(callout) => layout.add_highlight_box(&callout.title, &callout.lines),
                Block::Paragraph(text) => layout.add_paragraph(text),
                Block::Signature(signatories) => layout.add_signatures(signatories),
            }
        }
    }

    let pdf = layout.finish(document.footer.as_deref());
    debug!(
        "pdf layout: '{}' laid out on {} page(s)",
        document.template_id,
        pdf.page_count()
    );
    pdf
}
