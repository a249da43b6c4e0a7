//! Workbook output.
//!
//! The document is first laid out as a [`WorkbookModel`] (named sheets of
//! string rows, blank rows as spacing) and then encoded with
//! `rust_xlsxwriter`. Cells hold display strings; no formulas are written.

use rust_xlsxwriter::{Format, Workbook};

use crate::dashboard::Snapshot;
use crate::error::{ReportError, Result};
use crate::report::{build_document, Block, ReportDocument, ReportOptions};

const MAX_SHEET_NAME: usize = 31;

/// Column widths in characters, by column index; the last entry repeats.
const COLUMN_WIDTHS: [f64; 5] = [38.0, 20.0, 20.0, 14.0, 14.0];

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Cell {
    pub text: String,
    pub bold: bool,
}

impl Cell {
    fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: false,
        }
    }

    fn bold(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    /// An empty row is a blank spacer row.
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    /// Text of every non-empty row, for inspection.
    pub fn text_rows(&self) -> Vec<Vec<&str>> {
        self.rows
            .iter()
            .filter(|row| !row.is_empty())
            .map(|row| row.iter().map(|c| c.text.as_str()).collect())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkbookModel {
    pub sheets: Vec<Sheet>,
}

impl WorkbookModel {
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }
}

/// Apply Excel's sheet name rules: no `[]:*?/\`, at most 31 chars, unique.
fn sheet_name(wanted: &str, taken: &[String]) -> String {
    let cleaned: String = wanted
        .chars()
        .map(|c| if "[]:*?/\\".contains(c) { '-' } else { c })
        .collect();
    let cleaned = cleaned.trim_matches('\'').trim();
    let base: String = if cleaned.is_empty() {
        "Planilha".to_string()
    } else {
        cleaned.chars().take(MAX_SHEET_NAME).collect()
    };

    let mut candidate = base.clone();
    let mut n = 2;
    while taken.iter().any(|t| t.eq_ignore_ascii_case(&candidate)) {
        let suffix = format!(" ({n})");
        let keep = MAX_SHEET_NAME - suffix.chars().count();
        candidate = format!("{}{}", base.chars().take(keep).collect::<String>(), suffix);
        n += 1;
    }
    candidate
}

fn block_rows(block: &Block) -> Vec<Vec<Cell>> {
    match block {
        Block::Table(table) => {
            let mut rows = vec![
                vec![Cell::bold(&table.title)],
                table.header.iter().map(Cell::bold).collect(),
            ];
            rows.extend(
                table
                    .rows
                    .iter()
                    .map(|row| row.iter().map(Cell::plain).collect()),
            );
            rows
        }
        Block::Metrics(metrics) => {
            let mut rows = vec![
                vec![Cell::bold("Indicadores")],
                ["Indicador", "Valor", "Variação", "Tendência"]
                    .into_iter()
                    .map(Cell::bold)
                    .collect(),
            ];
            rows.extend(metrics.iter().map(|m| {
                vec![
                    Cell::plain(&m.label),
                    Cell::plain(&m.value),
                    Cell::plain(&m.change),
                    Cell::plain(m.trend.label()),
                ]
            }));
            rows
        }
        Block::Chart(chart) => {
            let mut rows = vec![
                vec![Cell::bold(&chart.title)],
                vec![Cell::bold("Item"), Cell::bold("Participação")],
            ];
            rows.extend(
                chart
                    .bars
                    .iter()
                    .map(|bar| vec![Cell::plain(&bar.label), Cell::plain(&bar.display)]),
            );
            rows
        }
        Block::Callout(callout) => {
            let mut rows = vec![vec![Cell::bold(&callout.title)]];
            rows.extend(callout.lines.iter().map(|line| vec![Cell::plain(line)]));
            rows
        }
        Block::Paragraph(text) => vec![vec![Cell::plain(text)]],
        Block::Signature(signatories) => {
            let mut rows = vec![
                vec![Cell::bold("Assinaturas")],
                vec![Cell::bold("Nome"), Cell::bold("Cargo")],
            ];
            rows.extend(
                signatories
                    .iter()
                    .map(|s| vec![Cell::plain(&s.name), Cell::plain(&s.role)]),
            );
            rows
        }
    }
}

/// Lay the document out as sheets, one per section.
pub fn build_workbook(document: &ReportDocument) -> WorkbookModel {
    let mut sheets: Vec<Sheet> = Vec::new();
    let mut taken: Vec<String> = Vec::new();

    for (index, section) in document.sections.iter().enumerate() {
        let name = sheet_name(&section.sheet, &taken);
        taken.push(name.clone());

        let mut rows: Vec<Vec<Cell>> = Vec::new();
        if index == 0 {
            rows.push(vec![Cell::bold(&document.title)]);
            rows.push(vec![Cell::plain(&document.subtitle)]);
            rows.extend(
                document
                    .metadata
                    .iter()
                    .map(|(label, value)| vec![Cell::bold(label), Cell::plain(value)]),
            );
            rows.push(Vec::new());
        }

        rows.push(vec![Cell::bold(&section.title)]);
        for block in &section.blocks {
            rows.push(Vec::new());
            rows.extend(block_rows(block));
        }

        if index + 1 == document.sections.len() {
            if let Some(footer) = &document.footer {
                rows.push(Vec::new());
                rows.push(vec![Cell::plain(footer)]);
            }
        }

        sheets.push(Sheet { name, rows });
    }

    WorkbookModel { sheets }
}

fn xlsx_error(e: rust_xlsxwriter::XlsxError) -> ReportError {
    ReportError::render("XLSX", e)
}

/// Encode the workbook as `.xlsx` bytes.
pub fn to_xlsx(model: &WorkbookModel) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();

    for sheet in &model.sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sheet.name.as_str()).map_err(xlsx_error)?;

        let columns = sheet.rows.iter().map(Vec::len).max().unwrap_or(0);
        for col in 0..columns {
            let width = COLUMN_WIDTHS[col.min(COLUMN_WIDTHS.len() - 1)];
            worksheet
                .set_column_width(col as u16, width)
                .map_err(xlsx_error)?;
        }

        for (row_index, row) in sheet.rows.iter().enumerate() {
            for (col_index, cell) in row.iter().enumerate() {
                let (r, c) = (row_index as u32, col_index as u16);
                if cell.bold {
                    worksheet
                        .write_string_with_format(r, c, cell.text.as_str(), &bold)
                        .map_err(xlsx_error)?;
                } else {
                    worksheet
                        .write_string(r, c, cell.text.as_str())
                        .map_err(xlsx_error)?;
                }
            }
        }
    }

    workbook.save_to_buffer().map_err(xlsx_error)
}

/// Build the workbook model for `template_type`; unknown ids give the default report.
pub fn generate(template_type: &str, snapshot: &Snapshot, options: &ReportOptions) -> WorkbookModel {
    build_workbook(&build_document(template_type, snapshot, options))
}
