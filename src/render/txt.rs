use tabled::builder::Builder;
use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Style};

use crate::dashboard::Snapshot;
use crate::error::Result;
use crate::report::document::wrap_text;
use crate::report::{build_document, Block, ReportDocument, ReportOptions};

const PAGE_WIDTH: usize = 80;
const BAR_WIDTH: usize = 40;

/// Box-drawn table; columns size to their content, numbers align right.
fn boxed_table(header: &[String], rows: &[Vec<String>]) -> String {
    let mut builder = Builder::default();
    builder.push_record(header.to_vec());
    for row in rows {
        builder.push_record(row.clone());
    }

    let mut table = builder.build();
    table.with(Style::modern());
    if header.len() > 1 {
        table.modify(Columns::new(1..), Alignment::right());
    }
    table.to_string()
}

fn push_block(out: &mut String, block: &Block) {
    match block {
        Block::Table(table) => {
            out.push_str(&table.title);
            out.push('\n');
            out.push_str(&boxed_table(&table.header, &table.rows));
            out.push('\n');
        }
        Block::Metrics(metrics) => {
            let header = ["Indicador", "Valor", "Variação", "Tendência"].map(String::from);
            let rows: Vec<Vec<String>> = metrics
                .iter()
                .map(|m| {
                    vec![
                        m.label.clone(),
                        m.value.clone(),
                        m.change.clone(),
                        format!("{} {}", m.trend.arrow(), m.trend.label()),
                    ]
                })
                .collect();
            out.push_str("Indicadores\n");
            out.push_str(&boxed_table(&header, &rows));
            out.push('\n');
        }
        Block::Chart(chart) => {
            out.push_str(&chart.title);
            out.push('\n');
            let label_width = chart
                .bars
                .iter()
                .map(|bar| bar.label.chars().count())
                .max()
                .unwrap_or(0);
            for bar in &chart.bars {
                let filled = (bar.share / 100.0 * BAR_WIDTH as f64).round() as usize;
                out.push_str(&format!(
                    "  {:<width$}  {:<bar_width$}  {}\n",
                    bar.label,
                    "█".repeat(filled.min(BAR_WIDTH)),
                    bar.display,
                    width = label_width,
                    bar_width = BAR_WIDTH
                ));
            }
        }
        Block::Callout(callout) => {
            out.push_str(&format!("▶ {}\n", callout.title));
            for line in &callout.lines {
                for (i, wrapped) in wrap_text(line, PAGE_WIDTH - 6).iter().enumerate() {
                    let bullet = if i == 0 { "•" } else { " " };
                    out.push_str(&format!("  {bullet} {wrapped}\n"));
                }
            }
        }
        Block::Paragraph(text) => {
            for line in wrap_text(text, PAGE_WIDTH - 2) {
                out.push_str(&line);
                out.push('\n');
            }
        }
        Block::Signature(signatories) => {
            for signatory in signatories {
                out.push_str(&format!(
                    "\n\n    {}\n    {}\n    {}\n",
                    "_".repeat(36),
                    signatory.name,
                    signatory.role
                ));
            }
        }
    }
}

pub fn render(document: &ReportDocument) -> String {
    let mut out = String::new();
    let double_rule = "═".repeat(PAGE_WIDTH);
    let single_rule = "─".repeat(PAGE_WIDTH);

    out.push_str(&double_rule);
    out.push('\n');
    out.push_str(&document.title.to_uppercase());
    out.push('\n');
    out.push_str(&document.subtitle);
    out.push('\n');
    out.push_str(&double_rule);
    out.push('\n');

    let label_width = document
        .metadata
        .iter()
        .map(|(label, _)| label.chars().count() + 1)
        .max()
        .unwrap_or(0);
    for (label, value) in &document.metadata {
        out.push_str(&format!(
            "{:<width$} {}\n",
            format!("{label}:"),
            value,
            width = label_width
        ));
    }

    for section in &document.sections {
        out.push('\n');
        out.push_str(&format!("■ {}\n", section.title.to_uppercase()));
        out.push_str(&single_rule);
        out.push('\n');
        for block in &section.blocks {
            out.push('\n');
            push_block(&mut out, block);
        }
    }

    if let Some(footer) = &document.footer {
        out.push('\n');
        out.push_str(&single_rule);
        out.push('\n');
        out.push_str(footer);
        out.push('\n');
    }

    out
}

/// Build and lay out the text report for `template_type`; unknown ids give the default report.
pub fn generate(template_type: &str, snapshot: &Snapshot, options: &ReportOptions) -> Result<String> {
    Ok(render(&build_document(template_type, snapshot, options)))
}
