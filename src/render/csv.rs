//! CSV output.
//!
//! Every block becomes a run of records separated from the next by a blank
//! line. Tables are a title record, a header record and data records of the
//! header's width. Amounts keep their display formatting, so pt-BR values
//! such as `R$ 1.234,56` come out quoted.

use csv::{Terminator, WriterBuilder};

use crate::dashboard::Snapshot;
use crate::error::{ReportError, Result};
use crate::report::{build_document, Block, ReportDocument, ReportOptions};

fn one(field: &str) -> Vec<String> {
    vec![field.to_string()]
}

fn encode_chunk(records: &[Vec<String>]) -> Result<String> {
    let mut writer = WriterBuilder::new()
        .flexible(true)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    for record in records {
        writer
            .write_record(record)
            .map_err(|e| ReportError::render("CSV", e))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ReportError::render("CSV", e))?;
    String::from_utf8(bytes).map_err(|e| ReportError::render("CSV", e))
}

fn block_records(block: &Block) -> Vec<Vec<String>> {
    match block {
        Block::Table(table) => {
            let mut records = vec![one(&table.title), table.header.clone()];
            records.extend(table.rows.iter().cloned());
            records
        }
        Block::Metrics(metrics) => {
            let mut records = vec![
                one("Indicadores"),
                vec![
                    "Indicador".to_string(),
                    "Valor".to_string(),
                    "Variação".to_string(),
                    "Tendência".to_string(),
                ],
            ];
            records.extend(metrics.iter().map(|m| {
                vec![
                    m.label.clone(),
                    m.value.clone(),
                    m.change.clone(),
                    m.trend.label().to_string(),
                ]
            }));
            records
        }
        Block::Chart(chart) => {
            let mut records = vec![
                one(&chart.title),
                vec!["Item".to_string(), "Participação".to_string()],
            ];
            records.extend(
                chart
                    .bars
                    .iter()
                    .map(|bar| vec![bar.label.clone(), bar.display.clone()]),
            );
            records
        }
        Block::Callout(callout) => {
            let mut records = vec![one(&callout.title)];
            records.extend(callout.lines.iter().map(|line| one(line)));
            records
        }
        Block::Paragraph(text) => vec![one(text)],
        Block::Signature(signatories) => {
            let mut records = vec![
                one("Assinaturas"),
                vec!["Nome".to_string(), "Cargo".to_string()],
            ];
            records.extend(
                signatories
                    .iter()
                    .map(|s| vec![s.name.clone(), s.role.clone()]),
            );
            records
        }
    }
}

pub fn render(document: &ReportDocument) -> Result<String> {
    let mut chunks: Vec<Vec<Vec<String>>> = Vec::new();

    let mut heading = vec![one(&document.title), one(&document.subtitle)];
    heading.extend(
        document
            .metadata
            .iter()
            .map(|(label, value)| vec![label.clone(), value.clone()]),
    );
    chunks.push(heading);

    for section in &document.sections {
        chunks.push(vec![one(&section.title.to_uppercase())]);
        chunks.extend(section.blocks.iter().map(block_records));
    }

    if let Some(footer) = &document.footer {
        chunks.push(vec![one(footer)]);
    }

    let encoded = chunks
        .iter()
        .map(|records| encode_chunk(records))
        .collect::<Result<Vec<_>>>()?;
    Ok(encoded.join("\n"))
}

/// Build and encode the report for `template_type`; unknown ids give the default report.
pub fn generate(template_type: &str, snapshot: &Snapshot, options: &ReportOptions) -> Result<String> {
    render(&build_document(template_type, snapshot, options))
}
