//! Format renderers. Each one is a pure function of a [`ReportDocument`];
//! [`render`] picks the one named by the options.
//!
//! [`ReportDocument`]: crate::report::ReportDocument

pub mod csv;
pub mod excel;
pub mod txt;
pub mod xml;

use std::path::Path;

use log::debug;

use crate::dashboard::Snapshot;
use crate::error::Result;
use crate::pdf::{compile_pdf, render_pdf, PdfDocument};
use crate::report::{build_document, ExportFormat, ReportOptions};

/// Output of one renderer, not yet written anywhere.
#[derive(Debug, Clone, PartialEq)]
pub enum Rendered {
    Text(String),
    Binary(Vec<u8>),
    Pdf(PdfDocument),
}

impl Rendered {
    pub fn save(&self, path: &Path) -> Result<()> {
        match self {
            Rendered::Text(text) => std::fs::write(path, text)?,
            Rendered::Binary(bytes) => std::fs::write(path, bytes)?,
            Rendered::Pdf(pdf) => compile_pdf(pdf, path)?,
        }
        Ok(())
    }
}

/// Render `template_type` in `options.formato`; unknown ids give the default report.
pub fn render(template_type: &str, snapshot: &Snapshot, options: &ReportOptions) -> Result<Rendered> {
    debug!("rendering '{template_type}' as {}", options.formato);
    let rendered = match options.formato {
        ExportFormat::Pdf => {
            let document = build_document(template_type, snapshot, options);
            Rendered::Pdf(render_pdf(&document, options))
        }
        ExportFormat::Xlsx => {
            Rendered::Binary(excel::to_xlsx(&excel::generate(template_type, snapshot, options))?)
        }
        ExportFormat::Csv => Rendered::Text(csv::generate(template_type, snapshot, options)?),
        ExportFormat::Txt => Rendered::Text(txt::generate(template_type, snapshot, options)?),
        ExportFormat::Xml => Rendered::Text(xml::generate(template_type, snapshot, options)?),
    };
    Ok(rendered)
}
