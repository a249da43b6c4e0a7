mod builder;
pub mod document;
mod options;
mod templates;

pub use builder::{build_document, DEFAULT_TEMPLATE_ID};
pub use document::{Bar, Block, Callout, Chart, MetricLine, ReportDocument, Section, Table};
pub use options::{ExportFormat, OptionOverrides, Orientacao, ReportOptions};
pub use templates::{
    get_template_by_id, get_templates_by_category, resolve_title, ReportTemplate, SectionKind,
    SectionSpec, DEFAULT_PDF_TEMPLATE, TEMPLATES,
};
