pub mod config;
pub mod dashboard;
pub mod error;
pub mod export;
pub mod pdf;
pub mod render;
pub mod report;

pub use config::{Company, Config, Signatory};
pub use dashboard::{DashboardData, FilterState, Snapshot};
pub use error::{ReportError, Result};
pub use export::{export_filename, ExportOutcome, ExportRequest, Exporter, Notification};
pub use render::{render, Rendered};
pub use report::{build_document, ExportFormat, ReportDocument, ReportOptions};
