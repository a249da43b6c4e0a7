use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Config directory not found at {0}. Run 'dre init' to create it.")]
    ConfigNotFound(PathBuf),

    #[error("Config file not found: {0}")]
    ConfigFileNotFound(PathBuf),

    #[error("Failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config directory already exists at {0}")]
    AlreadyInitialized(PathBuf),

    #[error("Template '{0}' not found. Use 'dre templates' to see available templates.")]
    TemplateNotFound(String),

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    #[error("Invalid period '{0}'. Expected '<mes>-<ano>' (e.g., 'dezembro-2024')")]
    InvalidPeriod(String),

    #[error("Invalid date range: {0}")]
    InvalidDateRange(String),

    #[error("Cost center is not available for the consolidated entity")]
    CostCenterUnavailable,

    #[error("Failed to parse snapshot {path}: {source}")]
    SnapshotParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to render {format}: {reason}")]
    Render { format: String, reason: String },

    #[error("Typst not found. Install it from https://typst.app/ or run: cargo install typst-cli")]
    TypstNotFound,

    #[error("Failed to generate PDF: {0}")]
    PdfGeneration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ReportError {
    pub fn render(format: &str, reason: impl std::fmt::Display) -> Self {
        ReportError::Render {
            format: format.to_string(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;
