//! Export orchestration: resolve the template, merge options, render and
//! write the file.

use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::dashboard::Snapshot;
use crate::error::{ReportError, Result};
use crate::render::render;
use crate::report::{
    get_template_by_id, resolve_title, ExportFormat, OptionOverrides, ReportTemplate,
    DEFAULT_PDF_TEMPLATE,
};

/// `"Demonstrativo de Resultado"` + CSV -> `demonstrativo-de-resultado.csv`
///
/// Path separators become `-` and leading dots are dropped, so the name
/// always stays inside the output directory.
pub fn export_filename(title: &str, format: ExportFormat) -> String {
    let stem = title
        .to_lowercase()
        .replace([' ', '/', '\\'], "-");
    let stem = stem.trim_start_matches('.');
    let stem = if stem.is_empty() { "relatorio" } else { stem };
    format!("{}.{}", stem, format.extension())
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportRequest {
    /// Report title; also names the output file.
    pub title: String,
    /// Explicit template id. When absent the title is resolved instead.
    pub template_id: Option<String>,
    pub format: ExportFormat,
    pub overrides: OptionOverrides,
}

impl ExportRequest {
    pub fn new(title: impl Into<String>, format: ExportFormat) -> Self {
        Self {
            title: title.into(),
            template_id: None,
            format,
            overrides: OptionOverrides::default(),
        }
    }

    pub fn template(mut self, id: impl Into<String>) -> Self {
        self.template_id = Some(id.into());
        self
    }

    pub fn overrides(mut self, overrides: OptionOverrides) -> Self {
        self.overrides = overrides;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ExportState {
    #[default]
    Idle,
    Exporting {
        template_id: String,
        format: ExportFormat,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOutcome {
    pub path: PathBuf,
    pub template_id: String,
    pub format: ExportFormat,
}

pub struct Exporter {
    output_dir: PathBuf,
    state: ExportState,
}

impl Exporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            state: ExportState::Idle,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn state(&self) -> &ExportState {
        &self.state
    }

    pub fn is_exporting(&self) -> bool {
        self.state != ExportState::Idle
    }

    /// Render `request` from `snapshot` and write it under the output
    /// directory. An existing file with the same name is overwritten.
    pub fn export(&mut self, snapshot: &Snapshot, request: &ExportRequest) -> Result<ExportOutcome> {
        let template = resolve_template(request)?;
        self.state = ExportState::Exporting {
            template_id: template.id.to_string(),
            format: request.format,
        };

        let result = self.write(snapshot, request, template);
        self.state = ExportState::Idle;
        result
    }

    fn write(
        &self,
        snapshot: &Snapshot,
        request: &ExportRequest,
        template: &ReportTemplate,
    ) -> Result<ExportOutcome> {
        let options = template
            .default_options
            .merged(&request.overrides, request.format);
        let rendered = render(template.id, snapshot, &options)?;

        std::fs::create_dir_all(&self.output_dir)?;
        let path = self
            .output_dir
            .join(export_filename(&request.title, request.format));
        rendered.save(&path)?;

        info!(
            "exported '{}' ({}) to {}",
            template.id,
            request.format,
            path.display()
        );
        Ok(ExportOutcome {
            path,
            template_id: template.id.to_string(),
            format: request.format,
        })
    }
}

fn resolve_template(request: &ExportRequest) -> Result<&'static ReportTemplate> {
    if let Some(id) = &request.template_id {
        return get_template_by_id(id).ok_or_else(|| ReportError::TemplateNotFound(id.clone()));
    }

    if let Some(template) = resolve_title(&request.title) {
        debug!("title '{}' resolved to '{}'", request.title, template.id);
        return Ok(template);
    }

    match (request.format, get_template_by_id(DEFAULT_PDF_TEMPLATE)) {
        (ExportFormat::Pdf, Some(template)) => {
            warn!(
                "no template named '{}', falling back to '{}'",
                request.title, DEFAULT_PDF_TEMPLATE
            );
            Ok(template)
        }
        _ => Err(ReportError::TemplateNotFound(request.title.clone())),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationVariant {
    Default,
    Destructive,
}

/// User-facing result of an export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub variant: NotificationVariant,
    pub title: String,
    pub description: String,
}

impl Notification {
    pub fn success(outcome: &ExportOutcome) -> Self {
        Self {
            variant: NotificationVariant::Default,
            title: "Relatório exportado".to_string(),
            description: format!(
                "{} gerado em {}",
                outcome.format,
                outcome.path.display()
            ),
        }
    }

    pub fn failure(error: &ReportError) -> Self {
        Self {
            variant: NotificationVariant::Destructive,
            title: "Erro na exportação".to_string(),
            description: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_lowercases_and_dashes() {
        assert_eq!(
            export_filename("Demonstrativo de Resultado do Exercício", ExportFormat::Csv),
            "demonstrativo-de-resultado-do-exercício.csv"
        );
        assert_eq!(export_filename("DRE", ExportFormat::Xlsx), "dre.xlsx");
    }

    #[test]
    fn filename_never_leaves_output_dir() {
        assert_eq!(export_filename("../escaped", ExportFormat::Csv), "-escaped.csv");
        assert_eq!(
            export_filename("Receitas/Despesas", ExportFormat::Txt),
            "receitas-despesas.txt"
        );
        assert_eq!(export_filename("a\\b", ExportFormat::Xml), "a-b.xml");
        assert_eq!(export_filename("..", ExportFormat::Pdf), "relatorio.pdf");
    }

    #[test]
    fn explicit_template_must_exist() {
        let request = ExportRequest::new("DRE", ExportFormat::Pdf).template("nao-existe");
        assert!(matches!(
            resolve_template(&request),
            Err(ReportError::TemplateNotFound(id)) if id == "nao-existe"
        ));
    }

    #[test]
    fn unknown_title_falls_back_only_for_pdf() {
        let pdf = ExportRequest::new("Relatório Qualquer", ExportFormat::Pdf);
        assert_eq!(resolve_template(&pdf).map(|t| t.id).ok(), Some(DEFAULT_PDF_TEMPLATE));

        let csv = ExportRequest::new("Relatório Qualquer", ExportFormat::Csv);
        assert!(matches!(
            resolve_template(&csv),
            Err(ReportError::TemplateNotFound(_))
        ));
    }

    #[test]
    fn failure_notification_is_destructive() {
        let n = Notification::failure(&ReportError::TemplateNotFound("x".into()));
        assert_eq!(n.variant, NotificationVariant::Destructive);
        assert!(n.description.contains("'x'"));
    }
}
