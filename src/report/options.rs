use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ReportError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Pdf,
    Xlsx,
    Csv,
    Txt,
    Xml,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 5] = [
        ExportFormat::Pdf,
        ExportFormat::Xlsx,
        ExportFormat::Csv,
        ExportFormat::Txt,
        ExportFormat::Xml,
    ];

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Csv => "csv",
            ExportFormat::Txt => "txt",
            ExportFormat::Xml => "xml",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.extension().to_uppercase())
    }
}

impl FromStr for ExportFormat {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pdf" => Ok(ExportFormat::Pdf),
            "xlsx" | "excel" => Ok(ExportFormat::Xlsx),
            "csv" => Ok(ExportFormat::Csv),
            "txt" | "text" => Ok(ExportFormat::Txt),
            "xml" => Ok(ExportFormat::Xml),
            _ => Err(ReportError::InvalidFilter(format!(
                "unknown format '{s}' (use pdf, xlsx, csv, txt or xml)"
            ))),
        }
    }
}

/// Page orientation, honoured by the PDF layout only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Orientacao {
    #[default]
    #[serde(rename = "retrato", alias = "portrait")]
    Retrato,
    #[serde(rename = "paisagem", alias = "landscape")]
    Paisagem,
}

impl FromStr for Orientacao {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "retrato" | "portrait" => Ok(Orientacao::Retrato),
            "paisagem" | "landscape" => Ok(Orientacao::Paisagem),
            _ => Err(ReportError::InvalidFilter(format!(
                "unknown orientation '{s}' (use retrato or paisagem)"
            ))),
        }
    }
}

/// Per-export configuration. Each flag toggles one kind of report content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportOptions {
    pub incluir_comparacao: bool,
    pub incluir_graficos: bool,
    pub incluir_detalhamento: bool,
    pub incluir_assinatura: bool,
    pub incluir_rodape: bool,
    pub formato: ExportFormat,
    pub orientacao: Orientacao,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            incluir_comparacao: true,
            incluir_graficos: true,
            incluir_detalhamento: true,
            incluir_assinatura: false,
            incluir_rodape: true,
            formato: ExportFormat::Pdf,
            orientacao: Orientacao::Retrato,
        }
    }
}

/// User toggles layered over a template's default options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OptionOverrides {
    pub incluir_comparacao: Option<bool>,
    pub incluir_graficos: Option<bool>,
    pub incluir_detalhamento: Option<bool>,
    pub incluir_assinatura: Option<bool>,
    pub incluir_rodape: Option<bool>,
    pub orientacao: Option<Orientacao>,
}

impl ReportOptions {
    pub fn merged(self, overrides: &OptionOverrides, formato: ExportFormat) -> Self {
        Self {
            incluir_comparacao: overrides
                .incluir_comparacao
                .unwrap_or(self.incluir_comparacao),
            incluir_graficos: overrides.incluir_graficos.unwrap_or(self.incluir_graficos),
            incluir_detalhamento: overrides
                .incluir_detalhamento
                .unwrap_or(self.incluir_detalhamento),
            incluir_assinatura: overrides
                .incluir_assinatura
                .unwrap_or(self.incluir_assinatura),
            incluir_rodape: overrides.incluir_rodape.unwrap_or(self.incluir_rodape),
            formato,
            orientacao: overrides.orientacao.unwrap_or(self.orientacao),
        }
    }
}
